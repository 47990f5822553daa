//! Reconnaissance protocols: whois, ping, intel, subs.

use async_trait::async_trait;

use overwatch_net::dns::{self, RecordType};
use overwatch_net::{geo, hackertarget, internetdb};
use overwatch_types::error::{OverwatchError, Result};

use crate::format::capped_lines;
use crate::interpreter::{Command, CommandRegistry, Context, Flow, TargetRule};

/// Register the reconnaissance protocols into a registry.
pub fn register_recon_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(WhoisCmd));
    reg.register(Box::new(PingCmd));
    reg.register(Box::new(IntelCmd));
    reg.register(Box::new(SubsCmd));
}

/// Emit the three-line geolocation block shared by whois and the macros.
pub(crate) fn emit_geo_block(ctx: &Context, profile: &geo::GeoProfile) {
    ctx.console.output(format!("[ISP]: {}", profile.isp));
    ctx.console
        .output(format!("[GEO]: {}, {}", profile.city, profile.country));
    ctx.console
        .output(format!("[LAT/LON]: {}", profile.coordinates()));
}

// ---------------------------------------------------------------------------
// whois
// ---------------------------------------------------------------------------

struct WhoisCmd;

#[async_trait]
impl Command for WhoisCmd {
    fn name(&self) -> &str {
        "whois"
    }
    fn description(&self) -> &str {
        "Instant OSINT geolocation trace"
    }
    fn usage(&self) -> &str {
        "whois [ip]"
    }
    fn target_rule(&self) -> TargetRule {
        TargetRule::Required {
            example: "whois 8.8.8.8",
        }
    }
    async fn execute(&self, target: Option<&str>, _args: &[String], ctx: &Context) -> Result<Flow> {
        let target = target.unwrap_or_default();
        ctx.console.system(format!("TRACING {target}..."));

        let profile = geo::lookup(&ctx.http, &ctx.config.endpoints.geo, target)
            .await
            .map_err(|e| match e {
                OverwatchError::Transport(_) => {
                    OverwatchError::Upstream("INVALID TARGET OR TRACE FAILED.".to_string())
                }
                other => other,
            })?;

        emit_geo_block(ctx, &profile);
        Ok(Flow::Continue)
    }
}

// ---------------------------------------------------------------------------
// ping
// ---------------------------------------------------------------------------

struct PingCmd;

#[async_trait]
impl Command for PingCmd {
    fn name(&self) -> &str {
        "ping"
    }
    fn description(&self) -> &str {
        "Resolve domain to IPv4"
    }
    fn usage(&self) -> &str {
        "ping [domain]"
    }
    fn target_rule(&self) -> TargetRule {
        TargetRule::Required {
            example: "ping fbi.gov",
        }
    }
    async fn execute(&self, target: Option<&str>, _args: &[String], ctx: &Context) -> Result<Flow> {
        let domain = dns::clean_domain(target.unwrap_or_default());
        ctx.console.system(format!("RESOLVING {domain}..."));

        let answers =
            dns::resolve(&ctx.http, &ctx.config.endpoints.dns, &domain, RecordType::A).await?;
        if answers.is_empty() {
            return Err(OverwatchError::Upstream("NO IPv4 RECORD FOUND.".to_string()));
        }
        for address in &answers {
            ctx.console.output(format!("[IPv4]: {address}"));
        }
        Ok(Flow::Continue)
    }
}

// ---------------------------------------------------------------------------
// intel
// ---------------------------------------------------------------------------

struct IntelCmd;

#[async_trait]
impl Command for IntelCmd {
    fn name(&self) -> &str {
        "intel"
    }
    fn description(&self) -> &str {
        "Port and CVE exposure sweep"
    }
    fn usage(&self) -> &str {
        "intel [ipv4]"
    }
    fn target_rule(&self) -> TargetRule {
        TargetRule::Ipv4 {
            example: "intel 8.8.8.8",
        }
    }
    async fn execute(&self, target: Option<&str>, _args: &[String], ctx: &Context) -> Result<Flow> {
        let target = target.unwrap_or_default();
        ctx.console
            .system(format!("QUERYING EXPOSURE DATABASE FOR {target}..."));

        let report = internetdb::lookup(&ctx.http, &ctx.config.endpoints.internetdb, target).await?;
        if report.is_empty() {
            ctx.console.output("NO EXPOSURE DATA ON RECORD.");
            return Ok(Flow::Continue);
        }

        if !report.hostnames.is_empty() {
            ctx.console
                .output(format!("[HOSTNAMES]: {}", report.hostnames.join(", ")));
        }
        if !report.ports.is_empty() {
            let ports: Vec<String> = report.ports.iter().map(|p| p.to_string()).collect();
            ctx.console
                .output(format!("[OPEN PORTS]: {}", ports.join(", ")));
        }
        if !report.cpes.is_empty() {
            ctx.console.output(format!("[CPE]: {}", report.cpes.join(", ")));
        }
        if report.vulns.is_empty() {
            ctx.console.output("NO KNOWN VULNERABILITIES INDEXED.");
        } else {
            ctx.console
                .warning(format!("{} VULNERABILITIES INDEXED:", report.vulns.len()));
            for line in capped_lines(&report.vulns, ctx.config.display.vuln_cap, |v| {
                format!("[VULN]: {v}")
            }) {
                ctx.console.output(line);
            }
        }
        Ok(Flow::Continue)
    }
}

// ---------------------------------------------------------------------------
// subs
// ---------------------------------------------------------------------------

struct SubsCmd;

#[async_trait]
impl Command for SubsCmd {
    fn name(&self) -> &str {
        "subs"
    }
    fn description(&self) -> &str {
        "Enumerate subdomain space"
    }
    fn usage(&self) -> &str {
        "subs [domain]"
    }
    fn target_rule(&self) -> TargetRule {
        TargetRule::Required {
            example: "subs tesla.com",
        }
    }
    async fn execute(&self, target: Option<&str>, _args: &[String], ctx: &Context) -> Result<Flow> {
        let domain = dns::clean_domain(target.unwrap_or_default());
        ctx.console
            .system(format!("SWEEPING SUBDOMAIN SPACE FOR {domain}..."));

        let records =
            hackertarget::enumerate(&ctx.http, &ctx.config.endpoints.hostsearch, &domain).await?;
        if records.is_empty() {
            ctx.console.output("NO SUBDOMAINS DISCOVERED.");
            return Ok(Flow::Continue);
        }

        ctx.console
            .output(format!("{} HOSTS DISCOVERED:", records.len()));
        for line in capped_lines(&records, ctx.config.display.subdomain_cap, |r| {
            format!("[HOST]: {} -> {}", r.host, r.ip)
        }) {
            ctx.console.output(line);
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::test_support::test_ctx;
    use overwatch_types::log::LogKind;

    #[tokio::test]
    async fn whois_without_target_fails_validation() {
        let ctx = test_ctx();
        let mut reg = CommandRegistry::new();
        register_recon_commands(&mut reg);

        reg.dispatch("whois", &ctx).await;
        let last = ctx.console.lines().pop().unwrap();
        assert_eq!(last.kind, LogKind::Error);
        assert_eq!(last.text, "[ERROR] REQUIRES TARGET (e.g., whois 8.8.8.8)");
    }

    #[tokio::test]
    async fn intel_rejects_invalid_octet_before_any_call() {
        let ctx = test_ctx();
        let mut reg = CommandRegistry::new();
        register_recon_commands(&mut reg);

        reg.dispatch("intel 300.1.1.1", &ctx).await;
        let lines = ctx.console.lines();
        // Echo + one validation error, no system line (which would indicate
        // the handler started).
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text, "[ERROR] INVALID IPV4 TARGET: 300.1.1.1");
    }

    #[tokio::test]
    async fn who_is_alias_reaches_whois_validation() {
        let ctx = test_ctx();
        let mut reg = CommandRegistry::new();
        register_recon_commands(&mut reg);

        // No third token: alias folds to whois with no target.
        reg.dispatch("who is", &ctx).await;
        let last = ctx.console.lines().pop().unwrap();
        assert_eq!(last.text, "[ERROR] REQUIRES TARGET (e.g., whois 8.8.8.8)");
    }

    #[test]
    fn geo_block_renders_placeholders() {
        let ctx = test_ctx();
        let profile = geo::normalize("1.2.3.4", Default::default());
        emit_geo_block(&ctx, &profile);

        let lines = ctx.console.lines();
        assert_eq!(lines[0].text, "[ISP]: UNKNOWN");
        assert_eq!(lines[1].text, "[GEO]: UNKNOWN, UNKNOWN");
        assert_eq!(lines[2].text, "[LAT/LON]: UNKNOWN, UNKNOWN");
    }
}
