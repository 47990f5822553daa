//! Orchestration macros (scan, dossier) and telemetry feeds (quake, cve).
//!
//! The macros compose the primitive lookups through [`FanOut`]: `scan`
//! paces a sequential per-host trace to stay under upstream rate limits,
//! `dossier` runs its host batches in bounded parallel and isolates every
//! section failure so the rest of the report survives.

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use overwatch_net::dns::{self, RecordType};
use overwatch_net::fanout::FanOut;
use overwatch_net::internetdb::ExposureReport;
use overwatch_net::usgs::QuakeEvent;
use overwatch_net::{geo, github, hackertarget, internetdb, usgs};
use overwatch_types::error::{OverwatchError, Result};

use crate::format::{capped_lines, clip};
use crate::interpreter::{Command, CommandRegistry, Context, Flow, TargetRule};
use crate::recon_commands::emit_geo_block;

/// Register the macro and telemetry protocols into a registry.
pub fn register_trace_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(ScanCmd));
    reg.register(Box::new(DossierCmd));
    reg.register(Box::new(QuakeCmd));
    reg.register(Box::new(CveCmd));
}

/// Target of a macro invocation, resolved once up front.
pub(crate) struct ScanTarget {
    /// Bare domain, or the literal address for IP targets.
    pub subject: String,
    pub is_ip: bool,
    /// Every IPv4 address the subject resolves to.
    pub resolved: Vec<String>,
}

/// Resolve a raw macro argument: a literal IPv4 address stands alone, a
/// domain goes through one DNS lookup for its full A set. Zero addresses
/// is a hard failure.
pub(crate) async fn resolve_scan_target(ctx: &Context, raw: &str) -> Result<ScanTarget> {
    if raw.parse::<Ipv4Addr>().is_ok() {
        return Ok(ScanTarget {
            subject: raw.to_string(),
            is_ip: true,
            resolved: vec![raw.to_string()],
        });
    }

    let domain = dns::clean_domain(raw);
    let addresses = dns::resolve_ipv4(&ctx.http, &ctx.config.endpoints.dns, &domain).await?;
    if addresses.is_empty() {
        return Err(OverwatchError::Upstream(format!(
            "NO IPv4 RECORDS FOR {domain}."
        )));
    }
    Ok(ScanTarget {
        subject: domain,
        is_ip: false,
        resolved: addresses.iter().map(ToString::to_string).collect(),
    })
}

// ---------------------------------------------------------------------------
// scan
// ---------------------------------------------------------------------------

struct ScanCmd;

#[async_trait]
impl Command for ScanCmd {
    fn name(&self) -> &str {
        "scan"
    }
    fn description(&self) -> &str {
        "Deep scan: resolve and trace every node"
    }
    fn usage(&self) -> &str {
        "scan [ip|domain]"
    }
    fn target_rule(&self) -> TargetRule {
        TargetRule::Required {
            example: "scan example.com",
        }
    }
    async fn execute(&self, target: Option<&str>, _args: &[String], ctx: &Context) -> Result<Flow> {
        let raw = target.unwrap_or_default();
        ctx.console.system(format!("INITIATING DEEP SCAN ON: {raw}"));

        let scan_target = resolve_scan_target(ctx, raw).await?;
        let total = scan_target.resolved.len();
        if !scan_target.is_ip {
            ctx.console.system(format!("{total} NODES RESOLVED."));
        }

        // One node at a time with a fixed gap between call starts; a
        // failed trace is reported for that node and iteration continues.
        let fan = FanOut::serial(Duration::from_millis(ctx.config.pacing.trace_delay_ms));
        fan.run(scan_target.resolved, |index, address| async move {
            ctx.console
                .system(format!("TRACING NODE {}/{total}: {address}", index + 1));
            match geo::lookup(&ctx.http, &ctx.config.endpoints.geo, &address).await {
                Ok(profile) => emit_geo_block(ctx, &profile),
                Err(e) => ctx
                    .console
                    .warning(format!("[{address}] TRACE FAILED: {e}")),
            }
        })
        .await;

        ctx.console.system("RECONNAISSANCE COMPLETE. TARGET PROFILED.");
        Ok(Flow::Continue)
    }
}

// ---------------------------------------------------------------------------
// dossier
// ---------------------------------------------------------------------------

struct DossierCmd;

#[async_trait]
impl Command for DossierCmd {
    fn name(&self) -> &str {
        "dossier"
    }
    fn description(&self) -> &str {
        "Compile a full target profile report"
    }
    fn usage(&self) -> &str {
        "dossier [ip|domain]"
    }
    fn target_rule(&self) -> TargetRule {
        TargetRule::Required {
            example: "dossier mit.edu",
        }
    }
    async fn execute(&self, target: Option<&str>, _args: &[String], ctx: &Context) -> Result<Flow> {
        let raw = target.unwrap_or_default();
        ctx.console.system(format!("COMPILING DOSSIER ON {raw}..."));

        let is_ip = raw.parse::<Ipv4Addr>().is_ok();
        let domain = dns::clean_domain(raw);
        let subject = if is_ip { raw.to_string() } else { domain.clone() };

        let mut report: Vec<String> = Vec::new();
        report.push("==================================================".to_string());
        report.push(format!("OVERWATCH DOSSIER: {subject}"));
        report.push(format!(
            "GENERATED: {}",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
        ));
        report.push("==================================================".to_string());

        // -- DNS topology --
        report.push(String::new());
        report.push("-- DNS TOPOLOGY --".to_string());
        let mut resolved: Vec<String> = Vec::new();
        if is_ip {
            report.push("N/A (IP TARGET)".to_string());
            resolved.push(subject.clone());
        } else {
            let rtypes = vec![RecordType::A, RecordType::Mx, RecordType::Ns, RecordType::Txt];
            let fan = FanOut::concurrent(rtypes.len());
            let sections = fan
                .run(rtypes, |_, rtype| {
                    let http = &ctx.http;
                    let base = &ctx.config.endpoints.dns;
                    let domain = &domain;
                    async move { (rtype, dns::resolve(http, base, domain, rtype).await) }
                })
                .await;

            for (rtype, result) in sections {
                match result {
                    Ok(records) => {
                        if records.is_empty() {
                            report.push(format!("{}: NONE", rtype.as_str()));
                        } else {
                            for record in &records {
                                report.push(dns_topology_line(rtype, record));
                            }
                            if rtype == RecordType::A {
                                resolved = records;
                            }
                        }
                    }
                    Err(e) => report.push(format!("{}: FAILED ({e})", rtype.as_str())),
                }
            }
        }

        // -- Host trace: all resolved nodes as one bounded parallel batch --
        let fan = FanOut::concurrent(ctx.config.pacing.max_in_flight);
        report.push(String::new());
        report.push("-- HOST TRACE --".to_string());
        if resolved.is_empty() {
            report.push("NO DATA".to_string());
        } else {
            let traces = fan
                .run(resolved.clone(), |_, address| {
                    let http = &ctx.http;
                    let base = &ctx.config.endpoints.geo;
                    async move {
                        let result = geo::lookup(http, base, &address).await;
                        (address, result)
                    }
                })
                .await;
            for (address, result) in traces {
                match result {
                    Ok(p) => report.push(format!(
                        "{address} | {} | {}, {} | {}",
                        p.isp,
                        p.city,
                        p.country,
                        p.coordinates()
                    )),
                    Err(e) => report.push(format!("{address} | TRACE FAILED ({e})")),
                }
            }
        }

        // -- Exposure --
        report.push(String::new());
        report.push("-- EXPOSURE --".to_string());
        if resolved.is_empty() {
            report.push("NO DATA".to_string());
        } else {
            let sweeps = fan
                .run(resolved.clone(), |_, address| {
                    let http = &ctx.http;
                    let base = &ctx.config.endpoints.internetdb;
                    async move {
                        let result = internetdb::lookup(http, base, &address).await;
                        (address, result)
                    }
                })
                .await;
            for (address, result) in sweeps {
                match result {
                    Ok(exposure) => {
                        report.push(exposure_line(&address, &exposure, ctx.config.display.vuln_cap));
                    }
                    Err(e) => report.push(format!("{address} | SWEEP FAILED ({e})")),
                }
            }
        }

        // -- Subdomain sweep --
        report.push(String::new());
        report.push("-- SUBDOMAIN SWEEP --".to_string());
        if is_ip {
            report.push("N/A (IP TARGET)".to_string());
        } else {
            match hackertarget::enumerate(&ctx.http, &ctx.config.endpoints.hostsearch, &domain)
                .await
            {
                Ok(records) if records.is_empty() => report.push("NO DATA".to_string()),
                Ok(records) => {
                    for line in capped_lines(&records, ctx.config.display.subdomain_cap, |r| {
                        format!("{} -> {}", r.host, r.ip)
                    }) {
                        report.push(line);
                    }
                }
                Err(e) => report.push(format!("FAILED ({e})")),
            }
        }

        for line in &report {
            ctx.console.output(line.clone());
        }

        // Offer the assembled report as a file artifact; a write failure
        // does not fail the macro.
        let filename = format!(
            "dossier_{}_{}.txt",
            sanitize_target(&subject),
            Utc::now().format("%Y%m%d%H%M%S")
        );
        match std::fs::write(&filename, report.join("\n") + "\n") {
            Ok(()) => ctx.console.system(format!("REPORT SAVED: {filename}")),
            Err(e) => ctx.console.warning(format!("REPORT NOT SAVED: {e}")),
        }

        ctx.console.system("DOSSIER COMPLETE. TARGET PROFILED.");
        Ok(Flow::Continue)
    }
}

fn dns_topology_line(rtype: RecordType, record: &str) -> String {
    match rtype {
        RecordType::Mx => format!("MX: {}", dns::mx_host(record)),
        RecordType::Txt => {
            let marker = if record.contains("v=spf") || record.contains("DMARC") {
                " [SEC POLICY]"
            } else {
                ""
            };
            format!("TXT: {}{marker}", clip(record, 60))
        }
        _ => format!("{}: {record}", rtype.as_str()),
    }
}

fn exposure_line(address: &str, exposure: &ExposureReport, vuln_cap: usize) -> String {
    if exposure.is_empty() {
        return format!("{address} | NO DATA");
    }
    let ports: Vec<String> = exposure.ports.iter().map(|p| p.to_string()).collect();
    let mut line = format!("{address} | PORTS: {}", join_or_none(&ports));
    if !exposure.vulns.is_empty() {
        let shown: Vec<String> = exposure.vulns.iter().take(vuln_cap).cloned().collect();
        let omitted = exposure.vulns.len().saturating_sub(vuln_cap);
        if omitted > 0 {
            line.push_str(&format!(
                " | VULNS: {} (+{omitted} MORE)",
                shown.join(", ")
            ));
        } else {
            line.push_str(&format!(" | VULNS: {}", shown.join(", ")));
        }
    }
    line
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "NONE".to_string()
    } else {
        items.join(", ")
    }
}

fn sanitize_target(subject: &str) -> String {
    subject
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// quake
// ---------------------------------------------------------------------------

struct QuakeCmd;

#[async_trait]
impl Command for QuakeCmd {
    fn name(&self) -> &str {
        "quake"
    }
    fn description(&self) -> &str {
        "Global seismic event feed"
    }
    fn usage(&self) -> &str {
        "quake"
    }
    fn target_rule(&self) -> TargetRule {
        TargetRule::None
    }
    async fn execute(&self, _target: Option<&str>, _args: &[String], ctx: &Context) -> Result<Flow> {
        ctx.console.system("PULLING GLOBAL SEISMIC FEED...");
        let events = usgs::feed(&ctx.http, &ctx.config.endpoints.quakes).await?;
        if events.is_empty() {
            ctx.console.output("NO SEISMIC EVENTS ON RECORD.");
            return Ok(Flow::Continue);
        }
        for line in capped_lines(&events, ctx.config.display.quake_cap, quake_line) {
            ctx.console.output(line);
        }
        Ok(Flow::Continue)
    }
}

fn quake_line(event: &QuakeEvent) -> String {
    let time = event
        .time_ms
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.format("%H:%M:%SZ").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());
    let depth = event
        .depth_km
        .map(|d| format!("{d:.1}"))
        .unwrap_or_else(|| "?".to_string());
    format!(
        "[M{:.1}] {} | DEPTH {depth} KM | {time}",
        event.magnitude, event.place
    )
}

// ---------------------------------------------------------------------------
// cve
// ---------------------------------------------------------------------------

struct CveCmd;

#[async_trait]
impl Command for CveCmd {
    fn name(&self) -> &str {
        "cve"
    }
    fn description(&self) -> &str {
        "Live CVE repository intercepts"
    }
    fn usage(&self) -> &str {
        "cve"
    }
    fn target_rule(&self) -> TargetRule {
        TargetRule::None
    }
    async fn execute(&self, _target: Option<&str>, _args: &[String], ctx: &Context) -> Result<Flow> {
        ctx.console.system("INTERCEPTING LIVE CVE CHANNELS...");
        let intercepts = github::cve_intercepts(
            &ctx.http,
            &ctx.config.endpoints.repos,
            ctx.config.display.repo_cap,
        )
        .await?;
        if intercepts.is_empty() {
            ctx.console.output("NO INTERCEPTS AVAILABLE.");
            return Ok(Flow::Continue);
        }
        for line in capped_lines(&intercepts, ctx.config.display.repo_cap, |r| {
            format!("[{}] {}", r.name, r.description)
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

    #[tokio::test]
    async fn scan_without_target_fails_validation() {
        let ctx = test_ctx();
        let mut reg = CommandRegistry::new();
        register_trace_commands(&mut reg);

        reg.dispatch("scan", &ctx).await;
        let last = ctx.console.lines().pop().unwrap();
        assert_eq!(last.text, "[ERROR] REQUIRES TARGET (e.g., scan example.com)");
    }

    #[test]
    fn sanitize_keeps_domain_characters() {
        assert_eq!(sanitize_target("mit.edu"), "mit.edu");
        assert_eq!(sanitize_target("8.8.8.8"), "8.8.8.8");
        assert_eq!(sanitize_target("a/b:c"), "a_b_c");
    }

    #[test]
    fn exposure_line_caps_vulns_inline() {
        let exposure = ExposureReport {
            hostnames: vec![],
            ports: vec![80, 443],
            cpes: vec![],
            vulns: (0..7).map(|i| format!("CVE-2025-000{i}")).collect(),
        };
        let line = exposure_line("1.2.3.4", &exposure, 5);
        assert!(line.starts_with("1.2.3.4 | PORTS: 80, 443 | VULNS: "));
        assert!(line.ends_with("(+2 MORE)"));
    }

    #[test]
    fn exposure_line_reports_no_data() {
        let exposure = ExposureReport::default();
        assert_eq!(exposure_line("1.2.3.4", &exposure, 5), "1.2.3.4 | NO DATA");
    }

    #[test]
    fn quake_line_renders_placeholders() {
        let event = QuakeEvent {
            magnitude: 4.72,
            place: "100km W of Somewhere".to_string(),
            time_ms: None,
            longitude: None,
            latitude: None,
            depth_km: None,
        };
        assert_eq!(
            quake_line(&event),
            "[M4.7] 100km W of Somewhere | DEPTH ? KM | --:--:--"
        );
    }

    #[test]
    fn quake_line_formats_time_and_depth() {
        let event = QuakeEvent {
            magnitude: 6.0,
            place: "Offshore".to_string(),
            time_ms: Some(0),
            longitude: Some(1.0),
            latitude: Some(2.0),
            depth_km: Some(10.25),
        };
        assert_eq!(
            quake_line(&event),
            "[M6.0] Offshore | DEPTH 10.2 KM | 00:00:00Z"
        );
    }

    #[test]
    fn mx_topology_line_strips_priority() {
        assert_eq!(
            dns_topology_line(RecordType::Mx, "10 aspmx.l.google.com."),
            "MX: aspmx.l.google.com."
        );
    }

    #[test]
    fn spf_txt_record_is_flagged() {
        let line = dns_topology_line(RecordType::Txt, "v=spf1 include:_spf.example.com ~all");
        assert!(line.ends_with("[SEC POLICY]"));
    }
}
