//! Identity exposure protocols: breach.

use std::time::Duration;

use async_trait::async_trait;

use overwatch_net::xposedornot;
use overwatch_types::error::Result;

use crate::format::capped_lines;
use crate::interpreter::{Command, CommandRegistry, Context, Flow, TargetRule};

/// Register the identity protocols into a registry.
pub fn register_security_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(BreachCmd));
}

// ---------------------------------------------------------------------------
// breach
// ---------------------------------------------------------------------------

struct BreachCmd;

#[async_trait]
impl Command for BreachCmd {
    fn name(&self) -> &str {
        "breach"
    }
    fn description(&self) -> &str {
        "Check an email against leak archives"
    }
    fn usage(&self) -> &str {
        "breach [email]"
    }
    fn target_rule(&self) -> TargetRule {
        TargetRule::Email {
            example: "breach user@site.com",
        }
    }
    async fn execute(&self, target: Option<&str>, _args: &[String], ctx: &Context) -> Result<Flow> {
        let email = target.unwrap_or_default();
        ctx.console
            .system(format!("CROSS-REFERENCING LEAK ARCHIVES FOR {email}..."));

        // The archive endpoint is slow under load; bound it so a hang
        // becomes a reported failure instead of a stuck terminal.
        let timeout = Duration::from_secs(ctx.config.http.bounded_timeout_secs);
        let report =
            xposedornot::check(&ctx.http, &ctx.config.endpoints.breach, email, timeout).await?;

        if report.is_clean() {
            ctx.console.output("NO BREACH RECORDS FOUND. IDENTITY CLEAN.");
            return Ok(Flow::Continue);
        }

        ctx.console.warning(format!(
            "{} BREACH SOURCES ON RECORD:",
            report.sources.len()
        ));
        for line in capped_lines(&report.sources, ctx.config.display.breach_cap, |s| {
            format!("[LEAK]: {s}")
        }) {
            ctx.console.output(line);
        }
        Ok(Flow::Continue)
    }
}
