//! Command trait, registry, and dispatch logic.
//!
//! Input lines split on whitespace; the lowercased first token selects a
//! protocol handler. The two-token phrase `who is` folds to `whois`.
//! Every parsed line is echoed to the transcript and announced on the
//! event bus before validation or dispatch.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

use async_trait::async_trait;

use overwatch_net::client::HttpClient;
use overwatch_types::config::OverwatchConfig;
use overwatch_types::error::{OverwatchError, Result};
use overwatch_types::event::{CommandExecuted, EventBus};
use overwatch_types::log::Console;

/// Everything a protocol handler may touch.
pub struct Context {
    pub console: Arc<Console>,
    pub http: HttpClient,
    pub bus: Arc<EventBus<CommandExecuted>>,
    pub config: Arc<OverwatchConfig>,
}

/// What the REPL should do after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The `exit` verb was executed.
    Exit,
}

/// Validation applied to a verb's target before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRule {
    /// No target expected.
    None,
    /// Target optional; the handler supplies a default.
    Optional,
    /// Non-empty target required.
    Required { example: &'static str },
    /// Target must be an IPv4 dotted quad.
    Ipv4 { example: &'static str },
    /// Target must contain `@`.
    Email { example: &'static str },
}

/// A single executable protocol.
#[async_trait]
pub trait Command: Send + Sync {
    /// The verb (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "whois [ip]").
    fn usage(&self) -> &str;

    /// Target validation rule, enforced by the registry before dispatch.
    fn target_rule(&self) -> TargetRule;

    /// Execute against a validated target. Errors become one error line.
    async fn execute(&self, target: Option<&str>, args: &[String], ctx: &Context) -> Result<Flow>;
}

/// A submitted line after tokenizing and alias folding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub verb: String,
    pub args: Vec<String>,
}

impl ParsedCommand {
    pub fn target(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// Tokenize one input line. Whitespace-only input is a no-op (`None`).
///
/// `who is <target>` is rewritten to `whois <target>` — the target is the
/// third token, case-insensitive on both alias words.
pub fn parse_line(line: &str) -> Option<ParsedCommand> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let first = tokens.first()?;

    let mut verb = first.to_ascii_lowercase();
    let mut rest = &tokens[1..];
    if verb == "who" && rest.first().is_some_and(|t| t.eq_ignore_ascii_case("is")) {
        verb = "whois".to_string();
        rest = &rest[1..];
    }

    Some(ParsedCommand {
        verb,
        args: rest.iter().map(|t| t.to_string()).collect(),
    })
}

fn validate_target(rule: TargetRule, target: Option<&str>) -> Result<()> {
    let present = target.is_some_and(|t| !t.is_empty());
    match rule {
        TargetRule::None | TargetRule::Optional => Ok(()),
        TargetRule::Required { example } => {
            if present {
                Ok(())
            } else {
                Err(OverwatchError::Validation(format!(
                    "REQUIRES TARGET (e.g., {example})"
                )))
            }
        }
        TargetRule::Ipv4 { example } => {
            let Some(t) = target.filter(|t| !t.is_empty()) else {
                return Err(OverwatchError::Validation(format!(
                    "REQUIRES TARGET (e.g., {example})"
                )));
            };
            if t.parse::<Ipv4Addr>().is_ok() {
                Ok(())
            } else {
                Err(OverwatchError::Validation(format!(
                    "INVALID IPV4 TARGET: {t}"
                )))
            }
        }
        TargetRule::Email { example } => {
            let Some(t) = target.filter(|t| !t.is_empty()) else {
                return Err(OverwatchError::Validation(format!(
                    "REQUIRES TARGET (e.g., {example})"
                )));
            };
            if t.contains('@') {
                Ok(())
            } else {
                Err(OverwatchError::Validation(format!(
                    "TARGET MUST BE AN EMAIL ADDRESS (e.g., {example})"
                )))
            }
        }
    }
}

/// Registry of available protocols with dispatch.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Register a protocol. Replaces any existing protocol with the same
    /// name.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    /// Sorted `(name, usage, description)` triples for `help`.
    pub fn list_commands(&self) -> Vec<(&str, &str, &str)> {
        let mut cmds: Vec<(&str, &str, &str)> = self
            .commands
            .values()
            .map(|c| (c.name(), c.usage(), c.description()))
            .collect();
        cmds.sort_by_key(|(name, _, _)| *name);
        cmds
    }

    /// Parse and execute one submitted line.
    ///
    /// Ordering per input: one Command-kind echo line first, then the
    /// unconditional event broadcast, then validation, then the handler.
    /// Handler failures become a single error line; they never abort the
    /// REPL.
    pub async fn dispatch(&self, line: &str, ctx: &Context) -> Flow {
        let Some(parsed) = parse_line(line) else {
            return Flow::Continue;
        };

        ctx.console.command(format!("> {}", line.trim()));
        ctx.bus.publish(&CommandExecuted {
            command: parsed.verb.clone(),
            target: parsed.target().map(str::to_string),
        });

        // `help` needs registry access, so it is intercepted here.
        if parsed.verb == "help" {
            self.render_help(ctx);
            return Flow::Continue;
        }

        let Some(cmd) = self.commands.get(parsed.verb.as_str()) else {
            ctx.console
                .error(format!("[ERROR] COMMAND NOT RECOGNIZED: {}", parsed.verb));
            return Flow::Continue;
        };

        if let Err(e) = validate_target(cmd.target_rule(), parsed.target()) {
            ctx.console.error(format!("[ERROR] {e}"));
            return Flow::Continue;
        }

        match cmd.execute(parsed.target(), &parsed.args, ctx).await {
            Ok(flow) => flow,
            Err(e) => {
                ctx.console.error(format!("[ERROR] {e}"));
                Flow::Continue
            }
        }
    }

    fn render_help(&self, ctx: &Context) {
        ctx.console.output("AVAILABLE PROTOCOLS:");
        for (_, usage, description) in self.list_commands() {
            ctx.console.output(format!("  {usage:<22} - {description}"));
        }
        ctx.console
            .output(format!("  {:<22} - Show this protocol index", "help"));
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
