//! Command interpreter and terminal subsystem for OVERWATCH.
//!
//! The terminal is a registry-based dispatch system. Protocols implement
//! the `Command` trait and are registered by verb. The interpreter parses
//! input lines, folds aliases, broadcasts the execution event, validates
//! the target, and dispatches `execute()`.

mod commands;
pub mod format;
mod interpreter;
pub mod market_commands;
pub mod recon_commands;
pub mod security_commands;
pub mod trace_commands;

/// Register built-in commands (clear, exit) into a registry.
pub use commands::register_builtins;
/// A single executable protocol trait.
pub use interpreter::Command;
/// Registry of available protocols with dispatch.
pub use interpreter::CommandRegistry;
/// Everything a protocol handler may touch.
pub use interpreter::Context;
/// REPL outcome signal of a dispatch.
pub use interpreter::Flow;
/// Tokenizing + alias folding for one input line.
pub use interpreter::{ParsedCommand, parse_line};
/// Per-verb target validation rule.
pub use interpreter::TargetRule;
/// Register financial protocols (price, ledger) into a registry.
pub use market_commands::register_market_commands;
/// Register reconnaissance protocols (whois, ping, intel, subs) into a registry.
pub use recon_commands::register_recon_commands;
/// Register identity protocols (breach) into a registry.
pub use security_commands::register_security_commands;
/// Register macros and telemetry (scan, dossier, quake, cve) into a registry.
pub use trace_commands::register_trace_commands;

/// Register every protocol the kernel ships with.
pub fn register_all(reg: &mut CommandRegistry) {
    register_builtins(reg);
    register_recon_commands(reg);
    register_market_commands(reg);
    register_security_commands(reg);
    register_trace_commands(reg);
}
