//! Built-in terminal commands: clear, exit.
//!
//! `help` is intercepted inside the registry because it needs access to the
//! full protocol index.

use async_trait::async_trait;

use overwatch_types::error::Result;

use crate::interpreter::{Command, CommandRegistry, Context, Flow, TargetRule};

/// Register the built-in commands into a registry.
pub fn register_builtins(reg: &mut CommandRegistry) {
    reg.register(Box::new(ClearCmd));
    reg.register(Box::new(ExitCmd));
}

// ---------------------------------------------------------------------------
// clear
// ---------------------------------------------------------------------------

struct ClearCmd;

#[async_trait]
impl Command for ClearCmd {
    fn name(&self) -> &str {
        "clear"
    }
    fn description(&self) -> &str {
        "Wipe terminal history"
    }
    fn usage(&self) -> &str {
        "clear"
    }
    fn target_rule(&self) -> TargetRule {
        TargetRule::None
    }
    async fn execute(&self, _target: Option<&str>, _args: &[String], ctx: &Context) -> Result<Flow> {
        ctx.console.clear();
        Ok(Flow::Continue)
    }
}

// ---------------------------------------------------------------------------
// exit
// ---------------------------------------------------------------------------

struct ExitCmd;

#[async_trait]
impl Command for ExitCmd {
    fn name(&self) -> &str {
        "exit"
    }
    fn description(&self) -> &str {
        "Close Overwatch Kernel"
    }
    fn usage(&self) -> &str {
        "exit"
    }
    fn target_rule(&self) -> TargetRule {
        TargetRule::None
    }
    async fn execute(&self, _target: Option<&str>, _args: &[String], ctx: &Context) -> Result<Flow> {
        ctx.console.system("OVERWATCH KERNEL OFFLINE.");
        Ok(Flow::Exit)
    }
}
