//! OVERWATCH kernel entry point.
//!
//! A REPL over stdin: each line goes through the command interpreter, and
//! transcript lines are rendered to stdout as they are appended. The
//! uplink tracker subscribes to the command-execution bridge the same way
//! the dashboard map does.

mod render;
mod uplink;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::AsyncBufReadExt;

use overwatch_net::client::HttpClient;
use overwatch_terminal::{CommandRegistry, Context, Flow, register_all};
use overwatch_types::config;
use overwatch_types::event::EventBus;
use overwatch_types::log::Console;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Resolve config from CLI arg, OVERWATCH_CONFIG env var, or the
    // default path next to the binary.
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("OVERWATCH_CONFIG").ok())
        .unwrap_or_else(|| "overwatch.toml".to_string());
    let config = Arc::new(config::load_config(Path::new(&config_path))?);
    log::info!("Overwatch kernel starting (config: {config_path})");

    let console = Arc::new(Console::with_echo(render::print_line));
    let bus = Arc::new(EventBus::new());
    let http = HttpClient::new(&config.http)?;

    // Keep the uplink subscription alive for the whole session; dropping
    // it would unsubscribe the tracker.
    let _uplink = uplink::spawn_listener(&bus, http.clone(), Arc::clone(&config));

    let mut registry = CommandRegistry::new();
    register_all(&mut registry);

    let ctx = Context {
        console: Arc::clone(&console),
        http,
        bus,
        config,
    };

    console.system("OVERWATCH KERNEL v1.0 INITIALIZED.");
    console.system("TYPE \"help\" FOR AVAILABLE COMMANDS.");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        render::prompt();
        let Some(line) = lines.next_line().await? else {
            // EOF (piped input exhausted or Ctrl-D).
            break;
        };
        if registry.dispatch(&line, &ctx).await == Flow::Exit {
            break;
        }
    }

    Ok(())
}
