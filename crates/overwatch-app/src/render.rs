//! ANSI rendering of transcript lines.
//!
//! Kind-to-color mapping follows the terminal overlay: command echoes
//! bold white, output dimmed and indented, system chatter amber, errors
//! red.

use std::io::{self, Write};

use colored::Colorize;

use overwatch_types::log::{LogKind, LogLine};

/// Print one transcript line as it is appended.
///
/// Command echoes are skipped here: in a live REPL the user just typed
/// that text at the prompt, so re-printing it would duplicate the line.
/// The echo still lands in the transcript itself.
pub fn print_line(line: &LogLine) {
    match line.kind {
        LogKind::Command => {}
        LogKind::Output => println!("  {}", line.text.as_str().dimmed()),
        LogKind::System => println!("{}", line.text.as_str().yellow()),
        LogKind::Warning => println!("{}", line.text.as_str().yellow().bold()),
        LogKind::Error => println!("{}", line.text.as_str().red()),
    }
}

pub fn prompt() {
    print!("{} ", ">".cyan());
    let _ = io::stdout().flush();
}
