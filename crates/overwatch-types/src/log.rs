//! The transcript: an append-only sequence of typed terminal lines.
//!
//! Every piece of user-visible output flows through [`Console`] as a
//! [`LogLine`]. Lines are never mutated or reordered after being appended;
//! `clear` (the verb) is the only operation that discards them. The
//! transcript is deliberately unbounded — eviction is out of scope.

use std::sync::Mutex;

/// Severity / role of one transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// Echo of a submitted command line.
    Command,
    /// Regular protocol output.
    Output,
    /// Status chatter ("TRACING 8.8.8.8...").
    System,
    /// Non-fatal problem inside a macro (one sub-target failed).
    Warning,
    /// Terminal failure of a command.
    Error,
}

/// One displayed/recorded line of terminal output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub kind: LogKind,
    pub text: String,
}

impl LogLine {
    pub fn new(kind: LogKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

type EchoFn = Box<dyn Fn(&LogLine) + Send + Sync>;

/// Append-only output sink consumed by the terminal view.
///
/// Handlers append through the kind-specific helpers; a view may install an
/// echo hook to render lines the moment they arrive (the REPL printer does
/// this), or poll [`Console::lines`] for a snapshot.
pub struct Console {
    lines: Mutex<Vec<LogLine>>,
    echo: Option<EchoFn>,
}

impl Console {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            echo: None,
        }
    }

    /// Create a console that invokes `echo` for every appended line.
    pub fn with_echo(echo: impl Fn(&LogLine) + Send + Sync + 'static) -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            echo: Some(Box::new(echo)),
        }
    }

    /// Append one line.
    pub fn push(&self, kind: LogKind, text: impl Into<String>) {
        let line = LogLine::new(kind, text);
        if let Some(ref echo) = self.echo {
            echo(&line);
        }
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line);
    }

    pub fn command(&self, text: impl Into<String>) {
        self.push(LogKind::Command, text);
    }

    pub fn output(&self, text: impl Into<String>) {
        self.push(LogKind::Output, text);
    }

    pub fn system(&self, text: impl Into<String>) {
        self.push(LogKind::System, text);
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.push(LogKind::Warning, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.push(LogKind::Error, text);
    }

    /// Snapshot of all lines appended so far.
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wipe the transcript. Only the `clear` verb calls this.
    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
