//! Output and error streams.
//!
//! The engine never writes to the process streams directly. Everything the
//! user sees (handler output, help text, diagnostics) goes through a
//! [`Console`], so applications can be run against an in-memory
//! [`BufferConsole`] in tests and against [`StdConsole`] in production.

use std::fmt;
use std::io::Write;

/// Destination for user-facing text.
pub trait Console {
    /// Writes to the output stream.
    fn print(&mut self, args: fmt::Arguments<'_>);

    /// Writes to the error stream.
    fn print_error(&mut self, args: fmt::Arguments<'_>);
}

/// Writes to the process's standard output and standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdConsole;

impl StdConsole {
    pub fn new() -> Self {
        Self
    }
}

impl Console for StdConsole {
    fn print(&mut self, args: fmt::Arguments<'_>) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        // Write errors (closed pipe) are dropped.
        handle.write_fmt(args).ok();
    }

    fn print_error(&mut self, args: fmt::Arguments<'_>) {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        handle.write_fmt(args).ok();
    }
}

/// Captures both streams in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferConsole {
    stdout: String,
    stderr: String,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written to the output stream so far.
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Everything written to the error stream so far.
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Consumes the console, returning `(stdout, stderr)`.
    pub fn into_parts(self) -> (String, String) {
        (self.stdout, self.stderr)
    }
}

impl Console for BufferConsole {
    fn print(&mut self, args: fmt::Arguments<'_>) {
        fmt::Write::write_fmt(&mut self.stdout, args).ok();
    }

    fn print_error(&mut self, args: fmt::Arguments<'_>) {
        fmt::Write::write_fmt(&mut self.stderr, args).ok();
    }
}
