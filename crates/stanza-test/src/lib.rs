//! # stanza-test - In-process harness for stanza apps
//!
//! Runs an [`App`] against a fixed argument list with a captured console,
//! and returns a [`TestResult`] carrying stdout, stderr, the run outcome and
//! the recorded [`Diagnostic`].
//!
//! ```rust
//! use stanza::{App, Command, ErrorKind, ParsedFlags};
//! use stanza_test::TestHarness;
//!
//! let mut app = App::builder()
//!     .name("calc")
//!     .command(Command::executable("add", "", |_f: &ParsedFlags, args: &[String]| {
//!         Ok::<_, anyhow::Error>(args.len().to_string())
//!     }))?
//!     .build();
//!
//! TestHarness::new()
//!     .run(&mut app, &["add", "1", "2"])
//!     .assert_success()
//!     .assert_stdout_eq("2\n");
//!
//! TestHarness::new()
//!     .run(&mut app, &["ad"])
//!     .assert_failure(ErrorKind::CommandNotAdded)
//!     .assert_suggestions(&["add"]);
//! # Ok::<(), stanza::Diagnostic>(())
//! ```
//!
//! Assertions panic with the captured streams in the message, and return
//! `&Self` so they chain.

use stanza::{exit_code, App, BufferConsole, Diagnostic, ErrorKind, RunError};

/// Runs apps in-process.
#[derive(Debug, Clone, Default)]
pub struct TestHarness {
    program: Option<String>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the program name passed as the first argument. Defaults to
    /// the app's name.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Runs `app` with `args` (program name excluded).
    pub fn run(&self, app: &mut App, args: &[&str]) -> TestResult {
        let program = self
            .program
            .clone()
            .unwrap_or_else(|| app.name().to_string());

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(program);
        argv.extend(args.iter().map(|arg| arg.to_string()));

        let mut console = BufferConsole::new();
        let outcome = app.run_with(argv, &mut console);
        let diagnostic = app.diagnostics().record().cloned();
        let (stdout, stderr) = console.into_parts();

        TestResult {
            stdout,
            stderr,
            outcome,
            diagnostic,
        }
    }
}

/// Everything observable about one run.
#[derive(Debug)]
pub struct TestResult {
    stdout: String,
    stderr: String,
    outcome: Result<(), RunError>,
    diagnostic: Option<Diagnostic>,
}

impl TestResult {
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn outcome(&self) -> &Result<(), RunError> {
        &self.outcome
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn exit_code(&self) -> i32 {
        exit_code(&self.outcome)
    }

    /// Kind of the recorded diagnostic, if the run was diagnosed.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.diagnostic.as_ref().map(Diagnostic::kind)
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.diagnostic.as_ref()
    }

    /// Parses stdout as JSON.
    #[track_caller]
    pub fn json(&self) -> serde_json::Value {
        match serde_json::from_str(&self.stdout) {
            Ok(value) => value,
            Err(err) => panic!("stdout is not JSON ({}):\n{}", err, self.stdout),
        }
    }

    #[track_caller]
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.outcome.is_ok(),
            "expected success, got {:?}\nstderr:\n{}",
            self.outcome,
            self.stderr
        );
        self
    }

    /// Asserts the run was diagnosed with `kind`.
    #[track_caller]
    pub fn assert_failure(&self, kind: ErrorKind) -> &Self {
        match &self.outcome {
            Err(RunError::Diagnosed(actual)) => assert_eq!(
                *actual, kind,
                "wrong diagnostic\nstderr:\n{}",
                self.stderr
            ),
            other => panic!(
                "expected diagnostic {}, got {:?}\nstdout:\n{}",
                kind, other, self.stdout
            ),
        }
        self
    }

    /// Asserts the handler itself failed.
    #[track_caller]
    pub fn assert_handler_error(&self) -> &Self {
        assert!(
            matches!(self.outcome, Err(RunError::Handler(_))),
            "expected handler error, got {:?}",
            self.outcome
        );
        self
    }

    #[track_caller]
    pub fn assert_exit_code(&self, expected: i32) -> &Self {
        assert_eq!(self.exit_code(), expected, "stderr:\n{}", self.stderr);
        self
    }

    #[track_caller]
    pub fn assert_stdout_eq(&self, expected: &str) -> &Self {
        assert_eq!(self.stdout, expected);
        self
    }

    #[track_caller]
    pub fn assert_stdout_contains(&self, needle: &str) -> &Self {
        assert!(
            self.stdout.contains(needle),
            "stdout does not contain {:?}:\n{}",
            needle,
            self.stdout
        );
        self
    }

    #[track_caller]
    pub fn assert_stderr_eq(&self, expected: &str) -> &Self {
        assert_eq!(self.stderr, expected);
        self
    }

    #[track_caller]
    pub fn assert_stderr_contains(&self, needle: &str) -> &Self {
        assert!(
            self.stderr.contains(needle),
            "stderr does not contain {:?}:\n{}",
            needle,
            self.stderr
        );
        self
    }

    /// Asserts the recorded suggestions, in order.
    #[track_caller]
    pub fn assert_suggestions(&self, expected: &[&str]) -> &Self {
        let actual: Vec<&str> = self
            .diagnostic
            .as_ref()
            .map(|d| d.suggestions().iter().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(actual, expected);
        self
    }
}
