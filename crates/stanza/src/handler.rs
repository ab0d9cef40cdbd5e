//! Command handler types.
//!
//! A handler is the business logic behind an executable command. It
//! receives the parsed flags and the raw positional arguments, and returns
//! an [`Output`] that the app writes to its console:
//!
//! - [`Output::Text`] is written verbatim
//! - [`Output::Json`] is pretty-printed
//! - [`Output::Silent`] writes nothing
//!
//! Flags arrive typed; positional arguments arrive as strings, and coercing
//! them is up to the handler.
//!
//! Closures are the common case and are wrapped in [`FnHandler`]. They may
//! return `Result<Output, E>` or anything convertible into an [`Output`]:
//!
//! ```rust
//! use stanza::{FnHandler, Handler, Output, ParsedFlags};
//!
//! let mut add = FnHandler::new(|_flags: &ParsedFlags, args: &[String]| {
//!     let mut sum = 0i64;
//!     for arg in args {
//!         sum += arg.parse::<i64>()?;
//!     }
//!     Ok::<_, anyhow::Error>(sum.to_string())
//! });
//!
//! let output = add.handle(&ParsedFlags::new(), &["2".into(), "5".into()])?;
//! assert_eq!(output, Output::Text("7".into()));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Stateful handlers implement [`Handler`] directly; they take `&mut self`
//! because an app runs one command at a time.

use crate::parser::ParsedFlags;

/// What a handler produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Plain text, written as is.
    Text(String),
    /// Structured data, pretty-printed as JSON.
    Json(serde_json::Value),
    /// Nothing to print.
    Silent,
}

impl Output {
    pub fn is_text(&self) -> bool {
        matches!(self, Output::Text(_))
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Output::Json(_))
    }

    pub fn is_silent(&self) -> bool {
        matches!(self, Output::Silent)
    }

    /// Renders the output for a console, `None` when silent.
    pub fn render(&self) -> Result<Option<String>, serde_json::Error> {
        match self {
            Output::Text(text) => Ok(Some(text.clone())),
            Output::Json(value) => serde_json::to_string_pretty(value).map(Some),
            Output::Silent => Ok(None),
        }
    }
}

impl From<()> for Output {
    fn from(_: ()) -> Self {
        Output::Silent
    }
}

impl From<String> for Output {
    fn from(text: String) -> Self {
        Output::Text(text)
    }
}

impl From<&str> for Output {
    fn from(text: &str) -> Self {
        Output::Text(text.to_string())
    }
}

impl From<serde_json::Value> for Output {
    fn from(value: serde_json::Value) -> Self {
        Output::Json(value)
    }
}

/// The result type for command handlers.
pub type HandlerResult = Result<Output, anyhow::Error>;

/// Conversion of handler return values into a [`HandlerResult`].
///
/// `Result<T, E>` converts for any `T: Into<Output>`, so a handler may
/// return `Ok(())`, `Ok(String)`, `Ok(json!(...))` or an explicit
/// `Ok(Output::...)`.
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> HandlerResult;
}

impl<T, E> IntoHandlerResult for Result<T, E>
where
    T: Into<Output>,
    E: Into<anyhow::Error>,
{
    fn into_handler_result(self) -> HandlerResult {
        self.map(Into::into).map_err(Into::into)
    }
}

/// Trait for command handlers.
///
/// ```rust
/// use stanza::{Handler, HandlerResult, Output, ParsedFlags};
///
/// struct Counter { count: u32 }
///
/// impl Handler for Counter {
///     fn handle(&mut self, _flags: &ParsedFlags, _args: &[String]) -> HandlerResult {
///         self.count += 1;
///         Ok(Output::Text(self.count.to_string()))
///     }
/// }
/// ```
pub trait Handler {
    fn handle(&mut self, flags: &ParsedFlags, args: &[String]) -> HandlerResult;
}

impl Handler for Box<dyn Handler> {
    fn handle(&mut self, flags: &ParsedFlags, args: &[String]) -> HandlerResult {
        (**self).handle(flags, args)
    }
}

/// A wrapper that implements [`Handler`] for `FnMut` closures.
pub struct FnHandler<F, R = HandlerResult> {
    f: F,
    _phantom: std::marker::PhantomData<fn() -> R>,
}

impl<F, R> FnHandler<F, R>
where
    F: FnMut(&ParsedFlags, &[String]) -> R,
    R: IntoHandlerResult,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<F, R> Handler for FnHandler<F, R>
where
    F: FnMut(&ParsedFlags, &[String]) -> R,
    R: IntoHandlerResult,
{
    fn handle(&mut self, flags: &ParsedFlags, args: &[String]) -> HandlerResult {
        (self.f)(flags, args).into_handler_result()
    }
}
