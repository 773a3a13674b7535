//!
//! # Overview
//!
//! This module defines the unified, `miette`-based diagnostic system for tokensmith. Every
//! failure produced while loading configuration, parsing token files, resolving references or
//! writing artifacts is represented by [`TokensError`]. Error construction goes through the
//! `err_msg!` and `err_src!` macros.
//!
//! # Error Construction Macros
//!
//! - **Use `err_msg!` for message-only errors.**
//!   - `err_msg!(Config, "platform '{}' has no files", name)`
//!
//! - **Use `err_src!` for errors with a pre-built `NamedSource` and a span.**
//!   - `err_src!(Parse, "expected `,` or `}`", &source, span)`
//!
//! Attach an underlying error with [`TokensError::caused_by`] and a help line with
//! [`TokensError::with_help`].

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

pub type SourceArc = Arc<NamedSource<String>>;

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Byte range inside a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Converts a 1-based line/column pair (as reported by `serde_json`) into a byte span
    /// of one character. Positions past the end clamp to the last byte.
    pub fn from_line_col(source: &str, line: usize, column: usize) -> Self {
        let mut offset = 0;
        for (index, text) in source.split_inclusive('\n').enumerate() {
            if index + 1 == line {
                let col_offset = column.saturating_sub(1).min(text.len());
                return Self::point(offset + col_offset);
            }
            offset += text.len();
        }
        Self::point(source.len().saturating_sub(1))
    }
}

/// Type-safe error classification that mirrors the [`TokensError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Malformed JSON in a token source file
    Parse,
    /// Invalid or missing build configuration, or no sources found
    Config,
    /// File-system failures while reading sources or writing artifacts
    Io,
    /// Dangling or circular token references
    Reference,
    /// Format lookup or serialization failures
    Format,
    /// Bugs in tokensmith itself
    Internal,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Parse => "Parse",
            ErrorType::Config => "Config",
            ErrorType::Io => "Io",
            ErrorType::Reference => "Reference",
            ErrorType::Format => "Format",
            ErrorType::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default)]
pub struct ErrorContext {
    /// The primary source for this error (if any).
    pub source: Option<SourceArc>,
    /// The primary span for this error (if any).
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_source_and_span(source: SourceArc, span: Span) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: None,
        }
    }
}

/// Unified error type for every tokensmith failure mode.
#[derive(Debug, Error)]
pub enum TokensError {
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedCause>,
    },
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedCause>,
    },
    #[error("I/O error: {message}")]
    Io {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedCause>,
    },
    #[error("Reference error: {message}")]
    Reference {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedCause>,
    },
    #[error("Format error: {message}")]
    Format {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedCause>,
    },
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedCause>,
    },
}

impl TokensError {
    fn parts(&self) -> (&str, &ErrorContext) {
        match self {
            TokensError::Parse { message, ctx, .. }
            | TokensError::Config { message, ctx, .. }
            | TokensError::Io { message, ctx, .. }
            | TokensError::Reference { message, ctx, .. }
            | TokensError::Format { message, ctx, .. }
            | TokensError::Internal { message, ctx, .. } => (message, ctx),
        }
    }

    fn parts_mut(&mut self) -> (&mut ErrorContext, &mut Option<BoxedCause>) {
        match self {
            TokensError::Parse { ctx, source, .. }
            | TokensError::Config { ctx, source, .. }
            | TokensError::Io { ctx, source, .. }
            | TokensError::Reference { ctx, source, .. }
            | TokensError::Format { ctx, source, .. }
            | TokensError::Internal { ctx, source, .. } => (ctx, source),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            TokensError::Parse { .. } => ErrorType::Parse,
            TokensError::Config { .. } => ErrorType::Config,
            TokensError::Io { .. } => ErrorType::Io,
            TokensError::Reference { .. } => ErrorType::Reference,
            TokensError::Format { .. } => ErrorType::Format,
            TokensError::Internal { .. } => ErrorType::Internal,
        }
    }

    /// The bare message, without the variant prefix added by `Display`.
    pub fn message(&self) -> &str {
        self.parts().0
    }

    /// Name of the source file this error points into, if any.
    pub fn source_name(&self) -> Option<&str> {
        self.parts().1.source.as_ref().map(|s| s.name())
    }

    /// Attaches the underlying error that caused this one.
    pub fn caused_by<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        *self.parts_mut().1 = Some(Box::new(cause));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.parts_mut().0.help = Some(help.into());
        self
    }
}

impl Diagnostic for TokensError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = format!("tokensmith::{}", self.error_type().as_str().to_lowercase());
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.parts()
            .1
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.parts()
            .1
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let (message, ctx) = self.parts();
        let span = ctx.span?;
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        let label = LabeledSpan::new(Some(message.to_string()), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Wraps file contents into a shareable `NamedSource` for diagnostics.
pub fn to_error_source(name: impl AsRef<str>, contents: impl Into<String>) -> SourceArc {
    Arc::new(NamedSource::new(name.as_ref(), contents.into()))
}

/// Constructs a [`TokensError`] variant with a formatted message and no context.
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $($arg:tt)+) => {
        $crate::TokensError::$variant {
            message: format!($($arg)+),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
}

/// Constructs a [`TokensError`] variant pointing at a span of a pre-built `NamedSource`.
#[macro_export]
macro_rules! err_src {
    ($variant:ident, $msg:expr, $source:expr, $span:expr) => {
        $crate::TokensError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext::with_source_and_span(std::sync::Arc::clone($source), $span),
            source: None,
        }
    };
}
