//! Error types for the redaction engine.
//!
//! Errors are split by who can fix them: the caller (bad configuration),
//! the document (unparseable structure), or the engine (a PDF feature that
//! is not modelled, or a MuPDF failure). Every public operation returns
//! [`RedactorResult`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for redaction operations.
pub type RedactorResult<T> = Result<T, RedactorError>;

/// Error type for all redaction operations.
#[derive(Debug, Error)]
pub enum RedactorError {
    /// Invalid caller input: negative rectangle, threshold outside `[0, 1]`,
    /// non-positive reference frame, empty search pattern.
    ///
    /// Always raised before the document is touched.
    #[error("Invalid configuration for '{parameter}': {reason}")]
    Configuration { parameter: String, reason: String },

    /// The input is not a well-formed PDF, or a page's structure or content
    /// stream cannot be decoded.
    #[error("{}", parse_message(.message, .page))]
    DocumentParse {
        message: String,
        page: Option<usize>,
    },

    /// The document uses a feature the engine does not model.
    ///
    /// The locator absorbs this per page (no text matches); it never
    /// escapes [`crate::process`].
    #[error("{}", unsupported_message(.feature, .page))]
    UnsupportedFeature {
        feature: String,
        page: Option<usize>,
    },

    /// MuPDF failed on a document the parser accepted.
    #[error("{}", backend_message(.message, .page))]
    Backend {
        message: String,
        page: Option<usize>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error occurred while reading or writing files
    #[error("IO error for path '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn parse_message(message: &str, page: &Option<usize>) -> String {
    match page {
        Some(p) => format!("PDF parse error on page {}: {}", p, message),
        None => format!("PDF parse error: {}", message),
    }
}

fn unsupported_message(feature: &str, page: &Option<usize>) -> String {
    match page {
        Some(p) => format!("Unsupported PDF feature on page {}: {}", p, feature),
        None => format!("Unsupported PDF feature: {}", feature),
    }
}

fn backend_message(message: &str, page: &Option<usize>) -> String {
    match page {
        Some(p) => format!("MuPDF backend error on page {}: {}", p, message),
        None => format!("MuPDF backend error: {}", message),
    }
}

impl RedactorError {
    /// Shorthand for a [`RedactorError::Configuration`].
    pub fn config(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`RedactorError::DocumentParse`].
    pub fn parse(message: impl Into<String>, page: Option<usize>) -> Self {
        Self::DocumentParse {
            message: message.into(),
            page,
        }
    }

    /// Attaches a 1-based page number to parse, unsupported-feature and
    /// backend errors that do not carry one yet.
    pub fn on_page(self, page_number: usize) -> Self {
        match self {
            Self::DocumentParse {
                message,
                page: None,
            } => Self::DocumentParse {
                message,
                page: Some(page_number),
            },
            Self::UnsupportedFeature {
                feature,
                page: None,
            } => Self::UnsupportedFeature {
                feature,
                page: Some(page_number),
            },
            Self::Backend {
                message,
                page: None,
                source,
            } => Self::Backend {
                message,
                page: Some(page_number),
                source,
            },
            other => other,
        }
    }

    /// Returns true for errors caused by caller input.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns true for errors caused by the document itself.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::DocumentParse { .. })
    }
}

impl From<lopdf::Error> for RedactorError {
    fn from(err: lopdf::Error) -> Self {
        Self::DocumentParse {
            message: err.to_string(),
            page: None,
        }
    }
}
