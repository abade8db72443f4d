#![deny(clippy::unwrap_used, clippy::expect_used)]

use serde::{Deserialize, Serialize};

/// The category of an error, which is what callers branch on when deciding whether a retry makes sense.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// An unsupported language, theme or version value, or an unreadable configuration.
    Configuration,
    /// Malformed data store or content, and the non-fatal warnings raised during selection.
    Validation,
    /// The document could not be produced, whatever the underlying cause was.
    Generation,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration error",
            ErrorKind::Validation => "validation error",
            ErrorKind::Generation => "CV generation error",
        };
        write!(formatter, "{}", name)
    }
}

/// A struct that represents an error with a kind, a context and possibly the propagated source error.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ContextError {
    pub kind: ErrorKind,
    pub context: String,
    pub source_error: Option<String>,
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source_error {
            Some(source_error) => write!(
                formatter,
                "{}: {}",
                self.context,
                minimize_first_letter(source_error.to_string()),
            ),
            None => write!(formatter, "{}", self.context),
        }
    }
}

impl std::error::Error for ContextError {}

impl ContextError {
    /// Create a new `ContextError` of the given kind with the given context.
    pub fn with_context<S: Into<String>>(kind: ErrorKind, context: S) -> ContextError {
        ContextError {
            kind,
            context: context.into(),
            source_error: None,
        }
    }

    /// Create a new `ContextError` of the given kind with the given context and source error.
    pub fn with_error<S: Into<String>>(
        kind: ErrorKind,
        context: S,
        error: &dyn std::error::Error,
    ) -> ContextError {
        ContextError {
            kind,
            context: context.into(),
            source_error: Some(error.to_string()),
        }
    }

    pub fn configuration<S: Into<String>>(context: S) -> ContextError {
        ContextError::with_context(ErrorKind::Configuration, context)
    }

    pub fn validation<S: Into<String>>(context: S) -> ContextError {
        ContextError::with_context(ErrorKind::Validation, context)
    }

    pub fn generation<S: Into<String>>(context: S) -> ContextError {
        ContextError::with_context(ErrorKind::Generation, context)
    }

    /// Wraps this error into a `Generation` error, keeping the original as its source.
    pub fn into_generation<S: Into<String>>(self, context: S) -> ContextError {
        ContextError::with_error(ErrorKind::Generation, context, &self)
    }
}

/// Minimizes the first letter of a string, it is used for standardizing the error message.
fn minimize_first_letter(string: String) -> String {
    let mut characters = string.chars();
    match characters.next() {
        None => String::new(),
        Some(character) => character.to_lowercase().chain(characters).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_context_and_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file");
        let error = ContextError::with_error(ErrorKind::Configuration, "Failed to read", &source);

        assert_eq!(error.to_string(), "Failed to read: no such file");
        assert_eq!(error.kind, ErrorKind::Configuration);
    }

    #[test]
    fn wrapping_into_generation_keeps_the_cause() {
        let error = ContextError::validation("Missing the field `name`")
            .into_generation("Failed to generate the CV");

        assert_eq!(error.kind, ErrorKind::Generation);
        assert_eq!(
            error.to_string(),
            "Failed to generate the CV: missing the field `name`"
        );
    }
}
