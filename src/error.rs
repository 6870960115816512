//! Error types for claimscope
//!
//! Heuristic "nothing found" outcomes are never errors: an empty claim set or a
//! missing entity recognizer still produce a complete report. The variants here
//! cover engine faults only, i.e. conditions that would make a report meaningless.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Faults raised while building an engine or running an analysis
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// A locale row carries a pattern that does not compile
    #[error("invalid pattern in locale '{locale}': {pattern}: {message}")]
    InvalidPattern {
        locale: String,
        pattern: String,
        message: String,
    },

    /// A claim-marker pattern is missing one of its required capture groups
    #[error("claim marker pattern in locale '{locale}' lacks the '{group}' group: {pattern}")]
    MissingCaptureGroup {
        locale: String,
        pattern: String,
        group: &'static str,
    },

    /// A locale row is unusable as a whole
    #[error("invalid locale table '{locale}': {message}")]
    InvalidLocale { locale: String, message: String },

    /// The resolved locale has no table
    #[error("no locale table configured for '{locale}'")]
    LocaleNotConfigured { locale: String },
}

impl EngineError {
    pub fn invalid_pattern(
        locale: impl Into<String>,
        pattern: impl Into<String>,
        err: &regex::Error,
    ) -> Self {
        Self::InvalidPattern {
            locale: locale.into(),
            pattern: pattern.into(),
            message: err.to_string(),
        }
    }

    pub fn missing_group(
        locale: impl Into<String>,
        pattern: impl Into<String>,
        group: &'static str,
    ) -> Self {
        Self::MissingCaptureGroup {
            locale: locale.into(),
            pattern: pattern.into(),
            group,
        }
    }

    pub fn invalid_locale(locale: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidLocale {
            locale: locale.into(),
            message: message.into(),
        }
    }

    pub fn locale_not_configured(locale: impl Into<String>) -> Self {
        Self::LocaleNotConfigured {
            locale: locale.into(),
        }
    }
}

/// Failures while reading an engine configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Failure of an optional entity recognizer. Never aborts an analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognizerError {
    #[error("no entity model for locale '{locale}'")]
    Unavailable { locale: String },
    #[error("entity recognition failed: {message}")]
    Failed { message: String },
}

impl RecognizerError {
    pub fn unavailable(locale: impl Into<String>) -> Self {
        Self::Unavailable {
            locale: locale.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::locale_not_configured("fr");
        assert!(err.to_string().contains("'fr'"));

        let err = EngineError::missing_group("en", r"claim (\d+)", "num");
        assert!(err.to_string().contains("'num'"));
        assert!(err.to_string().contains("'en'"));
    }

    #[test]
    fn test_invalid_pattern_keeps_regex_message() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err = EngineError::invalid_pattern("en", "(unclosed", &regex_err);
        let text = err.to_string();
        assert!(text.contains("(unclosed"));
        assert!(text.contains("locale 'en'"));
    }
}
