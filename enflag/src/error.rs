//! Error types for configuration loading

use std::path::PathBuf;

/// Errors that can occur while populating a configuration structure.
///
/// This error type covers the failure scenarios of a load:
/// - Env file open/read failures and malformed lines
/// - Missing required fields
/// - Values that cannot be converted to the field's type
#[derive(Debug, thiserror::Error)]
pub enum EnflagError {
    /// Failed to open or read an explicitly requested env file.
    ///
    /// Auto-discovered files that do not exist are skipped silently and
    /// never produce this error.
    #[error("failed to load env file '{path}': {source}")]
    EnvFile {
        /// Path of the file that could not be read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// An env file contains a line that is not `KEY=VALUE`, a comment, or
    /// blank.
    #[error("invalid line {line} in env file '{path}': {content}")]
    EnvFileSyntax {
        /// Path of the offending file
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// The offending line, trimmed
        content: String,
    },

    /// A required field found no value in any tier (flag, environment,
    /// default).
    #[error("required field '{name}' is not set")]
    MissingRequired {
        /// Fully qualified primary environment name of the field
        name: String,
    },

    /// A resolved raw value could not be converted to the field's type.
    ///
    /// For sequence fields the message names the failing element index.
    #[error("invalid value '{value}' for '{name}' as {type_name}: {message}")]
    Conversion {
        /// Fully qualified primary environment name of the field
        name: String,
        /// The raw value that failed to convert
        value: String,
        /// Fully qualified target type name
        type_name: &'static str,
        /// Message from the conversion
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_file_syntax_formats_correctly() {
        let err = EnflagError::EnvFileSyntax {
            path: ".env.local".into(),
            line: 7,
            content: "NO_EQUALS_SIGN".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains(".env.local"));
        assert!(msg.contains('7'));
        assert!(msg.contains("NO_EQUALS_SIGN"));
    }

    #[test]
    fn missing_required_names_field() {
        let err = EnflagError::MissingRequired {
            name: "APP_DB_HOST".into(),
        };
        assert!(err.to_string().contains("APP_DB_HOST"));
    }

    #[test]
    fn conversion_names_field_and_type() {
        let err = EnflagError::Conversion {
            name: "PORT".into(),
            value: "not-a-number".into(),
            type_name: std::any::type_name::<u16>(),
            message: "invalid digit found in string".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("PORT"));
        assert!(msg.contains("u16"));
        assert!(msg.contains("not-a-number"));
    }
}
