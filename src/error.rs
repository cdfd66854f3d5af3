//! Error types

use crate::header_footer::SectionKind;

/// Failure reported by a coordinate probe.
///
/// Never fatal for pagination: every call site degrades to a clamp.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbeError {
    /// The offset lies outside the rendered document
    #[error("position {pos} is outside the rendered document (size {size})")]
    OutOfRange { pos: usize, size: usize },
    /// The content at the offset is not attached or is virtualized
    #[error("position {pos} has no rendered geometry")]
    Unrendered { pos: usize },
    /// The probe answered with NaN or infinite coordinates
    #[error("position {pos} produced non-finite coordinates")]
    NonFinite { pos: usize },
    /// The host threw while probing
    #[error("host probe failed: {0}")]
    Host(String),
}

/// Programming errors in header/footer repository calls
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    #[error("no {kind} record with id `{id}`")]
    UnknownRecord { kind: SectionKind, id: String },
}

/// Crate-level error for loading documents, stores and configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse JSON: {source}{hint}")]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "\n  Hint: check for trailing commas, missing quotes, or unescaped characters."
            }
            serde_json::error::Category::Data => {
                "\n  Hint: the JSON is valid but does not match the expected node/store shape."
            }
            serde_json::error::Category::Eof => "\n  Hint: unexpected end of input, is the JSON truncated?",
            serde_json::error::Category::Io => "",
        };
        Error::Parse {
            source: e,
            hint: hint.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_hint() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.contains("trailing commas"), "{msg}");
    }

    #[test]
    fn test_unknown_record_message() {
        let err = RepositoryError::UnknownRecord {
            kind: SectionKind::Footer,
            id: "rId9".into(),
        };
        assert_eq!(err.to_string(), "no footer record with id `rId9`");
    }
}
