use thiserror::Error;

/// Failure taxonomy shared by the two upstream sources.
///
/// `SourceUnavailable` covers transport-level trouble (DNS, timeout, non-2xx,
/// rejected credentials): transient, retry next cycle. `SchemaMismatch` means
/// the source answered but no longer looks like what the extractor expects:
/// upstream format drift, worth a human look.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{src} unavailable: {reason}")]
    SourceUnavailable { src: &'static str, reason: String },

    #[error("{src} schema mismatch: {reason}")]
    SchemaMismatch { src: &'static str, reason: String },
}

impl SourceError {
    pub fn unavailable(source: &'static str, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            src: source,
            reason: reason.into(),
        }
    }

    pub fn schema_mismatch(source: &'static str, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            src: source,
            reason: reason.into(),
        }
    }

    pub fn source_name(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { src, .. } | Self::SchemaMismatch { src, .. } => src,
        }
    }
}
