use thiserror::Error;

/// Crate-level error type.
///
/// Only `Config` crosses the registry boundary synchronously (from `create`).
/// Everything that goes wrong inside a running game ends up as text in
/// `GameState::error_message` instead.
#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Not found: {detail}")]
    NotFound { detail: String },
    #[error("Fatal round error: {detail}")]
    FatalRound { detail: String },
    #[error("I/O error: {detail}")]
    Io {
        detail: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl ArenaError {
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound {
            detail: detail.into(),
        }
    }

    pub fn fatal_round(detail: impl Into<String>) -> Self {
        Self::FatalRound {
            detail: detail.into(),
        }
    }

    pub fn io(detail: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            detail: detail.into(),
            source,
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    /// Short machine-readable code, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            ArenaError::Config { .. } => "CONFIG_ERROR",
            ArenaError::NotFound { .. } => "NOT_FOUND",
            ArenaError::FatalRound { .. } => "FATAL_ROUND_ERROR",
            ArenaError::Io { .. } => "IO_ERROR",
            ArenaError::Internal { .. } => "INTERNAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique() {
        let errors = [
            ArenaError::config("x"),
            ArenaError::not_found("x"),
            ArenaError::fatal_round("x"),
            ArenaError::io("x", std::io::Error::other("boom")),
            ArenaError::internal("x"),
        ];
        let mut codes: Vec<&str> = errors.iter().map(ArenaError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len(), "error codes must be unique");
    }

    #[test]
    fn display_includes_detail() {
        let err = ArenaError::fatal_round("no eligible vote targets in round 3");
        assert_eq!(
            err.to_string(),
            "Fatal round error: no eligible vote targets in round 3"
        );
    }
}
