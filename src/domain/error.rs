//! Domain error types.

/// Top-level error type for emacross.
#[derive(Debug, thiserror::Error)]
pub enum EmacrossError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    /// Returned by series sources. `fetch_or_empty` recovers it as an empty series.
    #[error("no data for {symbol} ({interval})")]
    NoData { symbol: String, interval: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EmacrossError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        EmacrossError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(section: &str, key: &str) -> Self {
        EmacrossError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(
            self,
            EmacrossError::ConfigParse { .. }
                | EmacrossError::ConfigMissing { .. }
                | EmacrossError::ConfigInvalid { .. }
        )
    }
}

impl From<&EmacrossError> for std::process::ExitCode {
    fn from(err: &EmacrossError) -> Self {
        let code: u8 = match err {
            EmacrossError::Io(_) => 1,
            EmacrossError::ConfigParse { .. }
            | EmacrossError::ConfigMissing { .. }
            | EmacrossError::ConfigInvalid { .. } => 2,
            EmacrossError::Data { .. } => 3,
            EmacrossError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

/// Why a single bar could not be processed. The simulation skips the bar and continues.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BarSkip {
    #[error("{indicator} undefined at bar {index}")]
    MissingIndicator {
        index: usize,
        indicator: &'static str,
    },

    #[error("non-finite {field} at bar {index}")]
    NonFinite { index: usize, field: &'static str },
}
