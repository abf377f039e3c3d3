use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// The settings provider could not be reached or did not answer in time.
    #[error("Settings for index '{index}' unavailable: {reason}")]
    SettingsUnavailable { index: String, reason: String },

    /// The provider answered but holds no record for the index.
    #[error("No settings returned for index '{index}'")]
    SettingsMissing { index: String },

    #[error("Invalid settings for index '{index}': {reason}")]
    InvalidSettings { index: String, reason: String },

    #[error("Hash failure: {0}")]
    HashFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RoutingError {
    pub fn unavailable(index: impl Into<String>, reason: impl ToString) -> Self {
        Self::SettingsUnavailable {
            index: index.into(),
            reason: reason.to_string(),
        }
    }

    pub fn missing(index: impl Into<String>) -> Self {
        Self::SettingsMissing {
            index: index.into(),
        }
    }

    pub fn invalid(index: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidSettings {
            index: index.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true when retrying the same call may succeed.
    ///
    /// Only transport-level failures qualify; a missing index or bad settings
    /// will fail the same way until fixed upstream.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SettingsUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, RoutingError>;

impl From<std::io::Error> for RoutingError {
    fn from(err: std::io::Error) -> Self {
        Self::HashFailure(err.to_string())
    }
}
