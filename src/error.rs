use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredenceError {
    #[error("not a git repository: {0}")]
    NotGitRepo(String),

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, CredenceError>;

/// Failure of an external repository-fetch collaborator.
///
/// Never surfaces as a `CredenceError`: checkers turn it into `unchecked`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("live repository data unavailable")]
    Unavailable,

    #[error("live repository fetch failed: {0}")]
    Failed(String),
}
