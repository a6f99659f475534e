use thiserror::Error;

pub type GantryResult<T> = Result<T, GantryError>;

#[derive(Error, Debug)]
pub enum GantryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("WalkDir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Audit error: {0}")]
    Audit(String),

    #[error("Statistics error: {0}")]
    Stats(String),

    #[error("Secret error: {0}")]
    Secret(String),

    #[error("Package error: {0}")]
    Package(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration validation found problems that prevent startup.
    /// Should exit with code 1.
    #[error("Configuration check failed: {0}")]
    CheckFailed(String),
}
