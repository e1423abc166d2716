use thiserror::Error;

#[derive(Error, Debug)]
pub enum PetmapError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("backend error: {message}")]
    Api { message: String },
}

pub type Result<T> = std::result::Result<T, PetmapError>;
