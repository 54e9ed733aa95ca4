use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Not logged in, continue at {login_url}")]
    Unauthorized { login_url: String },

    #[error("Server responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("Rating must be between 0 and 5 in steps of 0.5, got {0}")]
    InvalidRating(f64),
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Not enough empty slots: {files} file(s) selected, {slots} slot(s) free")]
    InsufficientSlots { files: usize, slots: usize },

    #[error("Draft has not been loaded yet")]
    DraftNotLoaded,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No recipe at index {0}")]
    NoSuchRecipe(usize),

    #[error("No uploaded media at position {0}")]
    NoSuchMedia(usize),

    #[error("Recipe at index {0} has no content")]
    NoContent(usize),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}
