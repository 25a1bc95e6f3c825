// core/src/error.rs
use thiserror::Error;

/// Felles feiltype for kjernen.
///
/// Cache/persistering svelger sine egne feil (kun logging); det som
/// kommer ut her er feil fra konfig, lagring-API og fjerntjenesten.
#[derive(Debug, Error)]
pub enum CardioError {
    #[error("io-feil: {0}")]
    Io(#[from] std::io::Error),

    #[error("ugyldig JSON ved `{path}`: {message}")]
    Json { path: String, message: String },

    #[error("http-feil: {0}")]
    Http(String),

    #[error("fant ikke cardio {0}")]
    NotFound(String),

    #[error("tjenesten svarte med feilkode {0}")]
    FailedResponse(u16),

    #[error("ugyldig konfig: {0}")]
    Config(String),

    #[error("persisteringstråden er stoppet")]
    WorkerGone,
}

impl CardioError {
    /// Konverter en serde_path_to_error-feil til `Json` med feltsti.
    pub fn from_path_error(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        CardioError::Json {
            path: err.path().to_string(),
            message: err.inner().to_string(),
        }
    }
}

impl From<serde_json::Error> for CardioError {
    fn from(err: serde_json::Error) -> Self {
        CardioError::Json {
            path: ".".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<ureq::Error> for CardioError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(404, _) => CardioError::NotFound("404".to_string()),
            ureq::Error::Status(code, _) => CardioError::FailedResponse(code),
            ureq::Error::Transport(t) => CardioError::Http(t.to_string()),
        }
    }
}

pub type CardioResult<T> = Result<T, CardioError>;
