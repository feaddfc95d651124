use thiserror::Error;

/// BoxedError is the dynamic error type caller-supplied fallible
/// callbacks report their failures with. Anything that converts into
/// it (errors, `String`, `&str`) can be used on the failing side of a
/// callback result.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

pub type OptionalResult<T> = anyhow::Result<T, OptionalError>;

/// OptionalError is the single error kind the optional engine ever
/// raises. Every raising seam either reports an absent cell or wraps
/// a failed caller-supplied callback with the original failure kept
/// reachable as the nested cause.
#[derive(Error, Debug)]
pub enum OptionalError {
    #[error("Called unwrap on an absent optional value")]
    AbsentValue,

    #[error("{0}")]
    Expectation(String),

    #[error("{message}")]
    Callback {
        message: String,

        #[source]
        cause: BoxedError,
    },
}

impl OptionalError {
    pub fn callback<M, E>(message: M, cause: E) -> Self
    where
        M: Into<String>,
        E: Into<BoxedError>,
    {
        Self::Callback {
            message: message.into(),
            cause: cause.into(),
        }
    }
}
