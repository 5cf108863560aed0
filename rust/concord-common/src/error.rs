use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    pub fn key_mismatch(
        requested: impl Into<String>,
        found: impl Into<String>,
        line: u64,
    ) -> Error {
        Error(
            ErrorKind::KeyMismatch {
                requested: requested.into(),
                found: found.into(),
                line,
            }
            .into(),
        )
    }

    pub fn perfect_hash_construction(
        bucket: usize,
        bucket_size: usize,
        attempts: u64,
        lam: f64,
        load: f64,
    ) -> Error {
        Error(
            ErrorKind::PerfectHashConstruction {
                bucket,
                bucket_size,
                attempts,
                lam,
                load,
            }
            .into(),
        )
    }

    pub fn config<E>(context: impl Into<String>, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::Config {
                context: context.into(),
                source: Box::new(source),
            }
            .into(),
        )
    }

    /// Returns `true` if the error signals corrupted on-disk state rather than
    /// a caller mistake.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::KeyMismatch { .. } | ErrorKind::InvalidFormat { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error(
        "index line {line} holds key '{found}' but the locator mapped '{requested}' to it; \
         the key locator is out of sync with the index file"
    )]
    KeyMismatch {
        requested: String,
        found: String,
        line: u64,
    },

    #[error(
        "perfect hash construction failed: bucket {bucket} ({bucket_size} keys) found no free \
         displacement in {attempts} attempts with lam={lam}, load={load}; \
         retry with a smaller lam or load"
    )]
    PerfectHashConstruction {
        bucket: usize,
        bucket_size: usize,
        attempts: u64,
        lam: f64,
        load: f64,
    },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("configuration error: {context}")]
    Config {
        context: String,
        source: StdErrorBoxed,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}
