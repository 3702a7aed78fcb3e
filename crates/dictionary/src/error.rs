use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write dictionary: {0}")]
    Write(#[from] std::io::Error),
    #[error("entry '{key}' contains a delimiter or line break and cannot be saved")]
    Unencodable { key: String },
}

impl DictionaryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
