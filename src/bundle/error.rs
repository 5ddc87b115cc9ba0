use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Failed to read source file {}", path.display())]
    SourceRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Source file {} is not valid UTF-8", path.display())]
    InvalidEncoding {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },

    #[error("Failed to write output file {}", path.display())]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to replace output file {}", path.display())]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

pub type BundleResult<T> = Result<T, BundleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_source_is_reported_once_in_chain() {
        let err = BundleError::SourceRead {
            path: PathBuf::from("docs/source/index.md"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };

        assert_eq!(err.to_string(), "Failed to read source file docs/source/index.md");

        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain.matches("no such file").count(), 1);
    }
}
