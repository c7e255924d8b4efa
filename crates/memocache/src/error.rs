//! Error types for memocache

/// Result type alias for cache lookups whose loader fails with `E`
pub type Result<T, E> = std::result::Result<T, Error<E>>;

/// Error types for `get_or_compute`
#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
    /// Key rejected before the store was touched
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Loader returned an error; nothing was stored for the key
    #[error("loader failed: {0}")]
    LoaderFailure(E),
}

impl<E> Error<E> {
    /// Check whether this is an `InvalidArgument` error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    /// Check whether this is a `LoaderFailure` error
    pub fn is_loader_failure(&self) -> bool {
        matches!(self, Error::LoaderFailure(_))
    }

    /// Take the loader's own error out, if there is one
    pub fn into_loader_error(self) -> Option<E> {
        match self {
            Error::LoaderFailure(e) => Some(e),
            Error::InvalidArgument(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err: Error<String> = Error::InvalidArgument("empty key");
        assert_eq!(err.to_string(), "invalid argument: empty key");

        let err: Error<String> = Error::LoaderFailure("timed out".to_string());
        assert_eq!(err.to_string(), "loader failed: timed out");
    }

    #[test]
    fn test_into_loader_error() {
        let err: Error<u32> = Error::LoaderFailure(7);
        assert!(err.is_loader_failure());
        assert_eq!(err.into_loader_error(), Some(7));

        let err: Error<u32> = Error::InvalidArgument("empty key");
        assert!(err.is_invalid_argument());
        assert_eq!(err.into_loader_error(), None);
    }
}
