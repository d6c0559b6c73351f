//! [`Error`] type returned by constructors which reject their arguments.

/// Errors raised while building a pipeline.
///
/// These are reported immediately by the constructor, never lazily during iteration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An argument is outside of the domain accepted by the operator.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

impl Error {
    pub(crate) fn invalid_argument(name: &'static str, reason: &'static str) -> Self {
        tracing::debug!(name, reason, "Rejecting argument.");
        Self::InvalidArgument { name, reason }
    }
}

/// [`Result`](std::result::Result) defaulting to [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let error = Error::invalid_argument("size", "must be greater than zero");
        assert_eq!(
            "invalid argument `size`: must be greater than zero",
            error.to_string()
        );
    }
}
