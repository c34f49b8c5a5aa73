use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
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

    pub fn capacity_overflow(capacity: usize, element_size: usize) -> Error {
        Error(
            ErrorKind::CapacityOverflow {
                capacity,
                element_size,
            }
            .into(),
        )
    }

    pub fn allocation_failure(bytes: usize) -> Error {
        Error(ErrorKind::AllocationFailure { bytes }.into())
    }

    pub fn index_out_of_range(index: usize, size: usize) -> Error {
        Error(ErrorKind::IndexOutOfRange { index, size }.into())
    }

    pub fn invalid_state(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidState { name: name.into() }.into())
    }

    pub fn not_found() -> Error {
        Error(ErrorKind::NotFound.into())
    }

    pub fn empty() -> Error {
        Error(ErrorKind::Empty.into())
    }

    /// Returns `true` if this error reports that a capacity computation would
    /// exceed the maximum representable byte count.
    pub fn is_capacity_overflow(&self) -> bool {
        matches!(self.kind(), ErrorKind::CapacityOverflow { .. })
    }

    /// Returns `true` if this error reports a refused allocation.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self.kind(), ErrorKind::AllocationFailure { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error(
        "capacity overflow: {capacity} elements of {element_size} bytes exceed the maximum byte count"
    )]
    CapacityOverflow {
        capacity: usize,
        element_size: usize,
    },

    #[error("failed to allocate {bytes} bytes")]
    AllocationFailure { bytes: usize },

    #[error("index {index} is out of range for size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("invalid state: {name} is not initialized")]
    InvalidState { name: String },

    #[error("no matching element")]
    NotFound,

    #[error("the array is empty")]
    Empty,
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_roundtrip() {
        let e = Error::index_out_of_range(7, 3);
        assert!(matches!(
            e.kind(),
            ErrorKind::IndexOutOfRange { index: 7, size: 3 }
        ));
        assert_eq!(e.to_string(), "index 7 is out of range for size 3");
        assert!(matches!(e.into_kind(), ErrorKind::IndexOutOfRange { .. }));
    }

    #[test]
    fn test_error_predicates() {
        assert!(Error::capacity_overflow(usize::MAX, 8).is_capacity_overflow());
        assert!(!Error::capacity_overflow(usize::MAX, 8).is_allocation_failure());
        assert!(Error::allocation_failure(1024).is_allocation_failure());
        assert!(!Error::not_found().is_capacity_overflow());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::invalid_arg("element_size", "must be positive").to_string(),
            "invalid argument element_size: must be positive"
        );
        assert_eq!(
            Error::invalid_state("vector").to_string(),
            "invalid state: vector is not initialized"
        );
        assert_eq!(Error::empty().to_string(), "the array is empty");
    }
}
