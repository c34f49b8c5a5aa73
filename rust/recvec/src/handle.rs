//! Queries and teardown for a possibly absent [`RecordVec`].
//!
//! A constructed `RecordVec` is always valid. Code that holds an
//! `Option<RecordVec>` (for example, a slot that is filled lazily) uses
//! [`OptionalRecordVec`] to query it without unwrapping: an absent array
//! reports itself as empty.

use recvec_common::{Error, Result};

use crate::RecordVec;

/// Non-panicking access to an `Option<RecordVec>`.
pub trait OptionalRecordVec {
    /// Number of valid elements, `0` when absent.
    fn size(&self) -> usize;

    /// Capacity in elements, `0` when absent.
    fn capacity(&self) -> usize;

    /// `true` when absent or holding no elements.
    fn is_empty(&self) -> bool;

    /// Returns the array, or `InvalidState` when absent.
    fn try_get(&self) -> Result<&RecordVec>;

    /// Returns the array for mutation, or `InvalidState` when absent.
    fn try_get_mut(&mut self) -> Result<&mut RecordVec>;
}

impl OptionalRecordVec for Option<RecordVec> {
    fn size(&self) -> usize {
        self.as_ref().map_or(0, RecordVec::size)
    }

    fn capacity(&self) -> usize {
        self.as_ref().map_or(0, RecordVec::capacity)
    }

    fn is_empty(&self) -> bool {
        self.as_ref().is_none_or(RecordVec::is_empty)
    }

    fn try_get(&self) -> Result<&RecordVec> {
        self.as_ref().ok_or_else(|| Error::invalid_state("RecordVec"))
    }

    fn try_get_mut(&mut self) -> Result<&mut RecordVec> {
        self.as_mut().ok_or_else(|| Error::invalid_state("RecordVec"))
    }
}

/// Tears down `instance` if present, invoking `cleanup` once per valid element
/// in index order before the buffer is released. Does nothing for `None`.
pub fn destroy(instance: Option<RecordVec>, cleanup: Option<&mut dyn FnMut(&[u8])>) {
    if let Some(vec) = instance {
        vec.destroy(cleanup);
    }
}

#[cfg(test)]
mod tests {
    use recvec_common::ErrorKind;

    use super::*;

    #[test]
    fn test_absent_queries() {
        let mut absent: Option<RecordVec> = None;
        assert_eq!(absent.size(), 0);
        assert_eq!(absent.capacity(), 0);
        assert!(absent.is_empty());

        assert!(matches!(
            absent.try_get().unwrap_err().kind(),
            ErrorKind::InvalidState { .. }
        ));
        let err = absent
            .try_get_mut()
            .and_then(|v| v.push(&[1, 2]))
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidState { .. }));
    }

    #[test]
    fn test_present_queries() {
        let mut present = Some(RecordVec::new(2).unwrap());
        assert_eq!(present.capacity(), 10);
        assert!(present.is_empty());

        present.try_get_mut().unwrap().push(&[1, 2]).unwrap();
        assert_eq!(present.size(), 1);
        assert!(!present.is_empty());
        assert_eq!(present.try_get().unwrap().at(0).unwrap(), &[1, 2]);
    }

    #[test]
    fn test_destroy_absent_is_noop() {
        let mut calls = 0;
        destroy(None, Some(&mut |_: &[u8]| calls += 1));
        destroy(None, None);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_destroy_present() {
        let mut v = RecordVec::new(1).unwrap();
        for b in [4u8, 5, 6] {
            v.push(&[b]).unwrap();
        }
        let mut seen = Vec::new();
        destroy(Some(v), Some(&mut |e: &[u8]| seen.extend_from_slice(e)));
        assert_eq!(seen, [4, 5, 6]);
    }
}
