//! Raw byte storage backing a [`RecordVec`](crate::RecordVec).

use recvec_common::{Error, Result};

/// Test behaviour for injecting allocation failures into [`RecordBuf`].
///
/// The behaviour is sticky: once set, it stays active until changed.
#[cfg(any(test, feature = "test_utils"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AllocBehaviour {
    /// Normal behaviour, no injected failures.
    #[default]
    None,
    /// Growing the buffer fails as if the allocator refused.
    FailAtGrow,
    /// Shrinking the buffer fails as if the allocator refused.
    FailAtShrink,
    /// Copying an element out, or allocating sort scratch space, fails.
    FailAtCopy,
}

/// A contiguous, exclusively owned, fully initialized byte buffer whose length
/// is exactly the number of bytes reserved for elements.
///
/// Every reallocation is fallible: on failure the current bytes are left
/// untouched.
pub struct RecordBuf {
    inner: Vec<u8>,
    #[cfg(any(test, feature = "test_utils"))]
    behaviour: AllocBehaviour,
}

impl RecordBuf {
    /// Creates an empty buffer that owns no allocation.
    pub fn new() -> RecordBuf {
        RecordBuf {
            inner: Vec::new(),
            #[cfg(any(test, feature = "test_utils"))]
            behaviour: AllocBehaviour::None,
        }
    }

    /// Allocates a buffer of `len` zero bytes.
    pub fn zeroed(len: usize) -> Result<RecordBuf> {
        let mut buf = RecordBuf::new();
        buf.grow_zeroed(len, 0)?;
        Ok(buf)
    }

    /// Number of bytes in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.inner
    }

    /// Reallocates the buffer to `new_len` bytes and zero-fills
    /// `[fill_from, new_len)`.
    ///
    /// Bytes before `fill_from` are preserved exactly. Does nothing if
    /// `new_len` does not exceed the current length.
    pub fn grow_zeroed(&mut self, new_len: usize, fill_from: usize) -> Result<()> {
        let len = self.len();
        if new_len <= len {
            return Ok(());
        }

        #[cfg(any(test, feature = "test_utils"))]
        if self.behaviour == AllocBehaviour::FailAtGrow {
            return Err(Error::allocation_failure(new_len));
        }

        self.inner
            .try_reserve_exact(new_len - len)
            .map_err(|_| Error::allocation_failure(new_len))?;

        let fill_from = fill_from.min(len);
        self.inner[fill_from..].fill(0);
        self.inner.resize(new_len, 0);
        Ok(())
    }

    /// Reallocates the buffer down to exactly `new_len` bytes. Does nothing if
    /// `new_len` is not below the current length.
    ///
    /// The surviving bytes are copied into a fresh allocation of the exact
    /// size, so a refused allocation leaves the current buffer in place.
    /// A zero `new_len` releases the allocation entirely.
    pub fn shrink_to(&mut self, new_len: usize) -> Result<()> {
        if new_len >= self.len() {
            return Ok(());
        }

        #[cfg(any(test, feature = "test_utils"))]
        if self.behaviour == AllocBehaviour::FailAtShrink {
            return Err(Error::allocation_failure(new_len));
        }

        let mut shrunk = Vec::new();
        if new_len != 0 {
            shrunk
                .try_reserve_exact(new_len)
                .map_err(|_| Error::allocation_failure(new_len))?;
            shrunk.extend_from_slice(&self.inner[..new_len]);
        }
        self.inner = shrunk;
        Ok(())
    }

    /// Copies `range` into a newly allocated, caller-owned vector.
    pub fn copy_range(&self, range: std::ops::Range<usize>) -> Result<Vec<u8>> {
        let bytes = &self.inner[range];
        let mut copy = self.scratch(bytes.len())?;
        copy.extend_from_slice(bytes);
        Ok(copy)
    }

    /// Allocates an empty vector able to hold `len` items without reallocating.
    pub fn scratch<T>(&self, len: usize) -> Result<Vec<T>> {
        #[cfg(any(test, feature = "test_utils"))]
        if self.behaviour == AllocBehaviour::FailAtCopy {
            return Err(Error::allocation_failure(len));
        }

        let mut scratch = Vec::new();
        scratch
            .try_reserve_exact(len)
            .map_err(|_| Error::allocation_failure(len.saturating_mul(size_of::<T>())))?;
        Ok(scratch)
    }

    /// Changes the test behaviour of this buffer.
    #[cfg(any(test, feature = "test_utils"))]
    pub fn change_behaviour(&mut self, behaviour: AllocBehaviour) {
        self.behaviour = behaviour;
    }
}

impl std::ops::Deref for RecordBuf {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl std::ops::DerefMut for RecordBuf {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl std::fmt::Debug for RecordBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordBuf")
            .field("len", &self.len())
            .field("internal_cap", &self.inner.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_buf_zeroed() {
        let buf = RecordBuf::zeroed(40).unwrap();
        assert_eq!(buf.len(), 40);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_record_buf_grow_preserves_prefix() {
        let mut buf = RecordBuf::zeroed(8).unwrap();
        buf.as_mut_slice().copy_from_slice(b"abcdefgh");
        buf.grow_zeroed(16, 8).unwrap();
        assert_eq!(&buf[..8], b"abcdefgh");
        assert_eq!(&buf[8..], &[0u8; 8]);
    }

    #[test]
    fn test_record_buf_grow_zero_fills_stale_tail() {
        let mut buf = RecordBuf::zeroed(8).unwrap();
        buf.as_mut_slice().copy_from_slice(b"abcdefgh");
        // Only the first four bytes are live; the rest must be cleared.
        buf.grow_zeroed(12, 4).unwrap();
        assert_eq!(&buf[..4], b"abcd");
        assert!(buf[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_record_buf_grow_smaller_is_noop() {
        let mut buf = RecordBuf::zeroed(8).unwrap();
        buf.as_mut_slice().fill(7);
        buf.grow_zeroed(4, 0).unwrap();
        assert_eq!(buf.len(), 8);
        assert!(buf.iter().all(|&b| b == 7));
    }

    #[test]
    fn test_record_buf_grow_failure_keeps_contents() {
        let mut buf = RecordBuf::zeroed(4).unwrap();
        buf.as_mut_slice().copy_from_slice(b"wxyz");
        buf.change_behaviour(AllocBehaviour::FailAtGrow);
        let err = buf.grow_zeroed(64, 4).unwrap_err();
        assert!(err.is_allocation_failure());
        assert_eq!(buf.as_slice(), b"wxyz");
    }

    #[test]
    fn test_record_buf_shrink() {
        let mut buf = RecordBuf::zeroed(16).unwrap();
        buf.as_mut_slice()[..4].copy_from_slice(b"keep");
        buf.shrink_to(4).unwrap();
        assert_eq!(buf.as_slice(), b"keep");

        buf.shrink_to(0).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_record_buf_shrink_failure_keeps_contents() {
        let mut buf = RecordBuf::zeroed(16).unwrap();
        buf.change_behaviour(AllocBehaviour::FailAtShrink);
        assert!(buf.shrink_to(4).unwrap_err().is_allocation_failure());
        assert_eq!(buf.len(), 16);
    }

    #[test]
    fn test_record_buf_copy_range() {
        let mut buf = RecordBuf::zeroed(6).unwrap();
        buf.as_mut_slice().copy_from_slice(b"abcdef");
        assert_eq!(buf.copy_range(2..5).unwrap(), b"cde");

        buf.change_behaviour(AllocBehaviour::FailAtCopy);
        assert!(buf.copy_range(0..2).unwrap_err().is_allocation_failure());
        assert!(buf.scratch::<usize>(3).is_err());
    }
}
