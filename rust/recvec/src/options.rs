//! Construction options and the growth policy constants.

use recvec_common::{Result, verify_arg};

/// Number of elements allocated by [`RecordVec::new`](crate::RecordVec::new).
pub const INITIAL_CAPACITY: usize = 10;

/// Left-shift applied to the capacity on automatic growth (`1` doubles it).
pub const GROWTH_SHIFT: u32 = 1;

/// Largest byte count a buffer may span.
///
/// Equal to `isize::MAX`, which is both the largest signed byte count and the
/// largest allocation Rust permits.
pub const MAX_BYTES: usize = isize::MAX as usize;

/// Options controlling the initial allocation and growth of a
/// [`RecordVec`](crate::RecordVec).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordVecOptions {
    initial_capacity: usize,
    growth_shift: u32,
}

impl RecordVecOptions {
    pub fn new() -> RecordVecOptions {
        RecordVecOptions {
            initial_capacity: INITIAL_CAPACITY,
            growth_shift: GROWTH_SHIFT,
        }
    }

    /// Sets the number of elements allocated at construction.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Sets the shift applied to the capacity when `push` needs more room.
    pub fn with_growth_shift(mut self, growth_shift: u32) -> Self {
        self.growth_shift = growth_shift;
        self
    }

    #[inline]
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    #[inline]
    pub fn growth_shift(&self) -> u32 {
        self.growth_shift
    }

    pub(crate) fn validate(&self) -> Result<()> {
        verify_arg!(initial_capacity, self.initial_capacity > 0);
        verify_arg!(growth_shift, self.growth_shift > 0);
        verify_arg!(growth_shift, self.growth_shift < usize::BITS);
        Ok(())
    }
}

impl Default for RecordVecOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RecordVecOptions::default();
        assert_eq!(options.initial_capacity(), INITIAL_CAPACITY);
        assert_eq!(options.growth_shift(), GROWTH_SHIFT);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_invalid_options() {
        assert!(
            RecordVecOptions::new()
                .with_initial_capacity(0)
                .validate()
                .is_err()
        );
        assert!(RecordVecOptions::new().with_growth_shift(0).validate().is_err());
        assert!(
            RecordVecOptions::new()
                .with_growth_shift(usize::BITS)
                .validate()
                .is_err()
        );
        assert!(RecordVecOptions::new().with_growth_shift(3).validate().is_ok());
    }
}
