//! The dynamic array over fixed-width byte records.

use std::cmp::Ordering;

use log::{debug, trace};
use recvec_common::{Error, Result, verify_arg};

use crate::options::{MAX_BYTES, RecordVecOptions};
use crate::storage::RecordBuf;

#[cfg(any(test, feature = "test_utils"))]
use crate::storage::AllocBehaviour;

/// A resizable contiguous array of opaque, fixed-width byte records.
///
/// Every element occupies exactly `element_size` bytes, fixed at construction.
/// The backing buffer always spans `capacity * element_size` initialized bytes,
/// of which the first `size * element_size` hold valid elements.
///
/// All capacity arithmetic is checked against [`MAX_BYTES`]. Operations that
/// change the capacity either succeed completely or leave the array exactly as
/// it was.
///
/// # Examples
///
/// ```
/// use recvec::RecordVec;
///
/// let mut v = RecordVec::new(4).unwrap();
/// v.push(&7u32.to_ne_bytes()).unwrap();
/// v.push(&9u32.to_ne_bytes()).unwrap();
///
/// assert_eq!(v.size(), 2);
/// assert_eq!(v.capacity(), 10);
/// assert_eq!(v.at(1).unwrap(), &9u32.to_ne_bytes());
/// ```
pub struct RecordVec {
    buf: RecordBuf,
    element_size: usize,
    size: usize,
    initial_capacity: usize,
    growth_shift: u32,
}

impl RecordVec {
    /// Creates an empty array of `element_size`-byte records with the default
    /// initial capacity.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `element_size` is zero.
    /// - `CapacityOverflow` if the initial buffer would exceed [`MAX_BYTES`].
    /// - `AllocationFailure` if the allocator refuses the initial buffer.
    pub fn new(element_size: usize) -> Result<RecordVec> {
        Self::with_options(element_size, RecordVecOptions::default())
    }

    /// Creates an empty array with explicit growth options.
    pub fn with_options(element_size: usize, options: RecordVecOptions) -> Result<RecordVec> {
        verify_arg!(element_size, element_size > 0);
        options.validate()?;

        let initial_capacity = options.initial_capacity();
        let bytes = checked_bytes(initial_capacity, element_size).inspect_err(|e| {
            debug!("RecordVec construction rejected: {e}");
        })?;
        let buf = RecordBuf::zeroed(bytes).inspect_err(|e| {
            debug!("RecordVec construction failed: {e}");
        })?;

        Ok(RecordVec {
            buf,
            element_size,
            size: 0,
            initial_capacity,
            growth_shift: options.growth_shift(),
        })
    }

    /// Number of bytes per element.
    #[inline]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Number of valid elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of elements the buffer holds without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len() / self.element_size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the bytes of all valid elements, in order.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.size * self.element_size]
    }

    /// Returns the bytes of the element at `pos`.
    pub fn at(&self, pos: usize) -> Result<&[u8]> {
        self.check_index(pos)?;
        Ok(self.slot(pos))
    }

    /// Returns the bytes of the element at `pos` for in-place mutation.
    pub fn at_mut(&mut self, pos: usize) -> Result<&mut [u8]> {
        self.check_index(pos)?;
        let range = self.slot_range(pos);
        Ok(&mut self.buf[range])
    }

    /// Appends a copy of `element`, growing the buffer if it is full.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `element` is not exactly `element_size` bytes.
    /// - `CapacityOverflow` or `AllocationFailure` if growth is needed and
    ///   fails. The array is left unchanged.
    pub fn push(&mut self, element: &[u8]) -> Result<()> {
        self.check_element(element)?;
        if self.size == self.capacity() {
            self.grow()?;
        }

        let range = self.slot_range(self.size);
        self.buf[range].copy_from_slice(element);
        self.size += 1;
        Ok(())
    }

    /// Removes the last element and returns a view of its bytes.
    ///
    /// The slot still belongs to the array: a later `push` overwrites it.
    ///
    /// # Errors
    ///
    /// `Empty` if there are no elements.
    pub fn pop(&mut self) -> Result<&[u8]> {
        if self.size == 0 {
            return Err(Error::empty());
        }
        self.size -= 1;
        Ok(self.slot(self.size))
    }

    /// Removes the element at `pos`, shifting the following elements one
    /// position to the left, and returns an owned copy of the removed bytes.
    pub fn remove_at(&mut self, pos: usize) -> Result<Vec<u8>> {
        self.check_index(pos)?;

        let range = self.slot_range(pos);
        let removed = self.buf.copy_range(range.clone())?;
        let live_end = self.size * self.element_size;
        self.buf.copy_within(range.end..live_end, range.start);
        self.size -= 1;
        Ok(removed)
    }

    /// Overwrites the element at `pos` with `element` and returns an owned
    /// copy of the previous bytes.
    pub fn replace(&mut self, element: &[u8], pos: usize) -> Result<Vec<u8>> {
        self.check_element(element)?;
        self.check_index(pos)?;

        let range = self.slot_range(pos);
        let previous = self.buf.copy_range(range.clone())?;
        self.buf[range].copy_from_slice(element);
        Ok(previous)
    }

    /// Ensures room for `target` elements, growing to exactly `target` when the
    /// current capacity is smaller.
    ///
    /// Returns the capacity after the call. When the target cannot be reached
    /// (overflow or a refused allocation) the capacity is unchanged, so callers
    /// detect failure by comparing the result against `target`. Use
    /// [`try_reserve`](Self::try_reserve) to get the reason.
    pub fn reserve(&mut self, target: usize) -> usize {
        match self.try_reserve(target) {
            Ok(capacity) => capacity,
            Err(_) => self.capacity(),
        }
    }

    /// Fallible form of [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, target: usize) -> Result<usize> {
        if target > self.capacity() {
            self.realloc(target)?;
        }
        Ok(self.capacity())
    }

    /// Reallocates the buffer to hold exactly `size` elements and returns the
    /// resulting capacity. An empty array releases its buffer.
    ///
    /// A refused allocation leaves the capacity unchanged.
    pub fn shrink_to_fit(&mut self) -> usize {
        let old_capacity = self.capacity();
        match self.buf.shrink_to(self.size * self.element_size) {
            Ok(()) if self.capacity() != old_capacity => {
                trace!(
                    "RecordVec shrank from {old_capacity} to {} elements",
                    self.capacity()
                );
            }
            Ok(()) => {}
            Err(e) => {
                debug!("RecordVec shrink_to_fit failed: {e}");
            }
        }
        self.capacity()
    }

    /// Changes the number of valid elements to `new_size` and returns the
    /// resulting size.
    ///
    /// Growing zero-fills the newly exposed elements, reserving exactly
    /// `new_size` if the capacity is insufficient; if that reservation fails
    /// the size is unchanged. Shrinking only truncates: the discarded bytes are
    /// neither cleared nor passed to any cleanup callback.
    pub fn resize(&mut self, new_size: usize) -> usize {
        if new_size <= self.size {
            self.size = new_size;
            return self.size;
        }

        if new_size > self.capacity() && self.try_reserve(new_size).is_err() {
            return self.size;
        }

        let es = self.element_size;
        self.buf[self.size * es..new_size * es].fill(0);
        self.size = new_size;
        self.size
    }

    /// Sorts the valid elements with a three-way comparator over their bytes.
    ///
    /// The sort is unstable. It orders an index permutation and gathers the
    /// valid elements into scratch space sized to `size`, then copies them
    /// back; the spare capacity and the allocation are left untouched. Fails
    /// with `AllocationFailure` (leaving the order unchanged) if the scratch
    /// space cannot be allocated.
    pub fn sort<F>(&mut self, mut compare: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]) -> Ordering,
    {
        if self.size < 2 {
            return Ok(());
        }

        let es = self.element_size;
        let live = self.size * es;
        let mut order: Vec<usize> = self.buf.scratch(self.size)?;
        let mut sorted: Vec<u8> = self.buf.scratch(live)?;

        let bytes = self.buf.as_slice();
        order.extend(0..self.size);
        order.sort_unstable_by(|&a, &b| {
            compare(&bytes[a * es..(a + 1) * es], &bytes[b * es..(b + 1) * es])
        });
        for &i in &order {
            sorted.extend_from_slice(&bytes[i * es..(i + 1) * es]);
        }

        self.buf[..live].copy_from_slice(&sorted);
        Ok(())
    }

    /// Sorts the array, then binary-searches it for an element equal to `key`.
    ///
    /// Note that this reorders the array as a side effect: after the call the
    /// elements are sorted by `compare`. The comparator receives the key first
    /// and a stored element second, and must agree with the sort order.
    /// Use [`index_of`](Self::index_of) for a search that preserves the order.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no element compares equal to `key`.
    /// - `AllocationFailure` if sorting fails.
    pub fn find<F>(&mut self, key: &[u8], mut compare: F) -> Result<&[u8]>
    where
        F: FnMut(&[u8], &[u8]) -> Ordering,
    {
        self.sort(|a, b| compare(a, b))?;

        let mut lo = 0;
        let mut hi = self.size;
        let mut found = None;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match compare(key, self.slot(mid)) {
                Ordering::Less => hi = mid,
                Ordering::Greater => lo = mid + 1,
                Ordering::Equal => {
                    found = Some(mid);
                    break;
                }
            }
        }

        match found {
            Some(pos) => Ok(self.slot(pos)),
            None => Err(Error::not_found()),
        }
    }

    /// Returns the position of the first element equal to `key`, scanning in
    /// the current order, or `None` if there is none.
    ///
    /// The comparator receives the key first and a stored element second.
    pub fn index_of<F>(&self, key: &[u8], mut compare: F) -> Option<usize>
    where
        F: FnMut(&[u8], &[u8]) -> Ordering,
    {
        (0..self.size).find(|&i| compare(key, self.slot(i)) == Ordering::Equal)
    }

    /// Tears the array down, invoking `cleanup` once per valid element in
    /// index order before the buffer is released.
    ///
    /// Dropping a `RecordVec` releases the buffer without any callback.
    pub fn destroy(self, cleanup: Option<&mut dyn FnMut(&[u8])>) {
        if let Some(cleanup) = cleanup {
            for element in self.as_bytes().chunks_exact(self.element_size) {
                cleanup(element);
            }
        }
    }

    /// Changes the allocation test behaviour of the backing buffer.
    #[cfg(any(test, feature = "test_utils"))]
    pub fn change_behaviour(&mut self, behaviour: AllocBehaviour) {
        self.buf.change_behaviour(behaviour);
    }
}

impl RecordVec {
    /// Automatic growth triggered by `push` on a full buffer.
    #[cold]
    fn grow(&mut self) -> Result<()> {
        let capacity = self.capacity();
        let new_capacity = if capacity == 0 {
            self.initial_capacity
        } else {
            if capacity > MAX_BYTES >> self.growth_shift {
                debug!("RecordVec growth rejected: capacity {capacity} cannot be shifted");
                return Err(Error::capacity_overflow(capacity, self.element_size));
            }
            capacity << self.growth_shift
        };
        self.realloc(new_capacity)
    }

    /// Reallocates the buffer to exactly `new_capacity` elements, zero-filling
    /// everything past the valid elements.
    fn realloc(&mut self, new_capacity: usize) -> Result<()> {
        let old_capacity = self.capacity();
        let bytes = checked_bytes(new_capacity, self.element_size).inspect_err(|e| {
            debug!("RecordVec reallocation rejected: {e}");
        })?;
        self.buf
            .grow_zeroed(bytes, self.size * self.element_size)
            .inspect_err(|e| {
                debug!("RecordVec reallocation to {new_capacity} elements failed: {e}");
            })?;
        trace!(
            "RecordVec grew from {old_capacity} to {new_capacity} elements of {} bytes",
            self.element_size
        );
        Ok(())
    }

    #[inline]
    fn slot_range(&self, pos: usize) -> std::ops::Range<usize> {
        let start = pos * self.element_size;
        start..start + self.element_size
    }

    #[inline]
    fn slot(&self, pos: usize) -> &[u8] {
        &self.buf[self.slot_range(pos)]
    }

    #[inline]
    fn check_index(&self, pos: usize) -> Result<()> {
        if pos < self.size {
            Ok(())
        } else {
            Err(Error::index_out_of_range(pos, self.size))
        }
    }

    fn check_element(&self, element: &[u8]) -> Result<()> {
        if element.len() == self.element_size {
            Ok(())
        } else {
            Err(Error::invalid_arg(
                "element",
                format!(
                    "expected {} bytes, got {}",
                    self.element_size,
                    element.len()
                ),
            ))
        }
    }
}

impl std::fmt::Debug for RecordVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordVec")
            .field("element_size", &self.element_size)
            .field("size", &self.size)
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

/// Computes `capacity * element_size`, failing if it would exceed [`MAX_BYTES`].
///
/// The limit is checked by division so the product is never formed past it.
fn checked_bytes(capacity: usize, element_size: usize) -> Result<usize> {
    if capacity > MAX_BYTES / element_size {
        return Err(Error::capacity_overflow(capacity, element_size));
    }
    Ok(capacity * element_size)
}
