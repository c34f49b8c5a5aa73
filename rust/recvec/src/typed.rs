//! A typed facade over [`RecordVec`] for plain-old-data element types.

use std::cmp::Ordering;
use std::marker::PhantomData;

use recvec_common::{Error, Result};

use crate::{RecordVec, RecordVecOptions};

/// A dynamic array of `T` values stored as raw records in a [`RecordVec`].
///
/// The element size is `size_of::<T>()`. The backing bytes carry no alignment
/// guarantee, so values are read by copy (`bytemuck::pod_read_unaligned`)
/// rather than by reference.
///
/// # Examples
///
/// ```
/// use recvec::TypedVec;
///
/// let mut v = TypedVec::<i64>::new().unwrap();
/// v.push(3).unwrap();
/// v.push(-1).unwrap();
/// v.sort_by(|a, b| a.cmp(b)).unwrap();
/// assert_eq!(v.to_vec(), [-1, 3]);
/// ```
pub struct TypedVec<T> {
    inner: RecordVec,
    _t: PhantomData<T>,
}

impl<T> TypedVec<T>
where
    T: bytemuck::Pod,
{
    pub fn new() -> Result<TypedVec<T>> {
        Self::with_options(RecordVecOptions::default())
    }

    pub fn with_options(options: RecordVecOptions) -> Result<TypedVec<T>> {
        if size_of::<T>() == 0 {
            return Err(Error::invalid_arg(
                "T",
                "zero-sized types cannot be stored",
            ));
        }
        Ok(TypedVec {
            inner: RecordVec::with_options(size_of::<T>(), options)?,
            _t: PhantomData,
        })
    }

    /// Wraps an existing array whose element size matches `size_of::<T>()`.
    pub fn from_record_vec(inner: RecordVec) -> Result<TypedVec<T>> {
        if inner.element_size() != size_of::<T>() {
            return Err(Error::invalid_arg(
                "inner",
                format!(
                    "element size {} does not match {}",
                    inner.element_size(),
                    size_of::<T>()
                ),
            ));
        }
        Ok(TypedVec {
            inner,
            _t: PhantomData,
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn at(&self, pos: usize) -> Result<T> {
        self.inner.at(pos).map(bytemuck::pod_read_unaligned)
    }

    pub fn push(&mut self, value: T) -> Result<()> {
        self.inner.push(bytemuck::bytes_of(&value))
    }

    pub fn pop(&mut self) -> Result<T> {
        self.inner.pop().map(bytemuck::pod_read_unaligned)
    }

    pub fn remove_at(&mut self, pos: usize) -> Result<T> {
        self.inner
            .remove_at(pos)
            .map(|bytes| bytemuck::pod_read_unaligned(&bytes))
    }

    /// Overwrites the value at `pos`, returning the previous one.
    pub fn replace(&mut self, value: T, pos: usize) -> Result<T> {
        self.inner
            .replace(bytemuck::bytes_of(&value), pos)
            .map(|bytes| bytemuck::pod_read_unaligned(&bytes))
    }

    pub fn reserve(&mut self, target: usize) -> usize {
        self.inner.reserve(target)
    }

    pub fn shrink_to_fit(&mut self) -> usize {
        self.inner.shrink_to_fit()
    }

    /// Resizes to `new_size` values; new values are all-zero bit patterns.
    pub fn resize(&mut self, new_size: usize) -> usize {
        self.inner.resize(new_size)
    }

    pub fn sort_by<F>(&mut self, mut compare: F) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.inner.sort(|a, b| {
            compare(
                &bytemuck::pod_read_unaligned(a),
                &bytemuck::pod_read_unaligned(b),
            )
        })
    }

    /// Sorts, then binary-searches for `key`. See [`RecordVec::find`].
    pub fn find_by<F>(&mut self, key: &T, mut compare: F) -> Result<T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.inner
            .find(bytemuck::bytes_of(key), |a, b| {
                compare(
                    &bytemuck::pod_read_unaligned(a),
                    &bytemuck::pod_read_unaligned(b),
                )
            })
            .map(bytemuck::pod_read_unaligned)
    }

    pub fn index_of_by<F>(&self, key: &T, mut compare: F) -> Option<usize>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.inner.index_of(bytemuck::bytes_of(key), |a, b| {
            compare(
                &bytemuck::pod_read_unaligned(a),
                &bytemuck::pod_read_unaligned(b),
            )
        })
    }

    /// Copies all valid values into a new `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner
            .as_bytes()
            .chunks_exact(size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }

    /// Tears the array down, passing each valid value to `cleanup` in order.
    pub fn destroy(self, cleanup: Option<&mut dyn FnMut(T)>) {
        match cleanup {
            Some(cleanup) => self
                .inner
                .destroy(Some(&mut |e: &[u8]| cleanup(bytemuck::pod_read_unaligned(e)))),
            None => self.inner.destroy(None),
        }
    }

    pub fn as_record_vec(&self) -> &RecordVec {
        &self.inner
    }

    pub fn into_record_vec(self) -> RecordVec {
        self.inner
    }
}

impl<T> std::fmt::Debug for TypedVec<T>
where
    T: bytemuck::Pod + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedVec")
            .field("values", &self.to_vec())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use recvec_common::ErrorKind;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    #[repr(C)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_typed_scenario() {
        let mut v = TypedVec::<u32>::new().unwrap();
        for value in [1, 2, 3] {
            v.push(value).unwrap();
        }
        assert_eq!(v.size(), 3);
        assert_eq!(v.capacity(), 10);
        assert_eq!(v.at(1).unwrap(), 2);

        assert_eq!(v.remove_at(0).unwrap(), 1);
        assert_eq!(v.to_vec(), [2, 3]);

        assert_eq!(v.replace(99, 0).unwrap(), 2);
        assert_eq!(v.to_vec(), [99, 3]);

        assert_eq!(v.index_of_by(&3, u32::cmp), Some(1));

        v.sort_by(u32::cmp).unwrap();
        assert_eq!(v.to_vec(), [3, 99]);

        assert_eq!(v.find_by(&99, u32::cmp).unwrap(), 99);
    }

    #[test]
    fn test_typed_struct_records() {
        let mut v = TypedVec::<Point>::new().unwrap();
        v.push(Point { x: 3, y: 0 }).unwrap();
        v.push(Point { x: -1, y: 7 }).unwrap();
        v.push(Point { x: 2, y: 2 }).unwrap();

        v.sort_by(|a, b| a.x.cmp(&b.x)).unwrap();
        assert_eq!(
            v.to_vec(),
            [
                Point { x: -1, y: 7 },
                Point { x: 2, y: 2 },
                Point { x: 3, y: 0 }
            ]
        );
        assert_eq!(v.pop().unwrap(), Point { x: 3, y: 0 });
        assert_eq!(v.as_record_vec().element_size(), 8);
    }

    #[test]
    fn test_typed_resize_zeroes() {
        let mut v = TypedVec::<f64>::new().unwrap();
        v.push(1.5).unwrap();
        assert_eq!(v.resize(3), 3);
        assert_eq!(v.to_vec(), [1.5, 0.0, 0.0]);
        assert_eq!(v.shrink_to_fit(), 3);
        assert_eq!(v.reserve(12), 12);
    }

    #[test]
    fn test_typed_zero_sized() {
        let err = TypedVec::<()>::new().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
    }

    #[test]
    fn test_typed_from_record_vec() {
        let mut raw = RecordVec::new(2).unwrap();
        raw.push(&7u16.to_ne_bytes()).unwrap();
        let v = TypedVec::<u16>::from_record_vec(raw).unwrap();
        assert_eq!(v.at(0).unwrap(), 7);

        let raw = v.into_record_vec();
        assert!(TypedVec::<u32>::from_record_vec(raw).is_err());
    }

    #[test]
    fn test_typed_destroy() {
        let mut v = TypedVec::<u8>::new().unwrap();
        v.push(1).unwrap();
        v.push(2).unwrap();
        let mut total = 0u32;
        v.destroy(Some(&mut |value: u8| total += u32::from(value)));
        assert_eq!(total, 3);
    }
}
