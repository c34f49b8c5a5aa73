//! A resizable contiguous array of fixed-width byte records.
//!
//! [`RecordVec`] stores elements of a caller-chosen byte width in one owned heap
//! buffer and supports amortized O(1) append, positional access and mutation,
//! removal with compaction, sorting and searching with caller-supplied
//! comparators, and explicit teardown with an optional per-element cleanup
//! callback. The container never interprets element bytes.
//!
//! Every capacity computation is checked against [`MAX_BYTES`], and every
//! reallocation is fallible: when growth, `reserve` or `shrink_to_fit` cannot
//! complete, the array keeps its previous buffer, capacity and size.
//!
//! [`TypedVec`] layers a typed API over the same storage for
//! [`bytemuck::Pod`] element types.

pub mod handle;
pub mod options;
pub mod record_vec;
pub(crate) mod storage;
pub mod typed;


pub use handle::{OptionalRecordVec, destroy};
pub use options::{GROWTH_SHIFT, INITIAL_CAPACITY, MAX_BYTES, RecordVecOptions};
pub use record_vec::RecordVec;
pub use recvec_common::{Error, ErrorKind, Result};
pub use typed::TypedVec;

#[cfg(any(test, feature = "test_utils"))]
pub use storage::AllocBehaviour;
