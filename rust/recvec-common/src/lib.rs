//! Core definitions (error type and verification helpers), relied upon by all recvec-* crates.

pub mod error;
pub mod result;

pub use error::{Error, ErrorKind};
pub use result::Result;
