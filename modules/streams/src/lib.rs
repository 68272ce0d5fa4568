//! Lazy streams with chained transformations and sync/async consumption.
//!
//! A [`core::Stream`] wraps a source and a chain of stage descriptors. Nothing is pulled until a
//! consumption method is called and its evaluation is driven. Streams without asynchronous stages
//! evaluate immediately; streams with them yield a [`core::StreamFuture`] that the caller polls.
//!
//! ```
//! use exstream_rs::core::Stream;
//!
//! let values = Stream::from_iterator([1_u32, 2, 3]).map(|value| value * 2).filter(|value| *value < 6).values();
//! assert_eq!(values.into_immediate(), Some(Ok(vec![2, 4])));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

/// Runtime-agnostic stream engine.
pub mod core;
/// Standard library adapters.
#[cfg(feature = "std")]
pub mod std;
