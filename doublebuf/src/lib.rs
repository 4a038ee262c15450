//! A lock-free double buffer for one producer and one consumer.
//!
//! [`DoubleBufferAtomic`] holds two buffers. The producer writes into the
//! back buffer with [`Producer::update_buffers`], and the consumer makes the
//! finished back buffer visible with [`Consumer::swap_buffers`]. Neither side
//! ever blocks: an operation that cannot run yet reports that it was skipped.
//!
//! ```
//! use doublebuf::InlineDoubleBuffer;
//!
//! let mut buffer = InlineDoubleBuffer::with_buffers("front", "back");
//! let (mut producer, mut consumer) = buffer.split();
//!
//! assert!(producer.update_buffers(|back| *back = "back2"));
//! // the previous write has not been swapped in yet
//! assert!(!producer.update_buffers(|back| *back = "back3"));
//!
//! let swap = consumer.swap_buffers();
//! assert!(swap.swapped);
//! assert_eq!(*swap, "back2");
//!
//! let swap = consumer.swap_buffers();
//! assert!(!swap.swapped);
//! assert_eq!(*swap.front, "back2");
//! ```

#![no_std]
#![forbid(
    unsafe_op_in_unsafe_fn,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::suspicious_doc_comments,
    clippy::missing_const_for_fn,
    clippy::suspicious,
    clippy::branches_sharing_code,
    clippy::bad_bit_mask,
    clippy::std_instead_of_core,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc
)]
#![cfg_attr(
    not(test),
    forbid(clippy::print_stderr, clippy::print_stdout, clippy::todo)
)]
#![deny(clippy::perf, clippy::arithmetic_side_effects, unused_unsafe)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod interface;

mod ext;
mod sync;

pub mod raw;
pub mod state;
pub mod storage;

pub use raw::{split, Consumer, DoubleBufferAtomic, Producer, SplitMut, Swap};
pub use state::Status;
pub use storage::{Inline, InlineDoubleBuffer, Storage};

#[cfg(feature = "alloc")]
pub use storage::{Boxed, BoxedDoubleBuffer};

#[cfg(feature = "triomphe")]
pub use triomphe;

#[cfg(feature = "alloc")]
pub use rc_box;
