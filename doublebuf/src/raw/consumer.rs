use core::fmt;

use super::Swap;
use crate::{interface::SharedPointer, state::Status};

/// The reading half of a double buffer
///
/// The consumer is the only one who may swap the buffers. The front buffer it
/// hands out stays valid until the next swap, which the borrow checker enforces:
/// [`Consumer::swap_buffers`] takes `&mut self`, so any number of threads may
/// read the front buffer through a shared `&Consumer` in between swaps.
pub struct Consumer<P: SharedPointer> {
    ptr: P,
}

impl<P: SharedPointer> Consumer<P> {
    /// # Safety
    ///
    /// There must be no other consumer for the double buffer behind `ptr`, and no
    /// other calls to its raw swap operations
    #[inline]
    pub(crate) const unsafe fn from_raw(ptr: P) -> Self {
        Self { ptr }
    }

    /// Swap in the back buffer if the producer finished writing to it
    ///
    /// Always returns the current front buffer, check [`Swap::swapped`] to see if
    /// it changed.
    #[inline]
    pub fn swap_buffers(&mut self) -> Swap<'_, P::Buffer> {
        // SAFETY: this is the only consumer, and since it is borrowed mutably
        // there are no outstanding references from previous swaps
        unsafe { self.ptr.swap_buffers() }
    }

    #[inline]
    pub fn front(&self) -> &P::Buffer {
        // SAFETY: only the consumer may swap the buffers, and it can't while `self`
        // is borrowed
        unsafe { self.ptr.front_unchecked() }
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.ptr.status()
    }

    /// Returns `true` if the next call to [`Consumer::swap_buffers`] will swap
    #[inline]
    pub fn has_update(&self) -> bool {
        self.status() == Status::Done
    }

    #[inline]
    pub fn front_index(&self) -> usize {
        self.ptr.front_index()
    }
}

impl<P: SharedPointer> fmt::Debug for Consumer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
