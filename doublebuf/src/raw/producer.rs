use core::fmt;

use crate::{interface::SharedPointer, state::Status};

/// The writing half of a double buffer
///
/// There is only ever one producer for a double buffer, so it is the only one
/// who may write to the back buffer.
pub struct Producer<P: SharedPointer> {
    ptr: P,
}

impl<P: SharedPointer> Producer<P> {
    /// # Safety
    ///
    /// There must be no other producer for the double buffer behind `ptr`, and no
    /// other calls to its raw update operations
    #[inline]
    pub(crate) const unsafe fn from_raw(ptr: P) -> Self {
        Self { ptr }
    }

    /// Run `update` on the back buffer if the last write was already swapped in
    ///
    /// Returns `true` if `update` ran. Nothing is written, and `update` is dropped,
    /// if the consumer hasn't swapped in the previous write yet.
    #[inline]
    pub fn update_buffers(&mut self, update: impl FnOnce(&mut P::Buffer)) -> bool {
        // SAFETY: this is the only producer, and it is borrowed mutably
        unsafe { self.ptr.update_buffers(update) }
    }

    /// Like [`Producer::update_buffers`], but returns the result of `update`
    #[inline]
    pub fn try_update<R>(&mut self, update: impl FnOnce(&mut P::Buffer) -> R) -> Option<R> {
        // SAFETY: this is the only producer, and it is borrowed mutably
        unsafe { self.ptr.try_update(update) }
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.ptr.status()
    }

    /// Returns `true` if the next call to [`Producer::update_buffers`] will write
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.status() == Status::Idle
    }

    #[inline]
    pub fn front_index(&self) -> usize {
        self.ptr.front_index()
    }
}

impl<P: SharedPointer> fmt::Debug for Producer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
