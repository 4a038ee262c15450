use core::{fmt, mem, ops};

use crossbeam_utils::CachePadded;

use crate::{
    interface::IntoSharedPointer,
    state::{AtomicState, Status},
    storage::Storage,
    sync::Ordering,
};

mod consumer;
mod producer;

#[cfg(all(test, not(loom)))]
mod tests;


pub use consumer::Consumer;
pub use producer::Producer;

/// Two buffers handed back and forth between one producer and one consumer
///
/// One buffer is the *front*, which is stable and may be read at any time, the
/// other is the *back*, which only the producer writes to. Once the producer
/// finishes a write the consumer may swap the two, making the freshly written
/// buffer the new front.
///
/// ```text
///  Idle --update_buffers--> Updating --(write finished)--> Done --swap_buffers--> Idle
/// ```
///
/// The raw operations on this type are `unsafe`, as they rely on there being at
/// most one producer and at most one consumer. Use [`DoubleBufferAtomic::split`]
/// or [`split`] to get a [`Producer`] and a [`Consumer`] which uphold this.
pub struct DoubleBufferAtomic<T, S: Storage = crate::storage::Inline> {
    state: CachePadded<AtomicState>,
    slots: S::Slots<T>,
}

// SAFETY: the producer gets `&mut T` to the back buffer (requires `T: Send`)
// and readers share `&T` to the front buffer (requires `T: Sync`). The state
// machine ensures that these never alias
unsafe impl<T: Send + Sync, S: Storage> Sync for DoubleBufferAtomic<T, S> {}

/// The result of [`Consumer::swap_buffers`]
#[non_exhaustive]
pub struct Swap<'a, T> {
    /// The front buffer after the call
    pub front: &'a T,
    /// `true` if a freshly written buffer was swapped in by this call
    pub swapped: bool,
}

/// Exclusive access to both buffers
#[non_exhaustive]
pub struct SplitMut<'a, T> {
    pub front: &'a mut T,
    pub back: &'a mut T,
}

/// Split a unique pointer to a double buffer into its producer and consumer
pub fn split<P: IntoSharedPointer>(ptr: P) -> (Producer<P::Shared>, Consumer<P::Shared>) {
    let shared = ptr.into_shared();
    // SAFETY: `ptr` was the only pointer to the double buffer, so these are the only
    // producer and consumer for it
    unsafe {
        (
            Producer::from_raw(shared.clone()),
            Consumer::from_raw(shared),
        )
    }
}

impl<T: Clone, S: Storage> DoubleBufferAtomic<T, S> {
    /// Create a double buffer with both buffers set to `initial`
    pub fn new(initial: T) -> Self {
        Self::with_buffers(initial.clone(), initial)
    }
}

impl<T: Default, S: Storage> Default for DoubleBufferAtomic<T, S> {
    fn default() -> Self {
        Self::with_buffers(T::default(), T::default())
    }
}

impl<T, S: Storage> DoubleBufferAtomic<T, S> {
    /// Create a double buffer from its initial front and back buffers
    pub fn with_buffers(front: T, back: T) -> Self {
        Self {
            state: CachePadded::new(AtomicState::new()),
            slots: S::new_slots(front, back),
        }
    }

    pub fn split(&mut self) -> (Producer<&Self>, Consumer<&Self>) {
        split(self)
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.state.load(Ordering::Acquire).status()
    }

    /// The index of the slot currently in front, `0` or `1`
    #[inline]
    pub fn front_index(&self) -> usize {
        self.state.load(Ordering::Acquire).front()
    }

    /// Run `update` on the back buffer if it is idle
    ///
    /// Returns `false` without calling `update` if the last write hasn't been
    /// swapped in yet. If `update` panics the back buffer stays idle, and keeps
    /// whatever `update` left in it.
    ///
    /// # Safety
    ///
    /// * no other thread may call `update_buffers` or `try_update` concurrently
    /// * no references from [`DoubleBufferAtomic::back_unchecked`] may be alive
    #[inline]
    pub unsafe fn update_buffers(&self, update: impl FnOnce(&mut T)) -> bool {
        // SAFETY: the caller upholds the contract of `try_update`
        unsafe { self.try_update(update) }.is_some()
    }

    /// Like [`DoubleBufferAtomic::update_buffers`], but returns the result of `update`
    ///
    /// # Safety
    ///
    /// see [`DoubleBufferAtomic::update_buffers`]
    pub unsafe fn try_update<R>(&self, update: impl FnOnce(&mut T) -> R) -> Option<R> {
        struct AbortOnUnwind<'a>(&'a AtomicState, usize);

        impl Drop for AbortOnUnwind<'_> {
            fn drop(&mut self) {
                self.0.abort_update(self.1)
            }
        }

        let back = self.state.try_begin_update()?;
        let abort = AbortOnUnwind(&self.state, back);

        // SAFETY: the status is `Updating`, so the consumer won't swap this buffer
        // to the front, and the caller ensures there is no other producer. So we
        // have exclusive access to the back buffer until `finish_update`
        let output = update(unsafe { &mut *S::slot(&self.slots, back) });

        mem::forget(abort);
        self.state.finish_update(back);

        Some(output)
    }

    /// Swap the buffers if the back buffer is done being written to
    ///
    /// Returns the front buffer after the call, and whether a swap happened.
    ///
    /// # Safety
    ///
    /// * no other thread may call `swap_buffers` concurrently
    /// * the returned reference, and any references from
    ///   [`DoubleBufferAtomic::front_unchecked`], must not be used after the
    ///   next call to `swap_buffers`
    pub unsafe fn swap_buffers(&self) -> Swap<'_, T> {
        let (state, swapped) = match self.state.try_swap() {
            Ok(state) => (state, true),
            Err(state) => (state, false),
        };

        Swap {
            // SAFETY: the producer never writes to the front buffer, and only the
            // consumer may swap it to the back
            front: unsafe { &*S::slot(&self.slots, state.front()) },
            swapped,
        }
    }

    /// Get the front buffer without synchronizing with the consumer
    ///
    /// # Safety
    ///
    /// The reference must not be used after the next swap
    #[inline]
    pub unsafe fn front_unchecked(&self) -> &T {
        let front = self.front_index();
        // SAFETY: the caller ensures that this buffer isn't swapped to the back,
        // so the producer won't write to it
        unsafe { &*S::slot(&self.slots, front) }
    }

    /// Get the back buffer without synchronizing with the producer
    ///
    /// # Safety
    ///
    /// The reference must not be used while the producer writes to the buffer,
    /// or after the next swap
    #[inline]
    pub unsafe fn back_unchecked(&self) -> &T {
        let back = self.front_index() ^ 1;
        // SAFETY: the caller ensures that the producer doesn't write to this buffer
        // while the reference is alive
        unsafe { &*S::slot(&self.slots, back) }
    }

    #[inline]
    pub fn front_mut(&mut self) -> &mut T {
        self.split_mut().front
    }

    #[inline]
    pub fn back_mut(&mut self) -> &mut T {
        self.split_mut().back
    }

    pub fn split_mut(&mut self) -> SplitMut<'_, T> {
        let front = self.front_index();
        let (slot0, slot1) = split_pair::<T, S>(&mut self.slots);

        match front {
            0 => SplitMut {
                front: slot0,
                back: slot1,
            },
            _ => SplitMut {
                front: slot1,
                back: slot0,
            },
        }
    }

    /// Consume the double buffer, returning the front and back buffers
    pub fn into_buffers(self) -> (T, T) {
        let front = self.front_index();
        let (slot0, slot1) = S::into_slots(self.slots);

        match front {
            0 => (slot0, slot1),
            _ => (slot1, slot0),
        }
    }
}

fn split_pair<T, S: Storage>(slots: &mut S::Slots<T>) -> (&mut T, &mut T) {
    let slot0 = S::slot(slots, 0);
    let slot1 = S::slot(slots, 1);

    // SAFETY: `Storage` guarantees that the two slots are distinct buffers,
    // and we hold a unique borrow of the slots
    unsafe { (&mut *slot0, &mut *slot1) }
}

impl<T, S: Storage> fmt::Debug for DoubleBufferAtomic<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoubleBufferAtomic")
            .field("status", &self.status())
            .field("front_index", &self.front_index())
            .finish_non_exhaustive()
    }
}

impl<T, S: Storage> From<(T, T)> for DoubleBufferAtomic<T, S> {
    fn from((front, back): (T, T)) -> Self {
        Self::with_buffers(front, back)
    }
}

impl<'a, T> Swap<'a, T> {
    #[inline]
    pub const fn into_parts(self) -> (&'a T, bool) {
        (self.front, self.swapped)
    }
}

impl<T> ops::Deref for Swap<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.front
    }
}

impl<T> Clone for Swap<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Swap<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Swap<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Swap")
            .field("front", self.front)
            .field("swapped", &self.swapped)
            .finish()
    }
}
