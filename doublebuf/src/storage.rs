//! Where the two buffers of a [`DoubleBufferAtomic`](crate::DoubleBufferAtomic) live
//!
//! [`Inline`] keeps both buffers inside the double buffer itself, [`Boxed`]
//! puts them in a single heap allocation. The choice only changes the memory
//! layout, both strategies behave identically.

use core::cell::UnsafeCell;

#[cfg(feature = "alloc")]
mod boxed;

#[cfg(feature = "alloc")]
pub use boxed::Boxed;

/// A storage strategy for the two buffers of a double buffer
///
/// # Safety
///
/// * [`Storage::slot`] must return pointers to two distinct
///   buffers for the indices `0` and `1`, and must always return the same pointer for
///   the same index while the slots are not moved
/// * the pointer returned by [`Storage::slot`] must be valid for reads and writes
///   for as long as the slots are borrowed, and may be written to through a shared
///   reference to the slots
/// * [`Storage::Slots`] must not share any state other than the two buffers
pub unsafe trait Storage {
    type Slots<T>;

    fn new_slots<T>(front: T, back: T) -> Self::Slots<T>;

    /// `index` must be `0` or `1`
    fn slot<T>(slots: &Self::Slots<T>, index: usize) -> *mut T;

    /// Returns the buffers in slot order
    fn into_slots<T>(slots: Self::Slots<T>) -> (T, T);
}

/// Stores both buffers inline, without allocating
pub enum Inline {}

pub type InlineDoubleBuffer<T> = crate::DoubleBufferAtomic<T, Inline>;

#[cfg(feature = "alloc")]
pub type BoxedDoubleBuffer<T> = crate::DoubleBufferAtomic<T, Boxed>;

/// Two buffers which may be written to through a shared reference
#[repr(transparent)]
pub struct SlotPair<T> {
    parts: [UnsafeCell<T>; 2],
}

impl<T> SlotPair<T> {
    #[inline]
    pub(crate) const fn new(front: T, back: T) -> Self {
        Self {
            parts: [UnsafeCell::new(front), UnsafeCell::new(back)],
        }
    }

    #[inline]
    pub(crate) const fn get(&self, index: usize) -> *mut T {
        self.parts[index].get()
    }

    #[inline]
    pub(crate) fn into_inner(self) -> (T, T) {
        let [first, second] = self.parts;
        (first.into_inner(), second.into_inner())
    }
}

// SAFETY:
//
// `SlotPair` holds two distinct cells, indexing them is stable and
// `UnsafeCell::get` is valid to write through from a shared reference
unsafe impl Storage for Inline {
    type Slots<T> = SlotPair<T>;

    #[inline]
    fn new_slots<T>(front: T, back: T) -> Self::Slots<T> {
        SlotPair::new(front, back)
    }

    #[inline]
    fn slot<T>(slots: &Self::Slots<T>, index: usize) -> *mut T {
        slots.get(index)
    }

    #[inline]
    fn into_slots<T>(slots: Self::Slots<T>) -> (T, T) {
        slots.into_inner()
    }
}
