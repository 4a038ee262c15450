use alloc::boxed::Box;

use super::{SlotPair, Storage};

/// Stores both buffers in one heap allocation
///
/// This keeps the double buffer itself small and cheap to move, at the cost
/// of an allocation when it is created.
pub enum Boxed {}

// SAFETY:
//
// The box owns a `SlotPair`, which upholds the contract of `Storage`,
// and the heap allocation never moves while the box is borrowed
unsafe impl Storage for Boxed {
    type Slots<T> = Box<SlotPair<T>>;

    #[inline]
    fn new_slots<T>(front: T, back: T) -> Self::Slots<T> {
        Box::new(SlotPair::new(front, back))
    }

    #[inline]
    fn slot<T>(slots: &Self::Slots<T>, index: usize) -> *mut T {
        slots.get(index)
    }

    #[inline]
    fn into_slots<T>(slots: Self::Slots<T>) -> (T, T) {
        (*slots).into_inner()
    }
}
