use crate::{
    interface::{IntoSharedPointer, SharedPointer},
    raw::DoubleBufferAtomic,
    storage::Storage,
};

#[cfg(feature = "triomphe")]
mod triomphe;

#[cfg(feature = "alloc")]
mod std_arc;


// SAFETY: a mutable reference is unique, and reborrowing it as shared
// points to the same double buffer
unsafe impl<'a, T, S: Storage> IntoSharedPointer for &'a mut DoubleBufferAtomic<T, S> {
    type Shared = &'a DoubleBufferAtomic<T, S>;

    type Buffer = T;
    type Storage = S;

    #[inline]
    fn into_shared(self) -> Self::Shared {
        self
    }
}

// SAFETY: copies of a shared reference point to the same double buffer,
// which is borrowed for the lifetime of the reference
unsafe impl<T, S: Storage> SharedPointer for &DoubleBufferAtomic<T, S> {
    type Buffer = T;
    type Storage = S;
}
