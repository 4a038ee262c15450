use crate::{
    interface::{IntoSharedPointer, SharedPointer},
    raw::DoubleBufferAtomic,
    storage::Storage,
};

use alloc::{boxed::Box, sync::Arc};
use rc_box::ArcBox;

// SAFETY: ArcBox is guaranteed to not be aliased
// and will point to the same value as the Arc created from ArcBox::into
unsafe impl<T, S: Storage> IntoSharedPointer for ArcBox<DoubleBufferAtomic<T, S>> {
    type Shared = Arc<DoubleBufferAtomic<T, S>>;

    type Buffer = T;
    type Storage = S;

    #[inline]
    fn into_shared(self) -> Self::Shared {
        self.into()
    }
}

// SAFETY: a Box is never aliased, and the Arc created from it takes ownership of
// the double buffer. Moving it into the Arc's allocation is fine since no
// other pointer to it exists yet
unsafe impl<T, S: Storage> IntoSharedPointer for Box<DoubleBufferAtomic<T, S>> {
    type Shared = Arc<DoubleBufferAtomic<T, S>>;

    type Buffer = T;
    type Storage = S;

    #[inline]
    fn into_shared(self) -> Self::Shared {
        Arc::from(self)
    }
}

// SAFETY: clones of an Arc point to the same allocation, which is kept alive
// until the last clone is dropped
unsafe impl<T, S: Storage> SharedPointer for Arc<DoubleBufferAtomic<T, S>> {
    type Buffer = T;
    type Storage = S;
}
