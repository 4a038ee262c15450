use crate::{
    interface::{IntoSharedPointer, SharedPointer},
    raw::DoubleBufferAtomic,
    storage::Storage,
};

use triomphe::{Arc, UniqueArc};

// SAFETY: UniqueArc is guaranteed to not be aliased, and `shareable`
// keeps the same allocation
unsafe impl<T, S: Storage> IntoSharedPointer for UniqueArc<DoubleBufferAtomic<T, S>> {
    type Shared = Arc<DoubleBufferAtomic<T, S>>;

    type Buffer = T;
    type Storage = S;

    #[inline]
    fn into_shared(self) -> Self::Shared {
        self.shareable()
    }
}

// SAFETY: clones of an Arc point to the same allocation, which is kept alive
// until the last clone is dropped
unsafe impl<T, S: Storage> SharedPointer for Arc<DoubleBufferAtomic<T, S>> {
    type Buffer = T;
    type Storage = S;
}
