use core::ops;

use crate::{raw::DoubleBufferAtomic, storage::Storage};

/// A pointer which uniquely owns or borrows a [`DoubleBufferAtomic`]
///
/// Splitting such a pointer into a [`Producer`](crate::Producer) and a
/// [`Consumer`](crate::Consumer) is how the single producer, single consumer
/// contract is upheld: since the pointer was unique, the two handles created
/// from it are the only ones that can reach the double buffer.
///
/// # Safety
///
/// * `Self` must be the only pointer to its double buffer
/// * [`IntoSharedPointer::into_shared`] must return a pointer to the same double buffer
pub unsafe trait IntoSharedPointer:
    ops::DerefMut<Target = DoubleBufferAtomic<Self::Buffer, Self::Storage>>
{
    type Shared: SharedPointer<Buffer = Self::Buffer, Storage = Self::Storage>;

    type Buffer;
    type Storage: Storage;

    fn into_shared(self) -> Self::Shared;
}

/// A pointer to a [`DoubleBufferAtomic`] shared between a producer and a consumer
///
/// # Safety
///
/// Deref and all clones of `Self` must point to the same double buffer, and that
/// double buffer must stay alive and in place as long as any clone exists
pub unsafe trait SharedPointer:
    Clone + ops::Deref<Target = DoubleBufferAtomic<Self::Buffer, Self::Storage>>
{
    type Buffer;
    type Storage: Storage;
}
