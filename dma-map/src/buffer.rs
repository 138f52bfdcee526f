//! Host buffer abstraction used by the convenience helpers.

use core::ptr::NonNull;

use crate::mapping::CoherentBuffer;

/// Anything that exposes a contiguous host memory region.
///
/// Drivers typically hand their I/O buffer objects to
/// [`map_tx_buffer`](crate::DmaDevice::map_tx_buffer); the dispatch layer
/// only ever reads the pointer and length.
pub trait HostBuffer {
    /// Pointer to the start of the buffer's data.
    fn data(&self) -> NonNull<u8>;

    /// Length of the buffer's data in bytes.
    fn len(&self) -> usize;

    /// Whether the buffer is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> HostBuffer for CoherentBuffer<T> {
    fn data(&self) -> NonNull<u8> {
        // as_ptr comes from the NonNull the backend constructed with.
        unsafe { NonNull::new_unchecked(self.as_ptr()) }
    }

    fn len(&self) -> usize {
        CoherentBuffer::len(self)
    }
}

impl<B: HostBuffer + ?Sized> HostBuffer for &B {
    fn data(&self) -> NonNull<u8> {
        (**self).data()
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}
