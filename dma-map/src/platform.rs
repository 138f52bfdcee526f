//! Collaborator primitives supplied by the embedding firmware.

use core::ptr::NonNull;

/// Physical memory and address translation services a backend builds on.
///
/// The firmware image provides one implementation; this crate only calls
/// it. Allocation failure is reported as `None` and propagates unchanged
/// through [`alloc`](crate::DmaDevice::alloc).
pub trait DmaPlatform {
    /// Translate a host pointer to the physical address the bus sees.
    ///
    /// Pure and total over valid host pointers.
    fn virt_to_bus(&self, ptr: NonNull<u8>) -> u64;

    /// Allocate `len` bytes of physically contiguous memory at `align`.
    ///
    /// `align` is a power of two. Returns `None` when memory of that
    /// size/alignment cannot be obtained.
    fn alloc_phys(&self, len: usize, align: usize) -> Option<NonNull<u8>>;

    /// Release memory obtained from [`alloc_phys`](Self::alloc_phys).
    ///
    /// # Safety
    /// `ptr` and `len` must denote a still-live `alloc_phys` allocation,
    /// released exactly once.
    unsafe fn free_phys(&self, ptr: NonNull<u8>, len: usize);
}

impl<P: DmaPlatform + ?Sized> DmaPlatform for &P {
    fn virt_to_bus(&self, ptr: NonNull<u8>) -> u64 {
        (**self).virt_to_bus(ptr)
    }

    fn alloc_phys(&self, len: usize, align: usize) -> Option<NonNull<u8>> {
        (**self).alloc_phys(len, align)
    }

    unsafe fn free_phys(&self, ptr: NonNull<u8>, len: usize) {
        (**self).free_phys(ptr, len);
    }
}
