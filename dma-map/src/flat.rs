//! Flat backend: device addresses equal host physical addresses.
//!
//! The reference [`DmaOperations`] implementation for platforms without an
//! IOMMU or bus-address offset. `map` is a pure address translation and
//! never fails; `unmap` has nothing to release. Selected statically
//! (`DmaDevice<FlatDma<P>>`) every call site collapses to direct calls;
//! installed through a trait object it behaves identically.

use core::ptr::NonNull;

use crate::error::{DmaError, Result};
use crate::mapping::{CoherentBuffer, DmaDirection, DmaMapping};
use crate::ops::DmaOperations;
use crate::platform::DmaPlatform;

/// Token for flat mappings. There is no translation state to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatToken;

/// The flat mapping backend.
///
/// Wraps the platform's allocator/translator; holds no per-mapping state.
/// One instance can serve every device on the platform.
#[derive(Debug)]
pub struct FlatDma<P> {
    platform: P,
}

impl<P> FlatDma<P> {
    /// Create a flat backend over the given platform services.
    pub const fn new(platform: P) -> Self {
        Self { platform }
    }

    /// Borrow the underlying platform services.
    pub const fn platform(&self) -> &P {
        &self.platform
    }
}

impl<P: DmaPlatform> DmaOperations for FlatDma<P> {
    type Token = FlatToken;

    fn map(
        &self,
        _mask: u64,
        host: NonNull<u8>,
        _len: usize,
        _dir: DmaDirection,
    ) -> Result<DmaMapping<FlatToken>> {
        // Physical address is the device address; length and direction
        // play no part in computing it.
        Ok(DmaMapping::new(self.platform.virt_to_bus(host), FlatToken))
    }

    fn unmap(&self, _mapping: DmaMapping<FlatToken>) {}

    fn alloc(&self, _mask: u64, len: usize, align: usize) -> Result<CoherentBuffer<FlatToken>> {
        let ptr = self
            .platform
            .alloc_phys(len, align)
            .ok_or(DmaError::OutOfMemory)?;

        // Descriptor rings must start out clean.
        unsafe { core::ptr::write_bytes(ptr.as_ptr(), 0, len) };

        let mapping = DmaMapping::new(self.platform.virt_to_bus(ptr), FlatToken);
        Ok(unsafe { CoherentBuffer::new(ptr, len, mapping) })
    }

    fn free(&self, buffer: CoherentBuffer<FlatToken>) {
        let (ptr, len, _mapping) = buffer.into_parts();
        unsafe { self.platform.free_phys(ptr, len) };
    }

    fn set_mask(&self, mask: u64) -> u64 {
        // No translation windows to choose: a mask derived from installed
        // memory can never be violated by identity mapping.
        mask
    }
}
