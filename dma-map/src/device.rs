//! Device descriptor and the driver-facing dispatch layer.
//!
//! [`DmaDevice`] binds one operation table to one device and forwards every
//! driver call to it, after validating preconditions centrally so no
//! backend ever sees a zero-length or misaligned request. Advisory mapping
//! counters are maintained here for the same reason: every backend gets
//! them for free and none can get them wrong.

use core::ptr::NonNull;

use crate::buffer::HostBuffer;
use crate::error::{DmaError, Result};
use crate::mapping::{CoherentBuffer, DmaDirection, DmaMapping};
use crate::ops::DmaOperations;
use crate::trace;

/// Alignment applied to buffers from
/// [`alloc_rx_buffer`](DmaDevice::alloc_rx_buffer). One cache line, so a
/// device writing a frame never shares a line with unrelated data.
pub const RX_BUFFER_ALIGN: usize = 64;

/// Advisory mapping counters.
///
/// Informational only: correctness never depends on these values and no
/// decision logic reads them. Updates saturate in both directions so
/// misuse can skew the counts but never wrap or trap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DmaStats {
    /// Outstanding streaming mappings.
    pub mapped: u32,
    /// Outstanding coherent allocations.
    pub allocated: u32,
}

/// One DMA-capable device's mapping context.
///
/// `O` is the installed operation table: a concrete backend for static
/// dispatch, or `&'static dyn DmaOperations<Token = T>` for platforms that
/// choose a backend at run time. All mutating methods take `&mut self`;
/// contexts that genuinely run in parallel (e.g. interrupt handlers) must
/// serialize access themselves.
#[derive(Debug)]
pub struct DmaDevice<O: DmaOperations> {
    /// Active operation table. Shared, not owned, when `O` is a reference.
    ops: O,
    /// Addressable-space mask the device can drive.
    mask: u64,
    /// Advisory counters.
    stats: DmaStats,
}

impl<O: DmaOperations> DmaDevice<O> {
    /// Bind an operation table to a fresh descriptor.
    ///
    /// The mask starts at the platform maximum (all ones) until narrowed
    /// via [`set_mask`](Self::set_mask).
    pub const fn new(ops: O) -> Self {
        Self {
            ops,
            mask: u64::MAX,
            stats: DmaStats {
                mapped: 0,
                allocated: 0,
            },
        }
    }

    /// Replace the operation table. Last bind wins; no reference counting.
    ///
    /// Outstanding mappings must have been released first - their tokens
    /// belong to the table that produced them.
    pub fn rebind(&mut self, ops: O) {
        self.ops = ops;
    }

    /// Map host memory for device access.
    ///
    /// # Arguments
    /// - `host`: start of the region; must stay valid and unmoved until
    ///   [`unmap`](Self::unmap)
    /// - `len`: region length in bytes
    /// - `dir`: which direction(s) the device will access
    ///
    /// # Returns
    /// - `Ok(mapping)`: `mapping.device_addr()` is dereferenceable by the
    ///   device for `len` bytes
    /// - `Err(ZeroLength)`: `len` was zero
    /// - `Err(Unmappable)`: backend out of translation resources (retryable)
    pub fn map(
        &mut self,
        host: NonNull<u8>,
        len: usize,
        dir: DmaDirection,
    ) -> Result<DmaMapping<O::Token>> {
        if len == 0 {
            return Err(DmaError::ZeroLength);
        }

        let mapping = self.ops.map(self.mask, host, len, dir).map_err(|err| {
            trace("dma: map failed");
            err
        })?;
        self.stats.mapped = self.stats.mapped.saturating_add(1);
        Ok(mapping)
    }

    /// Release a mapping produced by [`map`](Self::map) on this device.
    pub fn unmap(&mut self, mapping: DmaMapping<O::Token>) {
        self.ops.unmap(mapping);
        self.stats.mapped = self.stats.mapped.saturating_sub(1);
    }

    /// Allocate and map a coherent buffer (descriptor rings, control
    /// structures).
    ///
    /// # Arguments
    /// - `len`: buffer length in bytes
    /// - `align`: physical alignment, a power of two
    ///
    /// # Returns
    /// - `Ok(buffer)`: zeroed, aligned, device-visible memory
    /// - `Err(ZeroLength)` / `Err(BadAlignment)`: invalid request
    /// - `Err(OutOfMemory)`: physical memory exhausted (retryable)
    pub fn alloc(&mut self, len: usize, align: usize) -> Result<CoherentBuffer<O::Token>> {
        if len == 0 {
            return Err(DmaError::ZeroLength);
        }
        if !align.is_power_of_two() {
            return Err(DmaError::BadAlignment);
        }

        let buffer = self.ops.alloc(self.mask, len, align).map_err(|err| {
            trace("dma: coherent alloc failed");
            err
        })?;
        self.stats.allocated = self.stats.allocated.saturating_add(1);
        Ok(buffer)
    }

    /// Release a coherent buffer obtained from [`alloc`](Self::alloc) on
    /// this device.
    pub fn free(&mut self, buffer: CoherentBuffer<O::Token>) {
        self.ops.free(buffer);
        self.stats.allocated = self.stats.allocated.saturating_sub(1);
    }

    /// Declare the address bits the device can drive.
    ///
    /// Returns the effective mask the backend granted, which is also what
    /// subsequent operations will honor. Backends clamp rather than fail.
    pub fn set_mask(&mut self, mask: u64) -> u64 {
        self.mask = self.ops.set_mask(mask);
        self.mask
    }

    /// Declare full 64-bit addressing capability.
    pub fn set_mask_64bit(&mut self) {
        self.set_mask(u64::MAX);
    }

    /// The device's current effective addressable-space mask.
    #[inline]
    pub const fn mask(&self) -> u64 {
        self.mask
    }

    /// Advisory mapping counters.
    #[inline]
    pub const fn stats(&self) -> DmaStats {
        self.stats
    }

    /// Map a buffer object for transmitting data to the device.
    ///
    /// Convenience composition: derives pointer and length from `buf` and
    /// maps [`ToDevice`](DmaDirection::ToDevice).
    pub fn map_tx_buffer<B: HostBuffer>(&mut self, buf: &B) -> Result<DmaMapping<O::Token>> {
        self.map(buf.data(), buf.len(), DmaDirection::ToDevice)
    }

    /// Allocate a coherent buffer sized for receiving data from the device.
    ///
    /// Cache-line aligned ([`RX_BUFFER_ALIGN`]). On failure nothing is
    /// constructed and the error propagates unchanged.
    pub fn alloc_rx_buffer(&mut self, len: usize) -> Result<CoherentBuffer<O::Token>> {
        self.alloc(len, RX_BUFFER_ALIGN)
    }
}
