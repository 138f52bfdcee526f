//! The operation table contract implemented by platform backends.

use core::ptr::NonNull;

use crate::error::Result;
use crate::mapping::{CoherentBuffer, DmaDirection, DmaMapping};

/// One platform's set of DMA mapping operations.
///
/// A backend is stateless from the caller's point of view and may be shared
/// by many devices of the same class; per-device state (addressable mask,
/// counters) lives in [`DmaDevice`](crate::DmaDevice), which forwards every
/// call here after validating preconditions.
///
/// `Token` is the backend-defined payload carried inside each
/// [`DmaMapping`]; release operations take the mapping by value, so a
/// mapping can only go back to a backend with the same token type.
///
/// Implementations must be usable both monomorphized (static dispatch) and
/// as `dyn DmaOperations<Token = T>` behind a reference (runtime dispatch);
/// the blanket impl below covers the reference form.
pub trait DmaOperations {
    /// Backend-owned state attached to each mapping.
    type Token;

    /// Map host memory for device access.
    ///
    /// # Arguments
    /// - `mask`: the device's current addressable-space mask, for backends
    ///   that choose translation windows
    /// - `host`: start of the region; must stay valid and unmoved until the
    ///   mapping is returned via [`unmap`](Self::unmap)
    /// - `len`: region length, guaranteed non-zero by the dispatch layer
    /// - `dir`: which direction(s) the device will access
    ///
    /// # Returns
    /// A mapping whose `device_addr` the device may dereference for `len`
    /// bytes, or [`Unmappable`](crate::DmaError::Unmappable) if translation
    /// resources are exhausted (retryable, not fatal).
    fn map(
        &self,
        mask: u64,
        host: NonNull<u8>,
        len: usize,
        dir: DmaDirection,
    ) -> Result<DmaMapping<Self::Token>>;

    /// Release a mapping produced by [`map`](Self::map).
    ///
    /// Infallible by contract: internal platform errors are diagnostics,
    /// not propagated.
    fn unmap(&self, mapping: DmaMapping<Self::Token>);

    /// Allocate and map a coherent buffer in one step.
    ///
    /// The returned memory is zeroed, aligned to `align` (guaranteed a
    /// power of two by the dispatch layer), and safe for unsynchronized CPU
    /// and device access.
    fn alloc(&self, mask: u64, len: usize, align: usize) -> Result<CoherentBuffer<Self::Token>>;

    /// Release a coherent buffer: unmaps and frees the underlying memory.
    fn free(&self, buffer: CoherentBuffer<Self::Token>);

    /// Declare the address bits the device can drive.
    ///
    /// Returns the *effective* mask the backend will honor. A backend that
    /// cannot satisfy the request must clamp to its nearest supported
    /// window and report that, never silently ignore the difference.
    fn set_mask(&self, mask: u64) -> u64;
}

impl<O: DmaOperations + ?Sized> DmaOperations for &O {
    type Token = O::Token;

    fn map(
        &self,
        mask: u64,
        host: NonNull<u8>,
        len: usize,
        dir: DmaDirection,
    ) -> Result<DmaMapping<Self::Token>> {
        (**self).map(mask, host, len, dir)
    }

    fn unmap(&self, mapping: DmaMapping<Self::Token>) {
        (**self).unmap(mapping);
    }

    fn alloc(&self, mask: u64, len: usize, align: usize) -> Result<CoherentBuffer<Self::Token>> {
        (**self).alloc(mask, len, align)
    }

    fn free(&self, buffer: CoherentBuffer<Self::Token>) {
        (**self).free(buffer);
    }

    fn set_mask(&self, mask: u64) -> u64 {
        (**self).set_mask(mask)
    }
}
