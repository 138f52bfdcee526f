//! DMA Mapping Abstraction
//!
//! A `no_std` DMA mapping layer for firmware and bootloader device drivers.
//!
//! # Overview
//!
//! Bus-mastering devices read and write host memory directly. Whether a given
//! host address is usable by a device depends on the platform: some need an
//! IOMMU programmed, some apply a fixed bus offset, and most firmware
//! environments can hand out physical addresses unchanged ("flat" mapping).
//! This crate gives drivers one interface for all three cases:
//!
//! 1. **Operation table** - the [`DmaOperations`] trait, implemented once per
//!    platform backend
//! 2. **Device descriptor** - [`DmaDevice`], binding one backend to one
//!    device plus its addressable mask and advisory counters
//! 3. **Flat backend** - [`FlatDma`], the reference implementation for
//!    platforms without address translation
//! 4. **Collaborator seam** - [`DmaPlatform`], the physical allocator and
//!    address translator supplied by the embedding firmware
//!
//! # Dispatch forms
//!
//! Both dispatch forms share one code path and are verified equivalent:
//!
//! - **Static**: `DmaDevice<FlatDma<P>>` monomorphizes every call site down
//!   to direct (inlinable) calls - zero indirection on simple platforms.
//! - **Dynamic**: `DmaDevice<&'static dyn DmaOperations<Token = T>>` routes
//!   calls through a vtable, for platforms that pick a backend at run time.
//!
//! # Usage
//!
//! ```ignore
//! use dma_map::{DmaDevice, DmaDirection, FlatDma};
//!
//! // Bind the flat backend to a NIC's descriptor
//! let mut dma = DmaDevice::new(FlatDma::new(platform));
//! dma.set_mask_64bit();
//!
//! // Descriptor ring: coherent, no explicit cache maintenance needed
//! let ring = dma.alloc(4096, 4096)?;
//! device.write_ring_base(ring.device_addr());
//!
//! // Streaming TX mapping
//! let map = dma.map(frame_ptr, frame_len, DmaDirection::ToDevice)?;
//! device.push_tx(map.device_addr(), frame_len);
//! // ... after the device is done with it:
//! dma.unmap(map);
//! ```
//!
//! Mappings are consumed by their release calls, so double-release and
//! releasing through a different backend are compile errors, not runtime
//! hazards.

#![no_std]
#![warn(missing_docs)]

pub mod buffer;
pub mod device;
pub mod error;
#[cfg(feature = "flat")]
pub mod flat;
pub mod mapping;
pub mod ops;
pub mod platform;

#[cfg(test)]
mod testutil;

pub use buffer::HostBuffer;
pub use device::{DmaDevice, DmaStats};
pub use error::{DmaError, Result};
#[cfg(feature = "flat")]
pub use flat::{FlatDma, FlatToken};
pub use mapping::{CoherentBuffer, DmaDirection, DmaMapping};
pub use ops::DmaOperations;
pub use platform::DmaPlatform;

#[cfg(feature = "trace")]
extern "C" {
    fn dma_map_log(msg: *const u8, len: usize);
}

#[cfg(feature = "trace")]
#[allow(dead_code)]
pub(crate) fn trace(msg: &str) {
    unsafe { dma_map_log(msg.as_ptr(), msg.len()) };
}

#[cfg(not(feature = "trace"))]
#[allow(dead_code)]
pub(crate) fn trace(_msg: &str) {}
