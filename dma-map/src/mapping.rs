//! Mapping records and transfer direction.

use core::fmt;
use core::ptr::NonNull;

/// Direction of device access declared for a mapping.
///
/// Backends that must maintain caches use this to decide what to flush or
/// invalidate and when. The flat backend ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaDirection {
    /// Device reads from host memory (transmit path).
    ToDevice,
    /// Device writes to host memory (receive path).
    FromDevice,
    /// Device both reads and writes.
    Bidirectional,
}

impl DmaDirection {
    /// Whether the device will read host memory.
    pub const fn device_reads(self) -> bool {
        matches!(self, Self::ToDevice | Self::Bidirectional)
    }

    /// Whether the device will write host memory.
    pub const fn device_writes(self) -> bool {
        matches!(self, Self::FromDevice | Self::Bidirectional)
    }
}

/// One outstanding DMA mapping.
///
/// Created by [`map`](crate::DmaDevice::map) or
/// [`alloc`](crate::DmaDevice::alloc); consumed by the matching
/// [`unmap`](crate::DmaDevice::unmap) or [`free`](crate::DmaDevice::free).
/// `T` is the backend's token type, so a mapping can only be handed back to
/// a backend with the same token type, and release-by-value makes double
/// release a move error.
#[must_use = "mappings must be returned via unmap/free"]
pub struct DmaMapping<T> {
    /// Address as seen by the bus-mastering device.
    device_addr: u64,
    /// Backend-owned state needed to release the mapping.
    token: T,
}

impl<T> DmaMapping<T> {
    /// Create a mapping record. Backend implementations only.
    pub const fn new(device_addr: u64, token: T) -> Self {
        Self { device_addr, token }
    }

    /// Address the device uses to reach the mapped memory.
    #[inline]
    pub const fn device_addr(&self) -> u64 {
        self.device_addr
    }

    /// Borrow the backend token.
    #[inline]
    pub const fn token(&self) -> &T {
        &self.token
    }

    /// Take the record apart. Backend implementations only, on release.
    #[inline]
    pub fn into_parts(self) -> (u64, T) {
        (self.device_addr, self.token)
    }
}

impl<T: fmt::Debug> fmt::Debug for DmaMapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DmaMapping")
            .field("device_addr", &format_args!("{:#x}", self.device_addr))
            .field("token", &self.token)
            .finish()
    }
}

/// A coherent allocation: host pointer, length, and its live mapping.
///
/// Memory is simultaneously CPU-cacheable-consistent and device-visible, so
/// neither side needs explicit cache maintenance - use it for descriptor
/// rings and control structures. Returned by
/// [`alloc`](crate::DmaDevice::alloc), consumed whole by
/// [`free`](crate::DmaDevice::free), which removes any chance of freeing
/// with a mismatched address/length/mapping triple.
pub struct CoherentBuffer<T> {
    ptr: NonNull<u8>,
    len: usize,
    mapping: DmaMapping<T>,
}

impl<T> CoherentBuffer<T> {
    /// Assemble a coherent buffer. Backend implementations only.
    ///
    /// # Safety
    /// - `ptr` must point to `len` bytes of live, device-visible memory
    /// - `mapping.device_addr()` must address the same memory bus-side
    pub const unsafe fn new(ptr: NonNull<u8>, len: usize, mapping: DmaMapping<T>) -> Self {
        Self { ptr, len, mapping }
    }

    /// Host pointer to the start of the buffer.
    #[inline]
    pub const fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Buffer length in bytes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer has zero length. Never true for a live allocation.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Address the device uses to reach this buffer.
    #[inline]
    pub const fn device_addr(&self) -> u64 {
        self.mapping.device_addr()
    }

    /// Borrow the underlying mapping record.
    #[inline]
    pub const fn mapping(&self) -> &DmaMapping<T> {
        &self.mapping
    }

    /// View the buffer as a byte slice.
    ///
    /// The caller must not read areas the device is concurrently writing;
    /// quiesce the device side first.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// View the buffer as a mutable byte slice.
    ///
    /// Same device-quiescence requirement as [`as_slice`](Self::as_slice).
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Take the buffer apart. Backend implementations only, on free.
    pub fn into_parts(self) -> (NonNull<u8>, usize, DmaMapping<T>) {
        (self.ptr, self.len, self.mapping)
    }
}

unsafe impl<T: Send> Send for CoherentBuffer<T> {}

impl<T: fmt::Debug> fmt::Debug for CoherentBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoherentBuffer")
            .field("ptr", &self.ptr)
            .field("len", &format_args!("{:#x}", self.len))
            .field("mapping", &self.mapping)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_predicates() {
        assert!(DmaDirection::ToDevice.device_reads());
        assert!(!DmaDirection::ToDevice.device_writes());
        assert!(!DmaDirection::FromDevice.device_reads());
        assert!(DmaDirection::FromDevice.device_writes());
        assert!(DmaDirection::Bidirectional.device_reads());
        assert!(DmaDirection::Bidirectional.device_writes());
    }

    #[test]
    fn test_mapping_accessors() {
        let map = DmaMapping::new(0x1000, 7u32);
        assert_eq!(map.device_addr(), 0x1000);
        assert_eq!(*map.token(), 7);

        let (addr, token) = map.into_parts();
        assert_eq!(addr, 0x1000);
        assert_eq!(token, 7);
    }

    #[test]
    fn test_coherent_buffer_slices() {
        let mut backing = [0u8; 32];
        let ptr = NonNull::new(backing.as_mut_ptr()).unwrap();
        let mut buf = unsafe { CoherentBuffer::new(ptr, 32, DmaMapping::new(0x2000, ())) };

        assert_eq!(buf.len(), 32);
        assert!(!buf.is_empty());
        assert_eq!(buf.device_addr(), 0x2000);

        buf.as_mut_slice()[0] = 0xAA;
        assert_eq!(buf.as_slice()[0], 0xAA);
    }
}
