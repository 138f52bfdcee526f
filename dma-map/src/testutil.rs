//! Test platform: collaborator primitives backed by a private heap.

extern crate std;

use core::alloc::Layout;
use core::cell::RefCell;
use core::ptr::NonNull;

use linked_list_allocator::Heap;
use std::vec::Vec;

use crate::platform::DmaPlatform;

/// Offset between host pointers and bus addresses.
///
/// Nonzero so tests notice if a backend skips the translator and uses raw
/// pointer values as device addresses.
pub const DEFAULT_BUS_OFFSET: u64 = 0x4000_0000;

/// A [`DmaPlatform`] over an owned, page-aligned memory region.
///
/// Physical allocation is a real first-fit heap, so exhaustion, alignment
/// and free-then-reuse behave like a firmware allocator would. Each test
/// builds its own instance; nothing is shared.
pub struct TestPlatform {
    heap: RefCell<Heap>,
    /// Outstanding allocations, so free can reconstruct the layout.
    live: RefCell<Vec<(usize, Layout)>>,
    region: NonNull<u8>,
    region_layout: Layout,
    bus_offset: u64,
}

impl TestPlatform {
    /// Create a platform with `size` bytes of "physical" memory.
    pub fn new(size: usize) -> Self {
        Self::with_bus_offset(size, DEFAULT_BUS_OFFSET)
    }

    /// Create a platform with a specific host-to-bus offset.
    pub fn with_bus_offset(size: usize, bus_offset: u64) -> Self {
        let region_layout = Layout::from_size_align(size, 4096).unwrap();
        let region = NonNull::new(unsafe { std::alloc::alloc(region_layout) }).unwrap();

        let mut heap = Heap::empty();
        unsafe { heap.init(region.as_ptr(), size) };

        Self {
            heap: RefCell::new(heap),
            live: RefCell::new(Vec::new()),
            region,
            region_layout,
            bus_offset,
        }
    }
}

impl DmaPlatform for TestPlatform {
    fn virt_to_bus(&self, ptr: NonNull<u8>) -> u64 {
        ptr.as_ptr() as u64 + self.bus_offset
    }

    fn alloc_phys(&self, len: usize, align: usize) -> Option<NonNull<u8>> {
        let layout = Layout::from_size_align(len, align).ok()?;
        let ptr = self.heap.borrow_mut().allocate_first_fit(layout).ok()?;
        self.live.borrow_mut().push((ptr.as_ptr() as usize, layout));
        Some(ptr)
    }

    unsafe fn free_phys(&self, ptr: NonNull<u8>, len: usize) {
        let mut live = self.live.borrow_mut();
        let pos = live
            .iter()
            .position(|&(addr, layout)| addr == ptr.as_ptr() as usize && layout.size() == len)
            .expect("free_phys of unknown allocation");
        let (_, layout) = live.swap_remove(pos);
        self.heap.borrow_mut().deallocate(ptr, layout);
    }
}

impl Drop for TestPlatform {
    fn drop(&mut self) {
        assert!(
            self.live.borrow().is_empty(),
            "test leaked {} physical allocation(s)",
            self.live.borrow().len()
        );
        unsafe { std::alloc::dealloc(self.region.as_ptr(), self.region_layout) };
    }
}
