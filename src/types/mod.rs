pub mod error;
pub mod record_id;
pub mod slot;

// Common type aliases
pub type PageId = u64;
pub type SlotNo = u16;

// Page geometry. Part of the on-disk layout, so fixed at compile time.
pub const PAGE_SIZE: usize = 4096;
pub const PAGE_HEADER_SIZE: usize = 32; // Per-page header
pub const PAGE_DATA_SIZE: usize = PAGE_SIZE - PAGE_HEADER_SIZE;

pub const SLOT_SIZE: usize = 4; // offset (2 bytes) + length (2 bytes)

/// On-disk encoding of "no page" in the linkage fields.
pub const INVALID_PAGE_ID: PageId = u64::MAX;
