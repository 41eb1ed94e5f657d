use crate::types::{INVALID_PAGE_ID, PAGE_DATA_SIZE, PAGE_HEADER_SIZE, PageId, error::PageError};

// Field offsets inside the page header.
pub(crate) const PAGE_ID_OFFSET: usize = 0;
pub(crate) const NEXT_PAGE_OFFSET: usize = 8;
pub(crate) const PREV_PAGE_OFFSET: usize = 16;
pub(crate) const SLOT_COUNT_OFFSET: usize = 24;
pub(crate) const WRITE_CURSOR_OFFSET: usize = 26;
pub(crate) const FREE_BYTES_OFFSET: usize = 28;

/*
 * Page Header (32 bytes, little-endian)
 * ┌─────────────────────────────────────────────────────────────────┐
 * │ page_id(8) | next_page(8) | prev_page(8) |                      │
 * │ slot_count(2) | write_cursor(2) | free_bytes(2) | reserved(2)   │
 * └─────────────────────────────────────────────────────────────────┘
 */

/// Decoded copy of the header fields of a slotted page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHeader {
    pub page_id: PageId,
    pub next_page: Option<PageId>,
    pub prev_page: Option<PageId>,
    pub slot_count: u16,
    pub data_write_cursor: u16,
    pub free_bytes: u16,
}

impl PageHeader {
    /// Header of a freshly initialized page: no links, no slots, all space free.
    pub fn new(page_id: PageId) -> Self {
        Self {
            page_id,
            next_page: None,
            prev_page: None,
            slot_count: 0,
            data_write_cursor: 0,
            free_bytes: PAGE_DATA_SIZE as u16,
        }
    }

    pub fn write_to(&self, buffer: &mut [u8]) {
        write_page_link(buffer, PAGE_ID_OFFSET, Some(self.page_id));
        write_page_link(buffer, NEXT_PAGE_OFFSET, self.next_page);
        write_page_link(buffer, PREV_PAGE_OFFSET, self.prev_page);
        write_u16(buffer, SLOT_COUNT_OFFSET, self.slot_count);
        write_u16(buffer, WRITE_CURSOR_OFFSET, self.data_write_cursor);
        write_u16(buffer, FREE_BYTES_OFFSET, self.free_bytes);
        // reserved
        buffer[FREE_BYTES_OFFSET + 2..PAGE_HEADER_SIZE].fill(0);
    }

    pub fn read_from(buffer: &[u8]) -> Result<Self, PageError> {
        if buffer.len() < PAGE_HEADER_SIZE {
            return Err(PageError::InvalidPageSize {
                expected: PAGE_HEADER_SIZE,
                actual: buffer.len(),
            });
        }

        Ok(Self {
            page_id: read_u64(buffer, PAGE_ID_OFFSET),
            next_page: read_page_link(buffer, NEXT_PAGE_OFFSET),
            prev_page: read_page_link(buffer, PREV_PAGE_OFFSET),
            slot_count: read_u16(buffer, SLOT_COUNT_OFFSET),
            data_write_cursor: read_u16(buffer, WRITE_CURSOR_OFFSET),
            free_bytes: read_u16(buffer, FREE_BYTES_OFFSET),
        })
    }
}

pub(crate) fn read_u16(buffer: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buffer[at], buffer[at + 1]])
}

pub(crate) fn write_u16(buffer: &mut [u8], at: usize, value: u16) {
    buffer[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

pub(crate) fn read_u64(buffer: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buffer[at..at + 8]);
    u64::from_le_bytes(bytes)
}

/// Linkage fields use INVALID_PAGE_ID to represent None.
pub(crate) fn read_page_link(buffer: &[u8], at: usize) -> Option<PageId> {
    match read_u64(buffer, at) {
        INVALID_PAGE_ID => None,
        page_id => Some(page_id),
    }
}

pub(crate) fn write_page_link(buffer: &mut [u8], at: usize, page_id: Option<PageId>) {
    let raw = page_id.unwrap_or(INVALID_PAGE_ID);
    buffer[at..at + 8].copy_from_slice(&raw.to_le_bytes());
}
