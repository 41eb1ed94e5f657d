use crate::{
    storage::slotted_page::SlottedPage,
    types::{PAGE_SIZE, PageId},
};

/// An empty page backed by an owned buffer.
pub fn new_page(page_id: PageId) -> SlottedPage<Vec<u8>> {
    SlottedPage::init(vec![0u8; PAGE_SIZE], page_id).expect("buffer is PAGE_SIZE bytes")
}

/// Deterministic record payload of `size` bytes tagged with `id`.
pub fn sample_record(id: u32, size: usize) -> Vec<u8> {
    let mut record = format!("rec{:06}:", id).into_bytes();
    record.resize(size.max(1), b'a' + (id % 26) as u8);
    record.truncate(size.max(1));
    record
}
