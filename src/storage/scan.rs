use crate::{
    storage::slotted_page::SlottedPage,
    types::record_id::RecordId,
};

/// Forward scan over a page in physical (offset) order.
///
/// Built on `first_record`/`next_record`, the only iteration order the page
/// supports. Holds a shared borrow of the page for its whole lifetime.
pub struct Records<'a, B> {
    page: &'a SlottedPage<B>,
    cursor: Option<RecordId>,
}

impl<'a, B: AsRef<[u8]>> Records<'a, B> {
    pub fn new(page: &'a SlottedPage<B>) -> Self {
        Self {
            page,
            cursor: page.first_record(),
        }
    }
}

impl<'a, B: AsRef<[u8]>> Iterator for Records<'a, B> {
    type Item = (RecordId, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let rid = self.cursor?;
        let page = self.page;
        let data = page.peek(rid).ok()?;
        self.cursor = page.next_record(rid).ok().flatten();
        Some((rid, data))
    }
}
