use tracing::{debug, trace, warn};

use crate::{
    storage::{
        header::{
            FREE_BYTES_OFFSET, NEXT_PAGE_OFFSET, PAGE_ID_OFFSET, PREV_PAGE_OFFSET, PageHeader,
            SLOT_COUNT_OFFSET, WRITE_CURSOR_OFFSET, read_page_link, read_u16, read_u64,
            write_page_link, write_u16,
        },
        scan::Records,
    },
    types::{
        PAGE_DATA_SIZE, PAGE_HEADER_SIZE, PAGE_SIZE, PageId, SLOT_SIZE, SlotNo,
        error::{PageError, Result},
        record_id::RecordId,
        slot::Slot,
    },
};

/*
 * Page Layout (Slotted Page Structure)
 * ┌─────────────────────────────────────────────────────────────────┐
 * │                    PAGE HEADER (32 bytes)                       │
 * ├─────────────────────────────────────────────────────────────────┤
 * │                   RECORD DATA  (grows →)                        │
 * │  [record @0][record @len0][record ...]   packed, no gaps        │
 * │                                     ^ data_write_cursor         │
 * ├─────────────────────────────────────────────────────────────────┤
 * │                    FREE SPACE                                   │
 * ├─────────────────────────────────────────────────────────────────┤
 * │                  SLOT DIRECTORY  (← grows)                      │
 * │  ... [slot 3: off|len] [slot 2: off|len] [slot 1: off|len]      │
 * └─────────────────────────────────────────────────────────────────┘
 */

/// A slotted-page view over a `PAGE_SIZE` byte buffer.
///
/// The buffer is usually a pinned frame handed out by the buffer manager
/// (`&mut [u8]`), but any owned buffer works too (`Vec<u8>`, `Box<[u8]>`).
/// Records are addressed by [`RecordId`]; a record keeps its id until it is
/// deleted, whatever else happens on the page.
///
/// Live record bytes are always packed from offset 0 of the data region up
/// to `data_write_cursor`. Inserts append at the cursor and deletes shift
/// the records that follow the hole to the left.
pub struct SlottedPage<B> {
    buf: B,
}

impl<B: AsRef<[u8]>> SlottedPage<B> {
    /// Wrap a buffer that already holds a formatted page.
    pub fn open(buf: B) -> Result<Self> {
        check_page_size(buf.as_ref())?;
        let page = Self { buf };
        if let Err(err) = page.validate() {
            warn!(error = %err, "rejecting page buffer");
            return Err(err);
        }
        Ok(page)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_ref()
    }

    pub fn into_inner(self) -> B {
        self.buf
    }

    pub fn header(&self) -> PageHeader {
        PageHeader {
            page_id: self.page_id(),
            next_page: self.next_page(),
            prev_page: self.prev_page(),
            slot_count: self.slot_count(),
            data_write_cursor: self.data_write_cursor(),
            free_bytes: self.free_bytes(),
        }
    }

    pub fn page_id(&self) -> PageId {
        read_u64(self.as_bytes(), PAGE_ID_OFFSET)
    }

    pub fn next_page(&self) -> Option<PageId> {
        read_page_link(self.as_bytes(), NEXT_PAGE_OFFSET)
    }

    pub fn prev_page(&self) -> Option<PageId> {
        read_page_link(self.as_bytes(), PREV_PAGE_OFFSET)
    }

    /// Number of directory entries, including unoccupied ones.
    pub fn slot_count(&self) -> u16 {
        read_u16(self.as_bytes(), SLOT_COUNT_OFFSET)
    }

    pub fn data_write_cursor(&self) -> u16 {
        read_u16(self.as_bytes(), WRITE_CURSOR_OFFSET)
    }

    pub fn free_bytes(&self) -> u16 {
        read_u16(self.as_bytes(), FREE_BYTES_OFFSET)
    }

    /// Payload bytes a caller can count on inserting, assuming a new
    /// directory entry will be needed.
    pub fn available_space(&self) -> usize {
        (self.free_bytes() as usize).saturating_sub(SLOT_SIZE)
    }

    /// True when the slot directory is empty. Interior unoccupied slots keep
    /// the directory non-empty even if no record is live.
    pub fn is_empty(&self) -> bool {
        self.slot_count() == 0
    }

    pub fn record_count(&self) -> usize {
        self.occupied_slots().count()
    }

    /// Directory entry for `slot_no`, or None outside `1..=slot_count`.
    pub fn slot(&self, slot_no: SlotNo) -> Option<Slot> {
        if slot_no == 0 || slot_no > self.slot_count() {
            return None;
        }
        Some(self.read_slot(slot_no))
    }

    /// Record whose bytes start exactly at `offset` in the data region.
    pub fn record_at_offset(&self, offset: usize) -> Option<RecordId> {
        self.occupied_slots()
            .find(|&(_, slot_offset, _)| slot_offset as usize == offset)
            .map(|(slot_no, _, _)| RecordId::new(self.page_id(), slot_no))
    }

    /// Physically first record on the page.
    pub fn first_record(&self) -> Option<RecordId> {
        self.record_at_offset(0)
    }

    /// Record stored right after `current` in the data region.
    ///
    /// Iteration follows byte order, not slot number order.
    pub fn next_record(&self, current: RecordId) -> Result<Option<RecordId>> {
        let (offset, length) = self.locate(current)?;
        Ok(self.record_at_offset(offset as usize + length as usize))
    }

    /// Copy the record into `out` and return its length.
    pub fn get(&self, rid: RecordId, out: &mut [u8]) -> Result<usize> {
        let record = self.peek(rid)?;
        if out.len() < record.len() {
            return Err(PageError::BufferTooSmall {
                needed: record.len(),
                actual: out.len(),
            });
        }
        out[..record.len()].copy_from_slice(record);
        Ok(record.len())
    }

    /// Borrow the record bytes in place.
    ///
    /// The slice borrows the page, so it cannot outlive the buffer and no
    /// insert, delete or reinit can happen while it is held.
    pub fn peek(&self, rid: RecordId) -> Result<&[u8]> {
        let (offset, length) = self.locate(rid)?;
        let start = PAGE_HEADER_SIZE + offset as usize;
        Ok(&self.as_bytes()[start..start + length as usize])
    }

    /// Iterate over `(RecordId, bytes)` in physical order.
    pub fn records(&self) -> Records<'_, B> {
        Records::new(self)
    }

    /// Check the header and slot directory for internal consistency.
    pub fn validate(&self) -> Result<()> {
        let page_id = self.page_id();
        let corrupted = |reason: String| PageError::CorruptedPage { page_id, reason };

        let slot_count = self.slot_count() as usize;
        let cursor = self.data_write_cursor() as usize;
        let directory_size = slot_count * SLOT_SIZE;

        if cursor + directory_size > PAGE_DATA_SIZE {
            return Err(corrupted(format!(
                "data ({} bytes) and slot directory ({} bytes) overlap",
                cursor, directory_size
            )));
        }
        let expected_free = PAGE_DATA_SIZE - cursor - directory_size;
        if self.free_bytes() as usize != expected_free {
            return Err(corrupted(format!(
                "free_bytes is {}, expected {}",
                self.free_bytes(),
                expected_free
            )));
        }

        let mut ranges = Vec::with_capacity(slot_count);
        for (slot_no, offset, length) in self.occupied_slots() {
            let (start, end) = (offset as usize, offset as usize + length as usize);
            if length == 0 {
                return Err(corrupted(format!("slot {} holds an empty record", slot_no)));
            }
            if end > cursor {
                return Err(corrupted(format!(
                    "slot {} ends at {} past write cursor {}",
                    slot_no, end, cursor
                )));
            }
            ranges.push((start, end));
        }

        // Live records must tile [0, cursor) exactly.
        ranges.sort_unstable();
        let mut expected_start = 0;
        for (start, end) in ranges {
            if start != expected_start {
                return Err(corrupted(format!(
                    "record at {} does not follow previous record ending at {}",
                    start, expected_start
                )));
            }
            expected_start = end;
        }
        if expected_start != cursor {
            return Err(corrupted(format!(
                "live data ends at {} but write cursor is {}",
                expected_start, cursor
            )));
        }

        Ok(())
    }

    fn slot_position(slot_no: SlotNo) -> usize {
        PAGE_SIZE - slot_no as usize * SLOT_SIZE
    }

    fn read_slot(&self, slot_no: SlotNo) -> Slot {
        let at = Self::slot_position(slot_no);
        Slot::decode(&self.as_bytes()[at..at + SLOT_SIZE])
    }

    fn occupied_slots(&self) -> impl Iterator<Item = (SlotNo, u16, u16)> + '_ {
        (1..=self.slot_count()).filter_map(move |slot_no| match self.read_slot(slot_no) {
            Slot::Occupied { offset, length } => Some((slot_no, offset, length)),
            Slot::Empty => None,
        })
    }

    /// Resolve a record id to its `(offset, length)`, rejecting ids from
    /// other pages, out-of-range slots and unoccupied slots.
    fn locate(&self, rid: RecordId) -> Result<(u16, u16)> {
        let invalid = |reason: &'static str| PageError::InvalidRecordId { rid, reason };

        if rid.page_id != self.page_id() {
            return Err(invalid("record belongs to another page"));
        }
        if rid.slot_no < 1 || rid.slot_no > self.slot_count() {
            return Err(invalid("slot number out of range"));
        }
        match self.read_slot(rid.slot_no) {
            Slot::Occupied { offset, length } => Ok((offset, length)),
            Slot::Empty => Err(invalid("slot is unoccupied")),
        }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> SlottedPage<B> {
    /// Format `buf` as an empty page with the given id.
    pub fn init(buf: B, page_id: PageId) -> Result<Self> {
        check_page_size(buf.as_ref())?;
        let mut page = Self { buf };
        page.reinit(page_id);
        Ok(page)
    }

    /// Reset the page in place. Nothing from the previous contents survives.
    pub fn reinit(&mut self, page_id: PageId) {
        let bytes = self.bytes_mut();
        bytes[PAGE_HEADER_SIZE..].fill(0);
        PageHeader::new(page_id).write_to(bytes);
        debug!(page_id, "initialized page");
    }

    pub fn set_next_page(&mut self, page_id: Option<PageId>) {
        write_page_link(self.bytes_mut(), NEXT_PAGE_OFFSET, page_id);
    }

    pub fn set_prev_page(&mut self, page_id: Option<PageId>) {
        write_page_link(self.bytes_mut(), PREV_PAGE_OFFSET, page_id);
    }

    /// Append a record and return its id.
    ///
    /// The lowest unoccupied slot is reused when there is one; otherwise a
    /// new directory entry is charged against the free space. Fails with
    /// [`PageError::PageFull`] without touching the page when it does not fit.
    pub fn insert(&mut self, payload: &[u8]) -> Result<RecordId> {
        if payload.is_empty() {
            return Err(PageError::EmptyRecord);
        }

        let slot_count = self.slot_count();
        let reusable = (1..=slot_count).find(|&slot_no| !self.read_slot(slot_no).is_occupied());

        let required = payload.len() + if reusable.is_some() { 0 } else { SLOT_SIZE };
        let mut free = self.free_bytes() as usize;
        if free < required {
            return Err(PageError::PageFull {
                page_id: self.page_id(),
                required,
                available: free,
            });
        }

        let slot_no = match reusable {
            Some(slot_no) => slot_no,
            None => {
                free -= SLOT_SIZE;
                self.set_slot_count(slot_count + 1);
                slot_count + 1
            }
        };

        let offset = self.data_write_cursor();
        let length = payload.len() as u16;
        let start = PAGE_HEADER_SIZE + offset as usize;
        self.bytes_mut()[start..start + payload.len()].copy_from_slice(payload);
        self.write_slot(slot_no, Slot::Occupied { offset, length });

        self.set_data_write_cursor(offset + length);
        self.set_free_bytes((free - payload.len()) as u16);

        let rid = RecordId::new(self.page_id(), slot_no);
        debug!(%rid, offset, length, reused = reusable.is_some(), "inserted record");
        Ok(rid)
    }

    /// Remove a record, closing the hole it leaves in the data region.
    ///
    /// Records stored after the hole move left by its length and their slot
    /// offsets follow them, so every other record id stays valid. The
    /// directory only shrinks when the deleted slot is the last one.
    pub fn delete(&mut self, rid: RecordId) -> Result<()> {
        let (hole_offset, hole_length) = self.locate(rid)?;

        let mut write_at = hole_offset as usize;
        let mut read_at = hole_offset as usize + hole_length as usize;
        while let Some(next) = self.record_at_offset(read_at) {
            let Slot::Occupied { offset, length } = self.read_slot(next.slot_no) else {
                break;
            };
            let src = PAGE_HEADER_SIZE + offset as usize;
            let dst = PAGE_HEADER_SIZE + write_at;
            self.bytes_mut().copy_within(src..src + length as usize, dst);
            self.write_slot(
                next.slot_no,
                Slot::Occupied {
                    offset: write_at as u16,
                    length,
                },
            );
            trace!(slot_no = next.slot_no, from = offset, to = write_at, "moved record");

            write_at += length as usize;
            read_at = offset as usize + length as usize;
        }

        let old_cursor = self.data_write_cursor();
        let new_cursor = old_cursor - hole_length;
        let vacated = PAGE_HEADER_SIZE + new_cursor as usize..PAGE_HEADER_SIZE + old_cursor as usize;
        self.bytes_mut()[vacated].fill(0);
        self.set_data_write_cursor(new_cursor);

        let mut free = self.free_bytes() + hole_length;
        self.write_slot(rid.slot_no, Slot::Empty);

        let slot_count = self.slot_count();
        let trimmed = rid.slot_no == slot_count;
        if trimmed {
            self.set_slot_count(slot_count - 1);
            free += SLOT_SIZE as u16;
        }
        self.set_free_bytes(free);

        debug!(%rid, length = hole_length, trimmed, "deleted record");
        Ok(())
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        self.buf.as_mut()
    }

    fn write_slot(&mut self, slot_no: SlotNo, slot: Slot) {
        let at = Self::slot_position(slot_no);
        self.bytes_mut()[at..at + SLOT_SIZE].copy_from_slice(&slot.encode());
    }

    fn set_slot_count(&mut self, slot_count: u16) {
        write_u16(self.bytes_mut(), SLOT_COUNT_OFFSET, slot_count);
    }

    fn set_data_write_cursor(&mut self, cursor: u16) {
        write_u16(self.bytes_mut(), WRITE_CURSOR_OFFSET, cursor);
    }

    fn set_free_bytes(&mut self, free: u16) {
        write_u16(self.bytes_mut(), FREE_BYTES_OFFSET, free);
    }
}

fn check_page_size(buf: &[u8]) -> Result<()> {
    if buf.len() != PAGE_SIZE {
        return Err(PageError::InvalidPageSize {
            expected: PAGE_SIZE,
            actual: buf.len(),
        });
    }
    Ok(())
}
