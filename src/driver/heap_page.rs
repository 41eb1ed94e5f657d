use std::fmt;

use crate::{
    driver::{CaseFailure, TestDriver, ensure},
    storage::slotted_page::SlottedPage,
    types::{PAGE_DATA_SIZE, PAGE_SIZE, PageId, SLOT_SIZE, slot::Slot},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapPageCase {
    InsertAndGet,
    DeleteCompacts,
    SlotReuseAndTrim,
    Exhaustion,
    PhysicalScan,
    PageLinkage,
}

impl HeapPageCase {
    pub const ALL: &'static [HeapPageCase] = &[
        HeapPageCase::InsertAndGet,
        HeapPageCase::DeleteCompacts,
        HeapPageCase::SlotReuseAndTrim,
        HeapPageCase::Exhaustion,
        HeapPageCase::PhysicalScan,
        HeapPageCase::PageLinkage,
    ];
}

impl fmt::Display for HeapPageCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeapPageCase::InsertAndGet => "insert and get",
            HeapPageCase::DeleteCompacts => "delete compacts data",
            HeapPageCase::SlotReuseAndTrim => "slot reuse and trim",
            HeapPageCase::Exhaustion => "exhaustion",
            HeapPageCase::PhysicalScan => "physical scan",
            HeapPageCase::PageLinkage => "page linkage",
        };
        f.write_str(name)
    }
}

/// Self-checks for the slotted page, each case on a fresh page.
pub struct HeapPageDriver {
    page_id: PageId,
}

impl HeapPageDriver {
    pub fn new(page_id: PageId) -> Self {
        Self { page_id }
    }

    fn fresh_page(&self) -> Result<SlottedPage<Vec<u8>>, CaseFailure> {
        Ok(SlottedPage::init(vec![0u8; PAGE_SIZE], self.page_id)?)
    }

    fn insert_and_get(&self) -> Result<(), CaseFailure> {
        let mut page = self.fresh_page()?;
        let mut stored = Vec::new();
        let mut n = 0usize;
        loop {
            let record = format!("record #{} {}", n, "x".repeat(n % 17));
            match page.insert(record.as_bytes()) {
                Ok(rid) => stored.push((rid, record)),
                Err(err) if err.is_exhaustion() => break,
                Err(err) => return Err(err.into()),
            }
            n += 1;
        }
        ensure(!stored.is_empty(), "nothing fit on an empty page")?;
        ensure(
            page.record_count() == stored.len(),
            format!("record count {} != {}", page.record_count(), stored.len()),
        )?;

        let mut out = vec![0u8; PAGE_DATA_SIZE];
        for (rid, record) in &stored {
            let length = page.get(*rid, &mut out)?;
            ensure(
                &out[..length] == record.as_bytes(),
                format!("record {} came back different", rid),
            )?;
        }
        Ok(())
    }

    fn delete_compacts(&self) -> Result<(), CaseFailure> {
        let mut page = self.fresh_page()?;
        let a = page.insert(b"AAA")?;
        let b = page.insert(b"BB")?;
        let c = page.insert(b"CCCC")?;
        ensure(page.data_write_cursor() == 9, "write cursor should be 9")?;

        page.delete(b)?;
        ensure(
            page.slot(c.slot_no) == Some(Slot::Occupied { offset: 3, length: 4 }),
            "CCCC should have moved to offset 3",
        )?;
        ensure(page.slot(b.slot_no) == Some(Slot::Empty), "slot 2 should be empty")?;
        ensure(page.data_write_cursor() == 7, "write cursor should be 7")?;
        ensure(page.peek(a)? == b"AAA", "AAA changed")?;
        ensure(page.peek(c)? == b"CCCC", "CCCC changed")?;
        ensure(page.peek(b).is_err(), "deleted record is still readable")?;
        Ok(())
    }

    fn slot_reuse_and_trim(&self) -> Result<(), CaseFailure> {
        let mut page = self.fresh_page()?;
        page.insert(b"AAA")?;
        let b = page.insert(b"BB")?;
        let c = page.insert(b"CCCC")?;
        page.delete(b)?;

        let e = page.insert(b"E")?;
        ensure(e.slot_no == b.slot_no, "insert should reuse slot 2")?;
        ensure(
            page.slot(e.slot_no) == Some(Slot::Occupied { offset: 7, length: 1 }),
            "E should land at offset 7",
        )?;

        let free_before = page.free_bytes();
        page.delete(c)?;
        ensure(page.slot_count() == 2, "last slot should be trimmed")?;
        ensure(
            page.free_bytes() == free_before + 4 + SLOT_SIZE as u16,
            "record bytes and slot entry should both be reclaimed",
        )?;
        ensure(page.peek(e)? == b"E", "E changed after compaction")?;
        Ok(())
    }

    fn exhaustion(&self) -> Result<(), CaseFailure> {
        let mut page = self.fresh_page()?;
        page.insert(&[7u8; 1000])?;
        page.insert(&[8u8; 1000])?;

        let before = page.as_bytes().to_vec();
        let too_big = vec![9u8; page.available_space() + 1];
        match page.insert(&too_big) {
            Err(err) if err.is_exhaustion() => {}
            other => {
                return Err(CaseFailure::Check(format!(
                    "expected exhaustion, got {:?}",
                    other
                )));
            }
        }
        ensure(page.as_bytes() == before.as_slice(), "failed insert mutated the page")?;

        let fits = vec![9u8; page.available_space()];
        page.insert(&fits)?;
        ensure(page.available_space() == 0, "page should now be full")?;
        Ok(())
    }

    fn physical_scan(&self) -> Result<(), CaseFailure> {
        let mut page = self.fresh_page()?;
        let mut rids = Vec::new();
        for i in 0..10u8 {
            rids.push(page.insert(&vec![i; i as usize + 1])?);
        }
        for rid in [rids[1], rids[4], rids[7]] {
            page.delete(rid)?;
        }
        page.insert(b"late arrival")?;

        let mut visited = 0;
        let mut last_offset = None;
        let mut cursor = page.first_record();
        while let Some(rid) = cursor {
            let offset = page.slot(rid.slot_no).and_then(|slot| slot.range()).map(|r| r.start);
            ensure(offset > last_offset, "scan went backwards")?;
            last_offset = offset;
            visited += 1;
            cursor = page.next_record(rid)?;
        }
        ensure(
            visited == page.record_count(),
            format!("visited {} of {} records", visited, page.record_count()),
        )?;
        Ok(())
    }

    fn page_linkage(&self) -> Result<(), CaseFailure> {
        let mut page = self.fresh_page()?;
        ensure(page.next_page().is_none() && page.prev_page().is_none(), "links not reset")?;
        page.set_next_page(Some(self.page_id + 1));
        page.set_prev_page(Some(self.page_id.saturating_sub(1)));
        ensure(page.next_page() == Some(self.page_id + 1), "next page lost")?;

        page.insert(b"payload")?;
        page.reinit(self.page_id + 10);
        ensure(page.page_id() == self.page_id + 10, "page id not stored")?;
        ensure(page.next_page().is_none(), "reinit kept next page")?;
        ensure(page.is_empty(), "reinit kept slots")?;
        ensure(
            page.free_bytes() as usize == PAGE_DATA_SIZE,
            "reinit did not free the page",
        )?;
        Ok(())
    }
}

impl TestDriver for HeapPageDriver {
    type Case = HeapPageCase;

    fn name(&self) -> &str {
        "Heap Page"
    }

    fn cases(&self) -> &'static [HeapPageCase] {
        HeapPageCase::ALL
    }

    fn run_case(&mut self, case: HeapPageCase) -> Result<(), CaseFailure> {
        match case {
            HeapPageCase::InsertAndGet => self.insert_and_get(),
            HeapPageCase::DeleteCompacts => self.delete_compacts(),
            HeapPageCase::SlotReuseAndTrim => self.slot_reuse_and_trim(),
            HeapPageCase::Exhaustion => self.exhaustion(),
            HeapPageCase::PhysicalScan => self.physical_scan(),
            HeapPageCase::PageLinkage => self.page_linkage(),
        }
    }
}
