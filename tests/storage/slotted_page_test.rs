use heapslot::{
    storage::slotted_page::SlottedPage,
    types::{
        PAGE_DATA_SIZE, PAGE_SIZE, SLOT_SIZE, error::PageError, record_id::RecordId, slot::Slot,
    },
    utils::mock::{new_page, sample_record},
};

// Test utilities
fn assert_free_space_identity<B: AsRef<[u8]>>(page: &SlottedPage<B>) {
    let expected = PAGE_DATA_SIZE
        - page.data_write_cursor() as usize
        - page.slot_count() as usize * SLOT_SIZE;
    assert_eq!(page.free_bytes() as usize, expected);
}

fn read_back<B: AsRef<[u8]>>(page: &SlottedPage<B>, rid: RecordId) -> Vec<u8> {
    let mut out = vec![0u8; PAGE_DATA_SIZE];
    let length = page.get(rid, &mut out).unwrap();
    out.truncate(length);
    out
}

#[test]
fn test_page_initialization() {
    let page = new_page(5);

    assert_eq!(page.page_id(), 5);
    assert_eq!(page.next_page(), None);
    assert_eq!(page.prev_page(), None);
    assert_eq!(page.slot_count(), 0);
    assert_eq!(page.data_write_cursor(), 0);
    assert_eq!(page.free_bytes() as usize, PAGE_DATA_SIZE);
    assert_eq!(page.available_space(), PAGE_DATA_SIZE - SLOT_SIZE);
    assert!(page.is_empty());
    assert_eq!(page.record_count(), 0);
    assert_eq!(page.first_record(), None);
    page.validate().unwrap();
}

#[test]
fn test_init_rejects_wrong_buffer_size() {
    let result = SlottedPage::init(vec![0u8; PAGE_SIZE - 1], 1);
    assert!(matches!(
        result,
        Err(PageError::InvalidPageSize { expected: PAGE_SIZE, actual }) if actual == PAGE_SIZE - 1
    ));
}

#[test]
fn test_insert_and_get_round_trip() {
    let mut page = new_page(1);
    let mut stored = Vec::new();

    for id in 0..40u32 {
        let record = sample_record(id, 10 + (id as usize * 7) % 50);
        let rid = page.insert(&record).unwrap();
        stored.push((rid, record));

        // Every record inserted so far is still intact.
        for (rid, record) in &stored {
            assert_eq!(&read_back(&page, *rid), record);
        }
        assert_free_space_identity(&page);
    }

    let slot_numbers: Vec<u16> = stored.iter().map(|(rid, _)| rid.slot_no).collect();
    assert_eq!(slot_numbers, (1..=40).collect::<Vec<u16>>());
    assert_eq!(page.record_count(), 40);
    page.validate().unwrap();
}

#[test]
fn test_concrete_scenario() {
    let mut page = new_page(1);

    let a = page.insert(b"AAA").unwrap();
    let b = page.insert(b"BB").unwrap();
    let c = page.insert(b"CCCC").unwrap();
    assert_eq!((a.slot_no, b.slot_no, c.slot_no), (1, 2, 3));
    assert_eq!(page.slot(1), Some(Slot::Occupied { offset: 0, length: 3 }));
    assert_eq!(page.slot(2), Some(Slot::Occupied { offset: 3, length: 2 }));
    assert_eq!(page.slot(3), Some(Slot::Occupied { offset: 5, length: 4 }));
    assert_eq!(page.data_write_cursor(), 9);

    page.delete(b).unwrap();
    assert_eq!(page.slot(3), Some(Slot::Occupied { offset: 3, length: 4 }));
    assert_eq!(page.slot(2), Some(Slot::Empty));
    assert_eq!(page.slot_count(), 3);
    assert_eq!(page.data_write_cursor(), 7);
    assert_eq!(page.record_count(), 2);
    assert_eq!(page.peek(c).unwrap(), b"CCCC");
    assert_free_space_identity(&page);

    let e = page.insert(b"E").unwrap();
    assert_eq!(e, RecordId::new(1, 2));
    assert_eq!(page.slot(2), Some(Slot::Occupied { offset: 7, length: 1 }));

    let free_before = page.free_bytes();
    page.delete(c).unwrap();
    assert_eq!(page.slot_count(), 2);
    assert_eq!(page.free_bytes(), free_before + 4 + SLOT_SIZE as u16);
    assert_eq!(page.slot(2), Some(Slot::Occupied { offset: 3, length: 1 }));
    assert_eq!(page.peek(a).unwrap(), b"AAA");
    assert_eq!(page.peek(e).unwrap(), b"E");
    assert_free_space_identity(&page);
    page.validate().unwrap();
}

#[test]
fn test_new_slot_only_when_no_hole_exists() {
    let mut page = new_page(1);
    let rids: Vec<RecordId> = (0..5u32)
        .map(|i| page.insert(&sample_record(i, 12)).unwrap())
        .collect();

    page.delete(rids[1]).unwrap();
    page.delete(rids[3]).unwrap();
    assert_eq!(page.slot_count(), 5);

    // Lowest hole first.
    assert_eq!(page.insert(b"x").unwrap().slot_no, 2);
    assert_eq!(page.insert(b"y").unwrap().slot_no, 4);
    assert_eq!(page.insert(b"z").unwrap().slot_no, 6);
    assert_free_space_identity(&page);
}

#[test]
fn test_reused_slot_does_not_charge_directory_space() {
    let mut page = new_page(1);
    let first = page.insert(b"first").unwrap();
    page.insert(b"second").unwrap();
    page.delete(first).unwrap();

    let free_before = page.free_bytes();
    page.insert(b"third").unwrap();
    assert_eq!(page.free_bytes(), free_before - 5);
}

#[test]
fn test_only_last_slot_is_trimmed() {
    let mut page = new_page(1);
    let a = page.insert(b"a").unwrap();
    let b = page.insert(b"b").unwrap();
    let c = page.insert(b"c").unwrap();

    page.delete(b).unwrap();
    page.delete(c).unwrap();
    // Slot 2 stays behind as an empty entry; only slot 3 was trimmed.
    assert_eq!(page.slot_count(), 2);
    assert_eq!(page.slot(2), Some(Slot::Empty));
    assert!(!page.is_empty());
    assert_eq!(page.record_count(), 1);

    page.delete(a).unwrap();
    assert_eq!(page.slot_count(), 2);
    assert_eq!(page.record_count(), 0);
    assert!(!page.is_empty());
    assert_eq!(page.data_write_cursor(), 0);
    assert_free_space_identity(&page);
}

#[test]
fn test_delete_everything_in_reverse_empties_page() {
    let mut page = new_page(1);
    let rids: Vec<RecordId> = (0..8u32)
        .map(|i| page.insert(&sample_record(i, 20)).unwrap())
        .collect();

    for rid in rids.into_iter().rev() {
        page.delete(rid).unwrap();
    }
    assert!(page.is_empty());
    assert_eq!(page.free_bytes() as usize, PAGE_DATA_SIZE);
}

#[test]
fn test_exhaustion_leaves_page_unchanged() {
    let mut page = new_page(1);
    page.insert(&sample_record(1, 2000)).unwrap();
    page.insert(&sample_record(2, 1500)).unwrap();

    let before = page.as_bytes().to_vec();
    let too_big = vec![1u8; page.available_space() + 1];
    let err = page.insert(&too_big).unwrap_err();
    assert!(err.is_exhaustion());
    assert!(matches!(err, PageError::PageFull { page_id: 1, .. }));
    assert_eq!(page.as_bytes(), before.as_slice());

    let exact = vec![2u8; page.available_space()];
    page.insert(&exact).unwrap();
    assert_eq!(page.free_bytes(), 0);
    assert_eq!(page.available_space(), 0);
    page.validate().unwrap();
}

#[test]
fn test_exhaustion_with_reusable_slot_counts_payload_only() {
    let mut page = new_page(1);
    let first = page.insert(&[1u8; 100]).unwrap();
    page.insert(&vec![2u8; PAGE_DATA_SIZE - 100 - 2 * SLOT_SIZE]).unwrap();
    assert_eq!(page.free_bytes(), 0);

    page.delete(first).unwrap();
    assert_eq!(page.free_bytes(), 100);
    // available_space assumes a new slot, but the hole makes 100 bytes fit.
    assert_eq!(page.available_space(), 96);
    let rid = page.insert(&[3u8; 100]).unwrap();
    assert_eq!(rid.slot_no, 1);
    assert_eq!(page.free_bytes(), 0);
    assert!(page.insert(b"x").unwrap_err().is_exhaustion());
}

#[test]
fn test_empty_record_rejected() {
    let mut page = new_page(1);
    assert!(matches!(page.insert(b""), Err(PageError::EmptyRecord)));
    assert_eq!(page.slot_count(), 0);
}

#[test]
fn test_invalid_record_ids() {
    let mut page = new_page(1);
    let rid = page.insert(b"data").unwrap();
    let before = page.as_bytes().to_vec();

    let wrong_page = RecordId::new(2, rid.slot_no);
    let slot_zero = RecordId::new(1, 0);
    let past_end = RecordId::new(1, 2);

    for bad in [wrong_page, slot_zero, past_end] {
        assert!(matches!(page.delete(bad), Err(PageError::InvalidRecordId { .. })));
        assert!(matches!(page.peek(bad), Err(PageError::InvalidRecordId { .. })));
        assert!(matches!(page.next_record(bad), Err(PageError::InvalidRecordId { .. })));
        let mut out = [0u8; 16];
        assert!(matches!(page.get(bad, &mut out), Err(PageError::InvalidRecordId { .. })));
    }
    assert_eq!(page.as_bytes(), before.as_slice());
}

#[test]
fn test_stale_record_id_after_delete() {
    let mut page = new_page(1);
    let a = page.insert(b"a").unwrap();
    page.insert(b"b").unwrap();
    page.delete(a).unwrap();

    let err = page.delete(a).unwrap_err();
    assert!(matches!(err, PageError::InvalidRecordId { rid, .. } if rid == a));
    assert!(page.peek(a).is_err());
}

#[test]
fn test_get_buffer_too_small() {
    let mut page = new_page(1);
    let rid = page.insert(b"twelve bytes").unwrap();

    let mut small = [0u8; 4];
    assert!(matches!(
        page.get(rid, &mut small),
        Err(PageError::BufferTooSmall { needed: 12, actual: 4 })
    ));
    assert_eq!(small, [0u8; 4]);

    let mut exact = [0u8; 12];
    assert_eq!(page.get(rid, &mut exact).unwrap(), 12);
    assert_eq!(&exact, b"twelve bytes");
}

#[test]
fn test_page_linkage_accessors() {
    let mut page = new_page(10);
    page.set_next_page(Some(11));
    page.set_prev_page(Some(9));
    assert_eq!(page.next_page(), Some(11));
    assert_eq!(page.prev_page(), Some(9));

    page.set_next_page(None);
    assert_eq!(page.next_page(), None);
    assert_eq!(page.prev_page(), Some(9));
}

#[test]
fn test_reinit_resets_everything() {
    let mut page = new_page(1);
    page.set_next_page(Some(2));
    page.insert(b"old record").unwrap();

    page.reinit(77);
    assert_eq!(page.page_id(), 77);
    assert_eq!(page.next_page(), None);
    assert!(page.is_empty());
    assert_eq!(page.data_write_cursor(), 0);
    assert_eq!(page.free_bytes() as usize, PAGE_DATA_SIZE);
    assert_eq!(page.insert(b"new").unwrap(), RecordId::new(77, 1));
}

#[test]
fn test_reinit_leaves_no_trace_of_old_contents() {
    let mut used = new_page(1);
    let a = used.insert(b"old record").unwrap();
    used.insert(b"another one").unwrap();
    used.delete(a).unwrap();
    used.reinit(5);

    // A recycled frame and a fresh one produce the same image.
    let fresh = new_page(5);
    assert_eq!(used.as_bytes(), fresh.as_bytes());
    assert!(used.as_bytes()[32..].iter().all(|&b| b == 0));
}

#[test]
fn test_init_over_dirty_frame_matches_fresh_page() {
    let mut frame = vec![0xABu8; PAGE_SIZE];
    let page = SlottedPage::init(frame.as_mut_slice(), 3).unwrap();
    assert_eq!(page.as_bytes(), new_page(3).as_bytes());
}

#[test]
fn test_view_over_borrowed_frame() {
    // A buffer manager hands out a mutable frame; the page is a view over it.
    let mut frame = vec![0u8; PAGE_SIZE];
    let rid = {
        let mut page = SlottedPage::init(frame.as_mut_slice(), 4).unwrap();
        page.insert(b"persisted").unwrap()
    };

    let page = SlottedPage::open(frame.as_slice()).unwrap();
    assert_eq!(page.peek(rid).unwrap(), b"persisted");
    assert_eq!(page.page_id(), 4);
}

#[test]
fn test_open_rejects_inconsistent_header() {
    let mut page = new_page(1);
    page.insert(b"abc").unwrap();
    let mut image = page.into_inner();

    // Corrupt free_bytes.
    image[28..30].copy_from_slice(&5u16.to_le_bytes());
    let err = SlottedPage::open(image).err().unwrap();
    assert!(matches!(err, PageError::CorruptedPage { page_id: 1, .. }));
}

#[test]
fn test_open_rejects_gap_in_data_region() {
    let mut page = new_page(1);
    page.insert(b"abc").unwrap();
    let mut image = page.into_inner();

    // Move slot 1 to offset 1, leaving a gap at the start of the data region.
    let at = PAGE_SIZE - SLOT_SIZE;
    image[at..at + 2].copy_from_slice(&1u16.to_le_bytes());
    assert!(matches!(
        SlottedPage::open(image),
        Err(PageError::CorruptedPage { .. })
    ));
}

#[test]
fn test_open_rejects_wrong_size() {
    assert!(matches!(
        SlottedPage::open(vec![0u8; 100]),
        Err(PageError::InvalidPageSize { .. })
    ));
}
