use std::collections::HashSet;

use heapslot::{
    types::record_id::RecordId,
    utils::mock::{new_page, sample_record},
};

fn scan_by_hand(page: &heapslot::SlottedPage<Vec<u8>>) -> Vec<RecordId> {
    let mut visited = Vec::new();
    let mut cursor = page.first_record();
    while let Some(rid) = cursor {
        visited.push(rid);
        cursor = page.next_record(rid).unwrap();
    }
    visited
}

#[test]
fn test_scan_on_empty_page() {
    let page = new_page(1);
    assert_eq!(page.first_record(), None);
    assert_eq!(page.records().count(), 0);
}

#[test]
fn test_first_record_is_at_offset_zero() {
    let mut page = new_page(1);
    let a = page.insert(b"one").unwrap();
    let b = page.insert(b"two").unwrap();
    assert_eq!(page.first_record(), Some(a));

    page.delete(a).unwrap();
    assert_eq!(page.first_record(), Some(b));
    assert_eq!(page.record_at_offset(0), Some(b));
}

#[test]
fn test_record_at_offset() {
    let mut page = new_page(1);
    let a = page.insert(b"12345").unwrap();
    let b = page.insert(b"678").unwrap();

    assert_eq!(page.record_at_offset(0), Some(a));
    assert_eq!(page.record_at_offset(5), Some(b));
    assert_eq!(page.record_at_offset(3), None);
    assert_eq!(page.record_at_offset(8), None);
}

#[test]
fn test_next_record_at_end_is_none() {
    let mut page = new_page(1);
    page.insert(b"a").unwrap();
    let last = page.insert(b"b").unwrap();
    assert_eq!(page.next_record(last).unwrap(), None);
}

#[test]
fn test_scan_visits_every_record_once_in_offset_order() {
    let mut page = new_page(1);
    let rids: Vec<RecordId> = (0..20u32)
        .map(|i| page.insert(&sample_record(i, 11 + i as usize)).unwrap())
        .collect();
    for rid in [rids[0], rids[5], rids[6], rids[13]] {
        page.delete(rid).unwrap();
    }
    // These reuse slots 1, 6 and 7 but land at the end of the data region.
    for i in 100..103u32 {
        page.insert(&sample_record(i, 15)).unwrap();
    }

    let visited = scan_by_hand(&page);
    assert_eq!(visited.len(), page.record_count());
    let unique: HashSet<RecordId> = visited.iter().copied().collect();
    assert_eq!(unique.len(), visited.len());

    let offsets: Vec<usize> = visited
        .iter()
        .map(|rid| page.slot(rid.slot_no).unwrap().range().unwrap().start)
        .collect();
    assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));

    // Physical order differs from slot order once slots are reused.
    let slot_order: Vec<u16> = visited.iter().map(|rid| rid.slot_no).collect();
    let mut sorted = slot_order.clone();
    sorted.sort_unstable();
    assert_ne!(slot_order, sorted);
}

#[test]
fn test_records_iterator_matches_manual_scan() {
    let mut page = new_page(3);
    for i in 0..10u32 {
        page.insert(&sample_record(i, 16)).unwrap();
    }
    page.delete(RecordId::new(3, 4)).unwrap();
    page.insert(b"refill").unwrap();

    let manual = scan_by_hand(&page);
    let iterated: Vec<RecordId> = page.records().map(|(rid, _)| rid).collect();
    assert_eq!(manual, iterated);

    for (rid, data) in page.records() {
        assert_eq!(data, page.peek(rid).unwrap());
    }
    let (last_rid, last_data) = page.records().last().unwrap();
    assert_eq!(last_rid, RecordId::new(3, 4));
    assert_eq!(last_data, b"refill");
}
