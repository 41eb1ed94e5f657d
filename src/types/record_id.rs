use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{PageId, SlotNo};

/// Identifies a record by the page holding it and its 1-indexed slot number.
///
/// A record id stays valid until the record itself is deleted, no matter
/// how many other records are inserted into or removed from the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot_no: SlotNo,
}

impl RecordId {
    pub fn new(page_id: PageId, slot_no: SlotNo) -> Self {
        Self { page_id, slot_no }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.page_id, self.slot_no)
    }
}
