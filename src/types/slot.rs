use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::types::SLOT_SIZE;

/// Length value marking an unoccupied directory entry on disk.
/// Never a valid record length: records are bounded by the data region.
pub const EMPTY_SLOT_LENGTH: u16 = u16::MAX;

/// One slot directory entry.
///
/// Offsets are relative to the start of the data region, not the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Occupied { offset: u16, length: u16 },
    Empty,
}

impl Slot {
    pub fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    /// Byte range of the record inside the data region.
    pub fn range(&self) -> Option<Range<usize>> {
        match *self {
            Slot::Occupied { offset, length } => {
                Some(offset as usize..offset as usize + length as usize)
            }
            Slot::Empty => None,
        }
    }

    pub fn decode(bytes: &[u8]) -> Self {
        let offset = u16::from_le_bytes([bytes[0], bytes[1]]);
        let length = u16::from_le_bytes([bytes[2], bytes[3]]);
        if length == EMPTY_SLOT_LENGTH {
            Slot::Empty
        } else {
            Slot::Occupied { offset, length }
        }
    }

    pub fn encode(&self) -> [u8; SLOT_SIZE] {
        let (offset, length) = match *self {
            Slot::Occupied { offset, length } => (offset, length),
            Slot::Empty => (0, EMPTY_SLOT_LENGTH),
        };
        let mut bytes = [0u8; SLOT_SIZE];
        bytes[0..2].copy_from_slice(&offset.to_le_bytes());
        bytes[2..4].copy_from_slice(&length.to_le_bytes());
        bytes
    }
}
