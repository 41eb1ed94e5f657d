pub mod driver;
pub mod shell;
pub mod storage;
pub mod types;
pub mod utils;

pub use storage::slotted_page::SlottedPage;
pub use types::{error::PageError, record_id::RecordId, slot::Slot};
