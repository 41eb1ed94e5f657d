pub mod header;
pub mod scan;
pub mod slotted_page;
