//! Entries read back out of stored trees

pub mod database_entry;
