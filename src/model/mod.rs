pub mod collection;
pub mod entry;
pub mod sort;
