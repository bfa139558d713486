pub mod records;
pub mod sync;
