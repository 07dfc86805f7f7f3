pub mod buffer;
pub mod ops;
