pub mod entry;
pub mod reader;
pub mod varint;
pub mod writer;
