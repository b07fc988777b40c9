pub mod builder;
pub mod memory;
pub mod merge;
pub mod rank;
pub mod spill;
