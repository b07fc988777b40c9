use std::fs::File;
use std::path::Path;
use memmap2::{Mmap, MmapOptions};
use crate::core::error::Result;

/// Memory-mapped file for zero-copy reads.
pub struct MmapFile {
    pub mmap: Mmap,
    pub len: usize,
}

impl MmapFile {
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        let len = file.metadata()?.len() as usize;

        let mmap = unsafe { MmapOptions::new().len(len).map(&file)? };

        Ok(MmapFile { mmap, len })
    }

    pub fn data(&self) -> &[u8] {
        &self.mmap[..]
    }
}
