use crate::errors::Result;
use crate::storage::page::Page;
use crate::storage::tuple::{Tuple, TupleDesc};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes page-aligned heap files from tuples laid out page by page.
pub struct HeapFileEncoder;

impl HeapFileEncoder {
    /// Creates (or truncates) the file at `path` holding one page per entry of
    /// `pages`. An empty entry writes a page without live tuples.
    pub fn write<P: AsRef<Path>>(path: P, desc: &TupleDesc, pages: &[Vec<Tuple>]) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);
        for tuples in pages {
            writer.write_all(&Page::encode(desc, tuples)?)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Like `write`, but fills pages in order, starting a new page whenever
    /// the current one is full.
    pub fn write_tuples<P: AsRef<Path>>(path: P, desc: &TupleDesc, tuples: &[Tuple]) -> Result<()> {
        let per_page = Page::num_slots(desc).max(1);
        let pages: Vec<Vec<Tuple>> = tuples.chunks(per_page).map(|c| c.to_vec()).collect();
        Self::write(path, desc, &pages)
    }
}
