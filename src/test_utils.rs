use crate::storage::heap::heap_file_encoder::HeapFileEncoder;
use crate::storage::tuple::{Field, Tuple, TupleDesc, Type};
use std::path::{Path, PathBuf};

/// A file under `target/` removed when the guard drops.
pub struct TestFile {
    path: PathBuf,
}

impl TestFile {
    pub fn new(name: &str) -> Self {
        let path = Path::new("target").join(name);
        let _ = std::fs::remove_file(&path);
        Self { path }
    }
}

impl Drop for TestFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

impl AsRef<Path> for TestFile {
    fn as_ref(&self) -> &Path {
        self.path.as_ref()
    }
}

pub fn int_desc() -> TupleDesc {
    TupleDesc::new(vec![(Type::Int, "page"), (Type::Int, "slot")])
}

/// Tuple recording where it was written: (page, slot).
pub fn int_tuple(page: usize, slot: usize) -> Tuple {
    Tuple::new(vec![Field::Int(page as i32), Field::Int(slot as i32)])
}

/// Writes a heap file whose page i holds `counts[i]` tuples and returns the
/// tuples in page-then-slot order.
pub fn write_heap_file(file: &TestFile, counts: &[usize]) -> anyhow::Result<Vec<Tuple>> {
    let pages: Vec<Vec<Tuple>> = counts
        .iter()
        .enumerate()
        .map(|(page, &count)| (0..count).map(|slot| int_tuple(page, slot)).collect())
        .collect();
    HeapFileEncoder::write(file, &int_desc(), &pages)?;
    Ok(pages.into_iter().flatten().collect())
}
