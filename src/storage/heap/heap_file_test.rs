use crate::errors::HeapError;
use crate::storage::heap::heap_file::HeapFile;
use crate::storage::heap::heap_file_encoder::HeapFileEncoder;
use crate::storage::page::page_address::PageAddress;
use crate::storage::page::Page;
use crate::storage::tuple::Tuple;
use crate::test_utils::{int_desc, int_tuple, write_heap_file, TestFile};
use crate::transaction::TransactionId;
use crate::{default_logger, PAGE_SIZE};
use std::io::ErrorKind;

#[test]
fn page_count_rounds_up() -> anyhow::Result<()> {
    let logger = default_logger();
    let file = TestFile::new("heap_file_page_count.db");

    for (len, expected) in vec![
        (0, 0),
        (PAGE_SIZE - 1, 1),
        (PAGE_SIZE, 1),
        (PAGE_SIZE + 1, 2),
        (2 * PAGE_SIZE, 2),
    ] {
        std::fs::write(&file, vec![0u8; len])?;
        let hf = HeapFile::open(&file, int_desc(), &logger)?;
        assert_eq!(hf.page_count()?, expected, "file of {} bytes", len);
        assert_eq!(hf.is_empty()?, len == 0);
    }
    Ok(())
}

#[test]
fn read_every_page() -> anyhow::Result<()> {
    let logger = default_logger();
    let file = TestFile::new("heap_file_read_every_page.db");
    write_heap_file(&file, &[3, 0, 7, 1])?;

    let hf = HeapFile::open(&file, int_desc(), &logger)?;
    assert_eq!(hf.len()?, 4 * PAGE_SIZE as u64);
    assert_eq!(hf.page_count()?, 4);

    let counts = [3, 0, 7, 1];
    for page_number in 0..hf.page_count()? {
        let address = PageAddress::new(hf.get_id(), page_number);
        let page = hf.read_page(address)?;
        assert_eq!(page.get_id(), address);
        assert_eq!(page.num_tuples(), counts[page_number as usize]);
        if let Some(tuple) = page.get_tuple(0) {
            assert_eq!(tuple.fields(), int_tuple(page_number as usize, 0).fields());
        }
    }
    Ok(())
}

#[test]
fn read_past_end_is_out_of_range() -> anyhow::Result<()> {
    let logger = default_logger();
    let file = TestFile::new("heap_file_read_past_end.db");
    write_heap_file(&file, &[1, 1])?;

    let hf = HeapFile::open(&file, int_desc(), &logger)?;
    let address = PageAddress::new(hf.get_id(), hf.page_count()?);
    match hf.read_page(address) {
        Err(HeapError::OutOfRange {
            address: a,
            page_count,
        }) => {
            assert_eq!(a, address);
            assert_eq!(page_count, 2);
        }
        other => panic!("expected OutOfRange, got {:?}", other.map(|p| p.get_id())),
    }

    // no overflow on absurd page numbers
    let err = hf.read_page(PageAddress::new(hf.get_id(), u64::MAX)).unwrap_err();
    assert!(err.is_out_of_range());
    Ok(())
}

#[test]
fn read_other_table_is_out_of_range() -> anyhow::Result<()> {
    let logger = default_logger();
    let file = TestFile::new("heap_file_read_other_table.db");
    write_heap_file(&file, &[1])?;

    let hf = HeapFile::open(&file, int_desc(), &logger)?;
    let other = hf.get_id().wrapping_add(1);
    let err = hf.read_page(PageAddress::new(other, 0)).unwrap_err();
    assert!(err.is_out_of_range());
    assert!(matches!(err, HeapError::TableMismatch { found, .. } if found == other));
    Ok(())
}

#[test]
fn trailing_partial_page_is_io_failure() -> anyhow::Result<()> {
    let logger = default_logger();
    let file = TestFile::new("heap_file_partial_page.db");
    write_heap_file(&file, &[2])?;
    let mut bytes = std::fs::read(&file)?;
    bytes.extend_from_slice(&[0u8; 10]);
    std::fs::write(&file, bytes)?;

    let hf = HeapFile::open(&file, int_desc(), &logger)?;
    assert_eq!(hf.page_count()?, 2);
    assert_eq!(hf.read_page(PageAddress::new(hf.get_id(), 0))?.num_tuples(), 2);
    match hf.read_page(PageAddress::new(hf.get_id(), 1)) {
        Err(HeapError::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("expected Io, got {:?}", other.map(|p| p.get_id())),
    }
    Ok(())
}

#[test]
fn identity_is_stable_per_path() -> anyhow::Result<()> {
    let logger = default_logger();
    let file = TestFile::new("heap_file_identity.db");
    let other = TestFile::new("heap_file_identity_other.db");
    write_heap_file(&file, &[1])?;
    write_heap_file(&other, &[1])?;

    let hf = HeapFile::open(&file, int_desc(), &logger)?;
    assert_eq!(hf.get_id(), hf.get_id());

    // same file through a different spelling of the path
    let again = HeapFile::open("target/../target/heap_file_identity.db", int_desc(), &logger)?;
    assert_eq!(again.get_id(), hf.get_id());
    assert_eq!(again.path(), hf.path());

    let different = HeapFile::open(&other, int_desc(), &logger)?;
    assert_ne!(different.get_id(), hf.get_id());
    assert_eq!(hf.get_tuple_desc(), &int_desc());
    Ok(())
}

#[test]
fn missing_file_fails_to_open() {
    let logger = default_logger();
    let result = HeapFile::open("target/heap_file_does_not_exist.db", int_desc(), &logger);
    assert!(matches!(result, Err(HeapError::Io(_))));
}

#[test]
fn mutations_are_unsupported() -> anyhow::Result<()> {
    let logger = default_logger();
    let file = TestFile::new("heap_file_mutations.db");
    write_heap_file(&file, &[1])?;

    let hf = HeapFile::open(&file, int_desc(), &logger)?;
    let tid = TransactionId::new();
    assert!(matches!(
        hf.insert_tuple(tid, int_tuple(0, 1)),
        Err(HeapError::Unsupported("insert_tuple"))
    ));
    assert!(matches!(
        hf.delete_tuple(tid, &int_tuple(0, 0)),
        Err(HeapError::Unsupported("delete_tuple"))
    ));
    let page = hf.read_page(PageAddress::new(hf.get_id(), 0))?;
    assert!(matches!(
        hf.write_page(&page),
        Err(HeapError::Unsupported("write_page"))
    ));
    Ok(())
}

#[test]
fn encoder_splits_tuples_across_full_pages() -> anyhow::Result<()> {
    let logger = default_logger();
    let file = TestFile::new("heap_file_encoder_split.db");
    let desc = int_desc();
    let per_page = Page::num_slots(&desc);
    let tuples: Vec<Tuple> = (0..per_page * 2 + 1).map(|i| int_tuple(0, i)).collect();
    HeapFileEncoder::write_tuples(&file, &desc, &tuples)?;

    let hf = HeapFile::open(&file, desc, &logger)?;
    assert_eq!(hf.page_count()?, 3);
    let last = hf.read_page(PageAddress::new(hf.get_id(), 2))?;
    assert_eq!(last.num_tuples(), 1);
    assert_eq!(
        last.get_tuple(0).map(|t| t.fields().to_vec()),
        Some(tuples[per_page * 2].fields().to_vec())
    );
    Ok(())
}
