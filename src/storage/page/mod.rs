pub mod page_address;


use crate::errors::{HeapError, Result};
use crate::storage::tuple::{RecordId, Tuple, TupleDesc};
use crate::{SlotId, PAGE_SIZE};
use self::page_address::PageAddress;
use std::sync::Arc;

/**
 *
 * Decoded heap page.
 *
 * Page format (PAGE_SIZE bytes in total):
 * ----------------------------------------------------------------
 * | Header bitmap (ceil(slots / 8)) | Slot 0 | Slot 1 | ... | Pad
 * ----------------------------------------------------------------
 *
 * Bit i of the header (byte i / 8, least significant bit first) is set when
 * slot i holds a live tuple. Every slot is `TupleDesc::size()` bytes wide.
 */
#[derive(Debug)]
pub struct Page {
    address: PageAddress,
    slots: Vec<Option<Tuple>>,
}

impl Page {
    /// Number of tuple slots that fit on one page for the given schema.
    pub fn num_slots(desc: &TupleDesc) -> usize {
        (PAGE_SIZE * 8) / (desc.size() * 8 + 1)
    }

    pub fn header_size(desc: &TupleDesc) -> usize {
        (Self::num_slots(desc) + 7) / 8
    }

    pub fn from_bytes(address: PageAddress, data: &[u8], desc: &TupleDesc) -> Result<Self> {
        if data.len() != PAGE_SIZE {
            return Err(HeapError::Corrupted(format!(
                "{} has {} bytes, expected {}",
                address,
                data.len(),
                PAGE_SIZE
            )));
        }
        let num_slots = Self::num_slots(desc);
        let header_size = Self::header_size(desc);
        let tuple_size = desc.size();

        let (header, body) = data.split_at(header_size);
        let mut slots = Vec::with_capacity(num_slots);
        for slot in 0..num_slots {
            if header[slot / 8] & (1 << (slot % 8)) == 0 {
                slots.push(None);
                continue;
            }
            let start = slot * tuple_size;
            let mut tuple = desc.parse_tuple(&body[start..start + tuple_size])?;
            tuple.set_record_id(RecordId { address, slot });
            slots.push(Some(tuple));
        }

        Ok(Self { address, slots })
    }

    /// Page bytes holding `tuples` in slots `0..tuples.len()`.
    pub fn encode(desc: &TupleDesc, tuples: &[Tuple]) -> Result<Vec<u8>> {
        let capacity = Self::num_slots(desc);
        if tuples.len() > capacity {
            return Err(HeapError::PageFull { capacity });
        }
        let header_size = Self::header_size(desc);

        let mut data = vec![0u8; header_size];
        for (slot, tuple) in tuples.iter().enumerate() {
            data[slot / 8] |= 1 << (slot % 8);
            desc.serialize_tuple(tuple, &mut data)?;
        }
        data.resize(PAGE_SIZE, 0);
        Ok(data)
    }

    pub fn empty_page_data() -> Vec<u8> {
        vec![0; PAGE_SIZE]
    }

    pub fn get_id(&self) -> PageAddress {
        self.address
    }

    pub fn get_tuple(&self, slot: SlotId) -> Option<&Tuple> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn num_tuples(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn num_empty_slots(&self) -> usize {
        self.slots.len() - self.num_tuples()
    }

    /// Live tuples in slot order. Every call starts from slot 0.
    pub fn tuples(self: &Arc<Self>) -> PageTuples {
        PageTuples {
            page: Arc::clone(self),
            slot: 0,
        }
    }
}

/// Forward iterator over the live tuples of a page. Holds its own reference
/// to the page, so it outlives the borrow it was created from.
pub struct PageTuples {
    page: Arc<Page>,
    slot: SlotId,
}

impl Iterator for PageTuples {
    type Item = Tuple;

    fn next(&mut self) -> Option<Tuple> {
        while self.slot < self.page.slots.len() {
            let slot = self.slot;
            self.slot += 1;
            if let Some(tuple) = &self.page.slots[slot] {
                return Some(tuple.clone());
            }
        }
        None
    }
}
