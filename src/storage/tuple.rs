use crate::errors::{HeapError, Result};
use crate::storage::page::page_address::PageAddress;
use crate::{SlotId, STRING_LEN};
use std::fmt;

/// Field types a heap file can store. Every type has a fixed on-page width.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Text,
}

impl Type {
    /// Bytes one field of this type occupies on a page.
    pub fn size(&self) -> usize {
        match self {
            Type::Int => 4,
            Type::Text => 4 + STRING_LEN,
        }
    }

    fn parse(&self, bytes: &[u8]) -> Result<Field> {
        let mut head: [u8; 4] = Default::default();
        head.copy_from_slice(&bytes[..4]);
        match self {
            Type::Int => Ok(Field::Int(i32::from_be_bytes(head))),
            Type::Text => {
                let len = i32::from_be_bytes(head);
                if len < 0 || len as usize > STRING_LEN {
                    return Err(HeapError::Corrupted(format!(
                        "text length {} exceeds {}",
                        len, STRING_LEN
                    )));
                }
                let payload = &bytes[4..4 + len as usize];
                let text = String::from_utf8(payload.to_vec())
                    .map_err(|e| HeapError::Corrupted(e.to_string()))?;
                Ok(Field::Text(text))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Int(i32),
    Text(String),
}

impl Field {
    pub fn get_type(&self) -> Type {
        match self {
            Field::Int(_) => Type::Int,
            Field::Text(_) => Type::Text,
        }
    }

    // Text longer than STRING_LEN bytes is truncated on a char boundary.
    fn serialize(&self, buf: &mut Vec<u8>) {
        match self {
            Field::Int(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Field::Text(s) => {
                let mut end = s.len().min(STRING_LEN);
                while !s.is_char_boundary(end) {
                    end -= 1;
                }
                buf.extend_from_slice(&(end as i32).to_be_bytes());
                buf.extend_from_slice(&s.as_bytes()[..end]);
                buf.resize(buf.len() + STRING_LEN - end, 0);
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Int(v) => write!(f, "{}", v),
            Field::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TdItem {
    field_type: Type,
    name: String,
}

/// Schema of a table: an ordered list of typed, named fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleDesc {
    items: Vec<TdItem>,
}

impl TupleDesc {
    pub fn new(fields: Vec<(Type, &str)>) -> Self {
        Self {
            items: fields
                .into_iter()
                .map(|(field_type, name)| TdItem {
                    field_type,
                    name: name.to_string(),
                })
                .collect(),
        }
    }

    /// A schema whose fields are named `f0`, `f1`, ...
    pub fn from_types(types: &[Type]) -> Self {
        Self {
            items: types
                .iter()
                .enumerate()
                .map(|(i, t)| TdItem {
                    field_type: *t,
                    name: format!("f{}", i),
                })
                .collect(),
        }
    }

    pub fn num_fields(&self) -> usize {
        self.items.len()
    }
    pub fn field_type(&self, i: usize) -> Option<Type> {
        self.items.get(i).map(|item| item.field_type)
    }
    pub fn field_name(&self, i: usize) -> Option<&str> {
        self.items.get(i).map(|item| item.name.as_str())
    }
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| item.name == name)
    }

    /// Bytes one tuple of this schema occupies on a page.
    pub fn size(&self) -> usize {
        self.items.iter().map(|item| item.field_type.size()).sum()
    }

    pub(crate) fn parse_tuple(&self, bytes: &[u8]) -> Result<Tuple> {
        let mut offset = 0;
        let mut fields = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let len = item.field_type.size();
            fields.push(item.field_type.parse(&bytes[offset..offset + len])?);
            offset += len;
        }
        Ok(Tuple::new(fields))
    }

    fn matches(&self, tuple: &Tuple) -> bool {
        tuple.fields.len() == self.items.len()
            && tuple
                .fields
                .iter()
                .zip(&self.items)
                .all(|(f, item)| f.get_type() == item.field_type)
    }

    pub(crate) fn serialize_tuple(&self, tuple: &Tuple, buf: &mut Vec<u8>) -> Result<()> {
        if !self.matches(tuple) {
            return Err(HeapError::Corrupted(format!(
                "tuple {} does not match schema",
                tuple
            )));
        }
        for field in &tuple.fields {
            field.serialize(buf);
        }
        Ok(())
    }
}

/// Location of a tuple: the page holding it and its slot on that page.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RecordId {
    pub address: PageAddress,
    pub slot: SlotId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    fields: Vec<Field>,
    record_id: Option<RecordId>,
}

impl Tuple {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            record_id: None,
        }
    }
    pub fn get_field(&self, i: usize) -> Option<&Field> {
        self.fields.get(i)
    }
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }
    pub fn set_record_id(&mut self, record_id: RecordId) {
        self.record_id = Some(record_id);
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self.fields.iter().map(|v| v.to_string()).collect();
        write!(f, "({})", fields.join(", "))
    }
}
