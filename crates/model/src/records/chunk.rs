use crate::records::row::Record;

/// A bounded buffer of transformed records awaiting a single sink write.
/// A chunk is flushed as soon as it reaches capacity, or once more at end
/// of input if partially filled. It is never flushed empty.
#[derive(Debug)]
pub struct Chunk {
    records: Vec<Record>,
    capacity: usize,
}

impl Chunk {
    pub fn new(capacity: usize) -> Self {
        Chunk {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Buffer a record. Returns `true` once the chunk is at capacity.
    pub fn push(&mut self, record: Record) -> bool {
        self.records.push(record);
        self.records.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hand the buffered records off and reset for the next chunk.
    pub fn drain(&mut self) -> Vec<Record> {
        std::mem::replace(&mut self.records, Vec::with_capacity(self.capacity))
    }
}
