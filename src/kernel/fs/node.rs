use crate::kernel::error::{Error, Result};

/// A unique id of a [Node].
pub type NodeId = u64;

/// Id of the first allocated node.
pub const FIRST_NODE_ID: NodeId = 1;

/// Largest size a node may grow to.
pub const MAX_NODE_SIZE: u64 = 1 << 32;

/// Represents the byte content of a file, independent of any path.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Node {
    data: Vec<u8>,
}

impl Node {
    /// Returns the size of the node in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Replaces the content of the node.
    pub fn set_data(&mut self, data: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(data);
    }

    /// Returns at most `max_len` bytes starting at `offset`.
    /// Reading at or past the end yields an empty slice.
    pub fn read_at(&self, offset: u64, max_len: usize) -> &[u8] {
        if offset >= self.size() {
            return &[];
        }

        let start = offset as usize;
        let end = start.saturating_add(max_len).min(self.data.len());
        &self.data[start..end]
    }

    /// Writes `buf` at `offset`, returning the number of bytes written.
    /// The gap between the current end and `offset` is filled with zeroes.
    ///
    /// # Errors
    /// Returns [Error::FileTooLarge] if the write would end past [MAX_NODE_SIZE].
    pub fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<u64> {
        if buf.is_empty() {
            return Ok(0);
        }

        let end = offset
            .checked_add(buf.len() as u64)
            .filter(|&end| end <= MAX_NODE_SIZE)
            .ok_or(Error::FileTooLarge)?;
        let start = usize::try_from(offset).map_err(|_| Error::FileTooLarge)?;
        let end = usize::try_from(end).map_err(|_| Error::FileTooLarge)?;

        if end > self.data.len() {
            self.data
                .try_reserve(end - self.data.len())
                .map_err(|_| Error::NoSpace)?;
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(buf);
        Ok(buf.len() as u64)
    }
}
