use std::{collections::BTreeMap, fmt};

use crate::kernel::{
    error::{Error, Result},
    fs::node::NodeId,
    process::Pid,
};

/// A unique handle to an entry of the [OpenFileTable].
pub type OpenFileId = u64;

/// Handle of the first opened file.
pub const FIRST_OPEN_FILE_ID: OpenFileId = 100;

/// How an opened file is accessed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    #[default]
    ReadWrite,
    /// The cursor starts at the end of the file.
    ///
    /// Only the initial cursor is affected, writes do not seek to the end.
    Append,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadWrite => f.write_str("rw"),
            Self::Append => f.write_str("a"),
        }
    }
}

/// An opened file shared by every descriptor aliasing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescription {
    node_id: NodeId,
    path: String,
    mode: AccessMode,
    pub offset: u64,
    ref_count: usize,
    pub locked_by: Option<Pid>,
}

impl FileDescription {
    /// Creates a new [FileDescription] with a single reference.
    pub fn new(node_id: NodeId, path: &str, mode: AccessMode, offset: u64) -> Self {
        Self {
            node_id,
            path: path.to_owned(),
            mode,
            offset,
            ref_count: 1,
            locked_by: None,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn ref_count(&self) -> usize {
        self.ref_count
    }
}

/// Tracks opened files.
#[derive(Debug)]
pub struct OpenFileTable {
    files: BTreeMap<OpenFileId, FileDescription>,
    next_id: OpenFileId,
}

impl OpenFileTable {
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
            next_id: FIRST_OPEN_FILE_ID,
        }
    }

    /// Inserts a file, returning its handle. Handles are never reused.
    pub fn insert(&mut self, file: FileDescription) -> OpenFileId {
        let id = self.next_id;
        self.next_id += 1;
        self.files.insert(id, file);
        id
    }

    pub fn get(&self, id: OpenFileId) -> Result<&FileDescription> {
        self.files.get(&id).ok_or(Error::NotFound)
    }

    pub fn get_mut(&mut self, id: OpenFileId) -> Result<&mut FileDescription> {
        self.files.get_mut(&id).ok_or(Error::NotFound)
    }

    /// Records a new alias of the file.
    pub fn inc_ref(&mut self, id: OpenFileId) -> Result<()> {
        self.get_mut(id)?.ref_count += 1;
        Ok(())
    }

    /// Drops an alias of the file, removing it once no alias is left.
    /// Returns whether the file was removed.
    pub fn dec_ref(&mut self, id: OpenFileId) -> Result<bool> {
        let file = self.get_mut(id)?;
        file.ref_count -= 1;
        if file.ref_count > 0 {
            return Ok(false);
        }

        self.files.remove(&id);
        log::debug!("released open file {id}");
        Ok(true)
    }

    /// Returns the holder of a lock on `node_id`, if any opened file holds one.
    pub fn lock_holder(&self, node_id: NodeId) -> Option<Pid> {
        self.files
            .values()
            .filter(|file| file.node_id == node_id)
            .find_map(|file| file.locked_by)
    }

    /// Lists the opened files ordered by handle.
    pub fn snapshot(&self) -> impl Iterator<Item = (OpenFileId, &FileDescription)> {
        self.files.iter().map(|(&id, file)| (id, file))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Default for OpenFileTable {
    fn default() -> Self {
        Self::new()
    }
}
