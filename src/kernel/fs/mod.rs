use std::collections::HashMap;

use crate::kernel::error::{Error, Result};

pub mod node;

use node::{FIRST_NODE_ID, Node, NodeId};

/// Owns the content of every node and maps paths onto nodes.
#[derive(Debug)]
pub struct ContentStore {
    paths: HashMap<String, NodeId>,
    nodes: HashMap<NodeId, Node>,
    next_id: NodeId,
}

impl ContentStore {
    /// Constructs an empty [ContentStore].
    pub fn new() -> Self {
        Self {
            paths: HashMap::new(),
            nodes: HashMap::new(),
            next_id: FIRST_NODE_ID,
        }
    }

    /// Returns the node bound to `path`, creating an empty one if the path is unknown.
    pub fn create_if_missing(&mut self, path: &str) -> NodeId {
        if let Some(&id) = self.paths.get(path) {
            return id;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.paths.insert(path.to_owned(), id);
        self.nodes.insert(id, Node::default());
        log::debug!("created node {id} for {path}");
        id
    }

    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        self.paths.get(path).copied()
    }

    /// Replaces the content of a node. Only meant for initial setup.
    pub fn seed(&mut self, id: NodeId, data: &[u8]) -> Result<()> {
        self.node_mut(id)?.set_data(data);
        Ok(())
    }

    pub fn size(&self, id: NodeId) -> Result<u64> {
        Ok(self.node(id)?.size())
    }

    pub fn content(&self, id: NodeId) -> Result<&[u8]> {
        Ok(self.node(id)?.data())
    }

    pub fn read(&self, id: NodeId, offset: u64, max_len: usize) -> Result<&[u8]> {
        Ok(self.node(id)?.read_at(offset, max_len))
    }

    pub fn write(&mut self, id: NodeId, offset: u64, buf: &[u8]) -> Result<u64> {
        self.node_mut(id)?.write_at(offset, buf)
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(Error::NodeNotFound)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(Error::NodeNotFound)
    }
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_if_missing_is_idempotent() {
        let mut fs = ContentStore::new();
        let id = fs.create_if_missing("/notes.txt");
        fs.seed(id, b"SEED:").unwrap();

        assert_eq!(fs.create_if_missing("/notes.txt"), id);
        assert_eq!(fs.content(id).unwrap(), b"SEED:");
    }

    #[test]
    fn distinct_paths() {
        let mut fs = ContentStore::new();
        let a = fs.create_if_missing("/a");
        let b = fs.create_if_missing("/b");
        assert_eq!(a, FIRST_NODE_ID);
        assert_eq!(b, FIRST_NODE_ID + 1);
        assert_eq!(fs.lookup("/b"), Some(b));
        assert_eq!(fs.lookup("/c"), None);
    }

    #[test]
    fn seed_replaces() {
        let mut fs = ContentStore::new();
        let id = fs.create_if_missing("/a");
        fs.seed(id, b"long content").unwrap();
        fs.seed(id, b"short").unwrap();
        assert_eq!(fs.size(id).unwrap(), 5);
    }

    #[test]
    fn read_write() {
        let mut fs = ContentStore::new();
        let id = fs.create_if_missing("/a");
        assert_eq!(fs.write(id, 2, b"cd").unwrap(), 2);
        assert_eq!(fs.read(id, 0, 80).unwrap(), &[0, 0, b'c', b'd']);
        assert!(fs.read(id, 4, 80).unwrap().is_empty());
    }

    #[test]
    fn unknown_node() {
        let mut fs = ContentStore::new();
        assert_eq!(fs.size(7), Err(Error::NodeNotFound));
        assert_eq!(fs.write(7, 0, b"x"), Err(Error::NodeNotFound));
    }

    #[test]
    fn write_too_large() {
        let mut fs = ContentStore::new();
        let id = fs.create_if_missing("/a");
        assert_eq!(fs.write(id, i64::MAX as u64, b"x"), Err(Error::FileTooLarge));
        assert_eq!(fs.size(id), Ok(0));
    }
}
