use std::collections::BTreeMap;

use crate::kernel::{
    error::{Error, Result},
    file::OpenFileId,
};

/// A unique id of a [Process].
pub type Pid = u32;

/// Id of the first spawned process.
pub const FIRST_PID: Pid = 1000;

/// A per-process id used to track opened files.
pub type FileDescriptor = usize;

/// Descriptors below this are reserved for the standard streams.
pub const RESERVED_FDS: FileDescriptor = 3;

/// A process and its descriptor table.
///
/// The table only binds descriptors to open files; keeping the reference
/// counts of those files in sync is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pid: Pid,
    fds: BTreeMap<FileDescriptor, OpenFileId>,
    next_fd: FileDescriptor,
}

impl Process {
    /// Constructs a [Process] with an empty descriptor table.
    pub fn new(pid: Pid) -> Self {
        Self {
            pid,
            fds: BTreeMap::new(),
            next_fd: RESERVED_FDS,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Binds a new descriptor to `file`.
    pub fn install(&mut self, file: OpenFileId) -> FileDescriptor {
        let fd = self.next_fd;
        self.next_fd += 1;
        self.fds.insert(fd, file);
        fd
    }

    /// Binds a new descriptor to the file `old_fd` is bound to.
    pub fn duplicate(&mut self, old_fd: FileDescriptor) -> Result<FileDescriptor> {
        let file = self.get(old_fd)?;
        Ok(self.install(file))
    }

    /// Copies the descriptor table into a new process.
    pub fn fork(&self, child_pid: Pid) -> Self {
        Self {
            pid: child_pid,
            fds: self.fds.clone(),
            next_fd: self.next_fd,
        }
    }

    pub fn get(&self, fd: FileDescriptor) -> Result<OpenFileId> {
        self.fds.get(&fd).copied().ok_or(Error::BadDescriptor)
    }

    /// Unbinds `fd`, returning the file it was bound to.
    pub fn remove(&mut self, fd: FileDescriptor) -> Result<OpenFileId> {
        self.fds.remove(&fd).ok_or(Error::BadDescriptor)
    }

    /// Lists the bound descriptors in ascending order.
    pub fn descriptors(&self) -> impl Iterator<Item = (FileDescriptor, OpenFileId)> {
        self.fds.iter().map(|(&fd, &file)| (fd, file))
    }
}
