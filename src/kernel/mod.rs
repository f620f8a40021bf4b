use std::collections::BTreeMap;

use crate::kernel::{
    error::{Error, Result},
    file::{AccessMode, FileDescription, OpenFileId, OpenFileTable},
    fs::ContentStore,
    process::{FIRST_PID, FileDescriptor, Pid, Process},
};

pub mod error;
pub mod file;
pub mod fs;
pub mod process;


/// Options used to configure how a file is opened.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    mode: AccessMode,
    lock: bool,
}

impl OpenOptions {
    /// Read-write access without a lock.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: AccessMode) -> Self {
        self.mode = mode;
        self
    }

    /// Starts the cursor at the end of the file.
    pub fn append(mut self, append: bool) -> Self {
        if append {
            self.mode = AccessMode::Append;
        } else if self.mode == AccessMode::Append {
            self.mode = AccessMode::ReadWrite;
        }
        self
    }

    /// Acquires an exclusive write lock on the opened file.
    pub fn lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }
}

/// A model for the kernel.
///
/// Every call is scoped to a process. A descriptor resolves to an entry of
/// the open file table, which in turn resolves to a node of the content
/// store. Descriptors created by [Kernel::dup] or inherited through
/// [Kernel::fork] alias the same entry and so share its cursor and lock.
#[derive(Debug)]
pub struct Kernel {
    fs: ContentStore,
    oft: OpenFileTable,
    processes: BTreeMap<Pid, Process>,
    next_pid: Pid,
}

impl Kernel {
    /// Constructs a [Kernel] without any process.
    pub fn new() -> Self {
        Self {
            fs: ContentStore::new(),
            oft: OpenFileTable::new(),
            processes: BTreeMap::new(),
            next_pid: FIRST_PID,
        }
    }

    /// Creates a process with an empty descriptor table.
    pub fn spawn(&mut self) -> Pid {
        let pid = self.alloc_pid();
        self.processes.insert(pid, Process::new(pid));
        log::debug!("spawned process {pid}");
        pid
    }

    /// Opens `path`, creating it if missing, and binds a new descriptor to it.
    ///
    /// Every call creates a new open file, so opening a path twice yields
    /// independent cursors.
    pub fn open(&mut self, pid: Pid, path: &str, options: OpenOptions) -> Result<FileDescriptor> {
        self.process(pid)?;
        let node_id = self.fs.create_if_missing(path);

        if options.lock {
            if let Some(holder) = self.oft.lock_holder(node_id) {
                log::debug!("process {pid} cannot lock {path}: held by process {holder}");
                return Err(Error::LockHeld);
            }
        }

        let offset = match options.mode {
            AccessMode::ReadWrite => 0,
            AccessMode::Append => self.fs.size(node_id)?,
        };
        let mut file = FileDescription::new(node_id, path, options.mode, offset);
        if options.lock {
            file.locked_by = Some(pid);
        }

        let id = self.oft.insert(file);
        let fd = self.process_mut(pid)?.install(id);
        log::debug!(
            "process {pid} opened {path} as fd {fd} (file {id}, mode {}, offset {offset})",
            options.mode
        );
        Ok(fd)
    }

    /// Unbinds `fd`, releasing the open file once no descriptor aliases it.
    pub fn close(&mut self, pid: Pid, fd: FileDescriptor) -> Result<()> {
        let id = self.process_mut(pid)?.remove(fd)?;
        self.oft.dec_ref(id)?;
        log::debug!("process {pid} closed fd {fd} (file {id})");
        Ok(())
    }

    /// Reads at most `max_len` bytes at the cursor and advances it past them.
    /// Locks are not checked.
    pub fn read(&mut self, pid: Pid, fd: FileDescriptor, max_len: usize) -> Result<Vec<u8>> {
        let id = self.process(pid)?.get(fd)?;
        let file = self.oft.get_mut(id)?;
        let data = self.fs.read(file.node_id(), file.offset, max_len)?.to_vec();
        file.offset += data.len() as u64;
        log::debug!(
            "process {pid} read {} bytes from fd {fd}, offset now {}",
            data.len(),
            file.offset
        );
        Ok(data)
    }

    /// Writes `buf` at the cursor and advances it past the written bytes.
    ///
    /// # Errors
    /// Returns [Error::WriteDenied] if another process holds a lock on the
    /// node, through this open file or any other one.
    pub fn write(&mut self, pid: Pid, fd: FileDescriptor, buf: &[u8]) -> Result<u64> {
        let id = self.process(pid)?.get(fd)?;
        let node_id = self.oft.get(id)?.node_id();
        if let Some(holder) = self.oft.lock_holder(node_id).filter(|&holder| holder != pid) {
            log::debug!("process {pid} denied write to fd {fd}: locked by process {holder}");
            return Err(Error::WriteDenied);
        }

        let file = self.oft.get_mut(id)?;
        let written = self.fs.write(node_id, file.offset, buf)?;
        file.offset += written;
        log::debug!(
            "process {pid} wrote {written} bytes to fd {fd}, offset now {}",
            file.offset
        );
        Ok(written)
    }

    /// Moves the cursor to the absolute `position`.
    pub fn lseek(&mut self, pid: Pid, fd: FileDescriptor, position: i64) -> Result<u64> {
        let position = u64::try_from(position).map_err(|_| Error::InvalidArgument)?;
        let id = self.process(pid)?.get(fd)?;
        self.oft.get_mut(id)?.offset = position;
        log::debug!("process {pid} moved fd {fd} to offset {position}");
        Ok(position)
    }

    /// Binds a new descriptor to the open file `old_fd` is bound to.
    pub fn dup(&mut self, pid: Pid, old_fd: FileDescriptor) -> Result<FileDescriptor> {
        let id = self.process(pid)?.get(old_fd)?;
        self.oft.inc_ref(id)?;
        let fd = self.process_mut(pid)?.duplicate(old_fd)?;
        log::debug!("process {pid} duplicated fd {old_fd} as fd {fd} (file {id})");
        Ok(fd)
    }

    /// Creates a child process inheriting every descriptor of `parent`.
    pub fn fork(&mut self, parent: Pid) -> Result<Pid> {
        self.process(parent)?;
        let pid = self.alloc_pid();
        let child = self.process(parent)?.fork(pid);
        for (_, id) in child.descriptors() {
            self.oft.inc_ref(id)?;
        }
        self.processes.insert(pid, child);
        log::debug!("process {parent} forked process {pid}");
        Ok(pid)
    }

    pub fn process(&self, pid: Pid) -> Result<&Process> {
        self.processes.get(&pid).ok_or(Error::NoSuchProcess)
    }

    /// Lists the live processes ordered by pid.
    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.processes.values()
    }

    pub fn open_file(&self, id: OpenFileId) -> Result<&FileDescription> {
        self.oft.get(id)
    }

    /// Lists the open files ordered by handle.
    pub fn open_files(&self) -> impl Iterator<Item = (OpenFileId, &FileDescription)> {
        self.oft.snapshot()
    }

    pub fn fs(&self) -> &ContentStore {
        &self.fs
    }

    pub fn fs_mut(&mut self) -> &mut ContentStore {
        &mut self.fs
    }

    fn process_mut(&mut self, pid: Pid) -> Result<&mut Process> {
        self.processes.get_mut(&pid).ok_or(Error::NoSuchProcess)
    }

    fn alloc_pid(&mut self) -> Pid {
        let pid = self.next_pid;
        self.next_pid += 1;
        pid
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}
