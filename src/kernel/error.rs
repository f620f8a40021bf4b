pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Descriptor
    BadDescriptor,

    // Open file
    NotFound,
    LockHeld,
    WriteDenied,

    InvalidArgument,

    // Process
    NoSuchProcess,

    // Node
    NodeNotFound,
    FileTooLarge,
    NoSpace,
}

impl From<Error> for libc::c_int {
    fn from(err: Error) -> Self {
        match err {
            Error::BadDescriptor => libc::EBADF,
            Error::NotFound => libc::EIO,
            Error::LockHeld => libc::EWOULDBLOCK,
            Error::WriteDenied => libc::EACCES,
            Error::InvalidArgument => libc::EINVAL,
            Error::NoSuchProcess => libc::ESRCH,
            Error::NodeNotFound => libc::EIO,
            Error::FileTooLarge => libc::EFBIG,
            Error::NoSpace => libc::ENOSPC,
        }
    }
}
