//! Human readable views of the kernel state.

use std::fmt;

use crate::kernel::Kernel;

/// Lists every open file of the kernel.
pub struct OpenFileList<'a>(pub &'a Kernel);

impl fmt::Display for OpenFileList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== SYSTEM OPEN FILE TABLE ===")?;
        for (id, file) in self.0.open_files() {
            write!(
                f,
                " ofid={id} path={} inode={} mode={} off={} ref={}",
                file.path(),
                file.node_id(),
                file.mode(),
                file.offset,
                file.ref_count()
            )?;
            if let Some(pid) = file.locked_by {
                write!(f, " lock:{pid}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Lists the descriptor table of every process of the kernel.
pub struct DescriptorTables<'a>(pub &'a Kernel);

impl fmt::Display for DescriptorTables<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== PER-PROCESS FD TABLES ===")?;
        for process in self.0.processes() {
            let fds = process
                .descriptors()
                .map(|(fd, id)| format!("{fd}->ofid{id}"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, " pid={}  FDs: {{ {fds} }}", process.pid())?;
        }
        Ok(())
    }
}
