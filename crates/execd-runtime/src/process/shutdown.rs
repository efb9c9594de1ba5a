//! Process-group termination.

use std::io;

/// SIGKILL the entire process group of `native_pid`.
///
/// Supervised commands are spawned as group leaders, so signalling the group
/// reaches their descendants too; killing only the direct child would leave
/// orphaned grandchildren running.
#[cfg(unix)]
pub(crate) fn kill_group(native_pid: i32) -> io::Result<()> {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    killpg(Pid::from_raw(native_pid), Signal::SIGKILL).map_err(io::Error::from)
}

#[cfg(not(unix))]
pub(crate) fn kill_group(_native_pid: i32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "process-group termination requires unix",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn unknown_group_reports_no_such_process() {
        // Pid numbers near i32::MAX are not in use on any sane system.
        let err = kill_group(i32::MAX - 1).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc_esrch()));
    }

    #[cfg(unix)]
    fn libc_esrch() -> i32 {
        nix::errno::Errno::ESRCH as i32
    }
}
