//! Pre-flight checks for live mode
//!
//! Validates that the target process can be inspected before reading its
//! maps. Provides clear, actionable error messages when it can't.

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Run all pre-flight checks for `--pid` mode
pub fn run_preflight_checks(pid: u32) -> Result<()> {
    check_proc_mounted()?;
    check_process_exists(pid)?;
    check_proc_access(pid)?;
    Ok(())
}

/// Check that procfs is available
fn check_proc_mounted() -> Result<()> {
    if !Path::new("/proc/self/maps").exists() {
        bail!(
            "/proc is not mounted or not a Linux procfs.\n\n\
             Live mode needs /proc/<pid>/maps. Capture a dump on the target and run:\n  \
             pmap <maps-file>"
        );
    }
    Ok(())
}

/// Check if the target process exists
pub fn check_process_exists(pid: u32) -> Result<()> {
    let proc_path = format!("/proc/{pid}");
    if pid == 0 || !Path::new(&proc_path).exists() {
        bail!(
            "Process {pid} not found.\n\n\
             Is the process still running? Check with: ps -p {pid}"
        );
    }
    Ok(())
}

/// Check if we can read the process's memory maps
pub fn check_proc_access(pid: u32) -> Result<()> {
    let maps_path = format!("/proc/{pid}/maps");
    std::fs::File::open(&maps_path).with_context(|| {
        format!(
            "Cannot read {maps_path}\n\n\
             This usually means:\n\
             - The process doesn't exist (check: ps -p {pid})\n\
             - Permission denied (run as the process owner or with sudo)\n\
             - /proc is not mounted"
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_not_found() {
        let result = check_process_exists(999_999_999);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("not found"));
    }

    #[test]
    fn test_pid_zero_rejected() {
        assert!(check_process_exists(0).is_err());
    }

    #[test]
    fn test_own_process_passes() {
        if !Path::new("/proc/self/maps").exists() {
            return;
        }
        let pid = std::process::id();
        assert!(run_preflight_checks(pid).is_ok());
    }

    #[test]
    fn test_proc_access_missing_process() {
        let err = check_proc_access(999_999_999).unwrap_err();
        assert!(format!("{err:#}").contains("Cannot read /proc/999999999/maps"));
    }
}
