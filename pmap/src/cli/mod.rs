//! Command-line front end shared by `pmap` and `pmap2html`

pub mod args;

pub use args::{parse_address, Args, CrashArgs, HtmlArgs, TextReport};

use anyhow::{Context, Result};
use log::info;
use std::io::{self, Write};
use std::path::Path;

use pmap_common::{CrashContext, MemoryMap};

use crate::export::write_report;
use crate::report::{self, HtmlReport};

// Exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_NOPERM: i32 = 77;

/// Map an error chain to a process exit code.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    let denied = err
        .chain()
        .filter_map(|e| e.downcast_ref::<io::Error>())
        .any(|e| e.kind() == io::ErrorKind::PermissionDenied);
    if denied {
        EXIT_NOPERM
    } else if format!("{err:#}").to_lowercase().contains("missing required argument") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

/// Render one text report.
#[must_use]
pub fn render_text(which: TextReport, map: &MemoryMap, ctx: &CrashContext) -> String {
    match which {
        TextReport::Table => report::table(map),
        TextReport::Stats => report::stats(map),
        TextReport::Grouped => report::grouped(map),
        TextReport::Segments => report::overview(map),
        TextReport::Ascii => report::ascii(map, Some(ctx)),
        TextReport::Crash => report::crash(map, ctx),
        TextReport::Security => report::security(map),
    }
}

/// Write rendered reports to `out`, stopping quietly if the reader goes away.
///
/// # Errors
/// Fails on any write error other than a broken pipe.
pub fn emit<W: Write>(mut out: W, texts: impl IntoIterator<Item = String>) -> Result<()> {
    let result = texts
        .into_iter()
        .try_for_each(|text| out.write_all(text.as_bytes()))
        .and_then(|()| out.flush());

    match result {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("Failed to write to stdout"),
    }
}

/// Render the HTML report and save it to `path`.
///
/// # Errors
/// Fails for an empty map or when the file can't be written.
pub fn save_html(map: &MemoryMap, ctx: &CrashContext, path: &Path, quiet: bool) -> Result<()> {
    let html = HtmlReport::new(map).with_crash_context(ctx).render()?;
    write_report(path, &html)?;
    info!("Wrote {} bytes of HTML to {}", html.len(), path.display());

    if !quiet {
        let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        println!("\n✓ HTML visualization saved to: {}", path.display());
        println!("  Open in browser: file://{}\n", absolute.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmap_common::parse;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_exit_codes() {
        let denied = anyhow::Error::new(io::Error::from(io::ErrorKind::PermissionDenied))
            .context("Failed to read /proc/1/maps");
        assert_eq!(exit_code_for(&denied), EXIT_NOPERM);
        assert_eq!(exit_code_for(&anyhow::anyhow!("Missing required argument: x")), EXIT_USAGE);
        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), EXIT_ERROR);
    }

    #[test]
    fn test_exit_code_uses_error_kind_not_text() {
        let not_found = crate::preflight::check_proc_access(999_999_999).unwrap_err();
        assert_eq!(exit_code_for(&not_found), EXIT_ERROR);

        let wrapped = anyhow::Error::new(pmap_common::FormatError::SourceUnavailable {
            path: "/proc/1/maps".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        });
        assert_eq!(exit_code_for(&wrapped), EXIT_NOPERM);
        assert_eq!(exit_code_for(&anyhow::anyhow!("permission denied")), EXIT_ERROR);
    }

    #[test]
    fn test_emit_ignores_broken_pipe() {
        assert!(emit(ClosedPipe, vec!["report".to_string()]).is_ok());
    }

    #[test]
    fn test_emit_concatenates() {
        let mut buffer = Vec::new();
        emit(&mut buffer, vec!["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(buffer, b"ab");
    }

    #[test]
    fn test_render_text_dispatch() {
        let map = parse("00400000-00401000 r-xp 00000000 08:01 1 /usr/bin/app\n");
        let ctx = CrashContext::new();
        assert!(render_text(TextReport::Table, &map, &ctx).contains("TABULAR VIEW"));
        assert!(render_text(TextReport::Segments, &map, &ctx).contains("SEGMENT OVERVIEW"));
        assert!(render_text(TextReport::Security, &map, &ctx).contains("SECURITY ANALYSIS"));
    }

    #[test]
    fn test_save_html_empty_map_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.html");
        let err = save_html(&MemoryMap::default(), &CrashContext::new(), &path, true).unwrap_err();
        assert!(err.to_string().contains("No memory segments to visualize"));
        assert!(!path.exists());
    }
}
