//! Parser for the `/proc/<pid>/maps` text format
//!
//! One record per line:
//!
//! ```text
//! <start>-<end> <perms> <offset> <major>:<minor> <inode> [pathname]
//! 0214f000-0218a000 rw-p 00000000 00:00 0          [heap]
//! ```
//!
//! Addresses, offset and device numbers are lowercase hex without a `0x`
//! prefix; the inode is decimal; the pathname runs to the end of the line and
//! may contain spaces.
//!
//! Lines starting with `#` are comments. A comment mentioning `/proc/<pid>/`
//! supplies the pid when the dump itself doesn't carry one; the first such
//! comment wins. Blank lines are skipped and lines that don't match the record
//! grammar are dropped, so a partially damaged dump still yields every good
//! record.

use log::{debug, warn};
use std::fs;
use std::path::Path;

use crate::errors::FormatError;
use crate::memory_map::MemoryMap;
use crate::segment::{Perms, Segment};

/// Parse a complete map dump.
///
/// Never fails: malformed records are logged at debug level and skipped.
/// The process name is guessed from the first segment's pathname.
#[must_use]
pub fn parse(text: &str) -> MemoryMap {
    let mut pid = None;
    let mut segments = Vec::new();
    let mut dropped = 0usize;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('#') {
            if pid.is_none() {
                pid = pid_from_comment(line);
            }
            continue;
        }

        match parse_line(line) {
            Some(segment) => segments.push(segment),
            None => {
                dropped += 1;
                debug!("Skipping malformed maps record at line {}: {line:?}", index + 1);
            }
        }
    }

    let process_name = segments.first().map(|seg| basename(seg.pathname())).unwrap_or_default();

    debug!(
        "Parsed {} segments ({dropped} malformed lines dropped), pid {}, process {process_name:?}",
        segments.len(),
        pid.unwrap_or(0)
    );

    MemoryMap::new(segments).with_pid(pid.unwrap_or(0)).with_process_name(process_name)
}

/// Parse a single maps record.
///
/// Returns `None` when the line doesn't follow the record grammar or the
/// range is empty or inverted.
#[must_use]
pub fn parse_line(line: &str) -> Option<Segment> {
    let mut rest = line.trim();

    let (start, end) = next_field(&mut rest)?.split_once('-')?;
    let start = parse_hex(start)?;
    let end = parse_hex(end)?;

    let perms: Perms = next_field(&mut rest)?.parse().ok()?;
    let offset = parse_hex(next_field(&mut rest)?)?;

    let (major, minor) = next_field(&mut rest)?.split_once(':')?;
    let major = u32::try_from(parse_hex(major)?).ok()?;
    let minor = u32::try_from(parse_hex(minor)?).ok()?;

    let inode = parse_decimal(next_field(&mut rest)?)?;
    let pathname = rest.trim();

    Some(
        Segment::new(start, end, perms, pathname)?
            .with_file_offset(offset)
            .with_device(major, minor)
            .with_inode(inode),
    )
}

/// Extract the pid from the first `/proc/<digits>/` in a comment line.
#[must_use]
pub fn pid_from_comment(line: &str) -> Option<u32> {
    const MARKER: &str = "/proc/";

    line.match_indices(MARKER).find_map(|(pos, _)| {
        let tail = &line[pos + MARKER.len()..];
        let digits_len = tail.bytes().take_while(u8::is_ascii_digit).count();
        if digits_len == 0 || tail.as_bytes().get(digits_len) != Some(&b'/') {
            return None;
        }
        tail[..digits_len].parse().ok()
    })
}

/// Read and parse a map dump from disk.
///
/// # Errors
/// Returns [`FormatError::SourceUnavailable`] if the file cannot be read.
pub fn parse_file(path: impl AsRef<Path>) -> Result<MemoryMap, FormatError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| FormatError::unavailable(path, e))?;
    Ok(parse(&String::from_utf8_lossy(&bytes)))
}

/// Parse a map dump together with a process identity file (`comm` format).
///
/// The identity file is optional: if it is missing, unreadable or empty the
/// name guessed from the first segment is kept.
///
/// # Errors
/// Returns [`FormatError::SourceUnavailable`] if the maps file cannot be read.
pub fn parse_files(
    maps_path: impl AsRef<Path>,
    comm_path: impl AsRef<Path>,
) -> Result<MemoryMap, FormatError> {
    let map = parse_file(maps_path)?;
    let comm_path = comm_path.as_ref();

    match read_comm(comm_path) {
        Ok(Some(name)) => Ok(map.with_process_name(name)),
        Ok(None) => {
            warn!(
                "{} is empty, keeping process name {:?}",
                comm_path.display(),
                map.process_name()
            );
            Ok(map)
        }
        Err(e) => {
            warn!("Failed to read {}: {e}", comm_path.display());
            Ok(map)
        }
    }
}

/// Parse the live map of a running process from `/proc/<pid>/maps` and
/// `/proc/<pid>/comm`.
///
/// # Errors
/// Returns [`FormatError::SourceUnavailable`] if `/proc/<pid>/maps` cannot be read.
pub fn parse_process(pid: u32) -> Result<MemoryMap, FormatError> {
    let maps_path = format!("/proc/{pid}/maps");
    let comm_path = format!("/proc/{pid}/comm");
    Ok(parse_files(maps_path, comm_path)?.with_pid(pid))
}

fn read_comm(path: &Path) -> std::io::Result<Option<String>> {
    let bytes = fs::read(path)?;
    let name = String::from_utf8_lossy(&bytes).trim().to_string();
    Ok(if name.is_empty() { None } else { Some(name) })
}

/// Split off the next whitespace-delimited field.
fn next_field<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let trimmed = rest.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (field, tail) = trimmed.split_at(end);
    *rest = tail;
    Some(field)
}

fn parse_hex(s: &str) -> Option<u64> {
    let lower_hex = |b: u8| b.is_ascii_digit() || (b'a'..=b'f').contains(&b);
    if s.is_empty() || !s.bytes().all(lower_hex) {
        return None;
    }
    u64::from_str_radix(s, 16).ok()
}

fn parse_decimal(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn basename(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Category;

    #[test]
    fn test_parse_line_code_segment() {
        let seg = parse_line("0098b000-0098c000 r-xp 00000000 b3:04 6081  /usr/bin/amxrt")
            .expect("valid record");
        assert_eq!(seg.start(), 0x0098_b000);
        assert_eq!(seg.end(), 0x0098_c000);
        assert_eq!(seg.size(), 0x1000);
        assert_eq!(seg.perms().as_str(), "r-xp");
        assert_eq!((seg.dev_major(), seg.dev_minor()), (0xb3, 0x04));
        assert_eq!(seg.inode(), 6081);
        assert_eq!(seg.pathname(), "/usr/bin/amxrt");
        assert_eq!(seg.category(), Category::Code);
    }

    #[test]
    fn test_parse_line_heap() {
        let seg = parse_line("0214f000-0218a000 rw-p 00000000 00:00 0    [heap]").unwrap();
        assert_eq!(seg.pathname(), "[heap]");
        assert_eq!(seg.category(), Category::Heap);
    }

    #[test]
    fn test_parse_line_anonymous_and_offset() {
        let seg = parse_line("7f0000000000-7f0000021000 rw-p 0001c000 00:00 0").unwrap();
        assert_eq!(seg.pathname(), "");
        assert_eq!(seg.offset(), 0x1c000);
        assert_eq!(seg.category(), Category::Anon);
    }

    #[test]
    fn test_parse_line_pathname_with_spaces() {
        let seg =
            parse_line("7f1000-7f2000 r--p 00000000 08:01 42   /tmp/my file (deleted)  ").unwrap();
        assert_eq!(seg.pathname(), "/tmp/my file (deleted)");
    }

    #[test]
    fn test_parse_line_shared_mapping() {
        let seg = parse_line("7f1000-7f2000 rw-s 00000000 00:05 1234 /dev/zero").unwrap();
        assert!(seg.perms().is_shared());
        assert_eq!(seg.category(), Category::Data);
    }

    #[test]
    fn test_parse_line_rejects_malformed() {
        let bad = [
            "",
            "garbage",
            "1000-2000",
            "1000-2000 r-xp",
            "1000 r-xp 00000000 00:00 0",
            "1000-2000 r-x 00000000 00:00 0",
            "1000-2000 r-xp zz 00:00 0",
            "1000-2000 r-xp 00000000 0000 0",
            "1000-2000 r-xp 00000000 00:00 abc",
            "0x1000-0x2000 r-xp 00000000 00:00 0",
            "1000-2000 r-xp 00000000 00:00",
            "ABCD-EF00 r-xp 00000000 00:00 0",
            "2000-1000 r-xp 00000000 00:00 0",
            "2000-2000 r-xp 00000000 00:00 0",
        ];
        for line in bad {
            assert!(parse_line(line).is_none(), "{line:?} should be rejected");
        }
    }

    #[test]
    fn test_pid_from_comment() {
        assert_eq!(pid_from_comment("# cat /proc/1234/maps"), Some(1234));
        assert_eq!(pid_from_comment("# /proc/self/maps then /proc/77/maps"), Some(77));
        assert_eq!(pid_from_comment("# /proc/1234"), None);
        assert_eq!(pid_from_comment("# no pid here"), None);
    }

    #[test]
    fn test_parse_first_comment_pid_wins() {
        let text = "\
# dump of /proc/111/maps
# copied from /proc/222/maps
00400000-00401000 r-xp 00000000 08:01 10 /usr/bin/app
";
        let map = parse(text);
        assert_eq!(map.pid(), 111);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_parse_skips_blank_and_malformed_lines() {
        let text = "\n\n00400000-00401000 r-xp 00000000 08:01 10 /usr/bin/app
this line is not a record

00600000-00601000 rw-p 00000000 08:01 10 /usr/bin/app
";
        let map = parse(text);
        assert_eq!(map.len(), 2);
        assert_eq!(map.pid(), 0);
        assert_eq!(map.total_size(), 0x2000);
    }

    #[test]
    fn test_parse_preserves_file_order() {
        let text = "\
7ffd0000-7ffe0000 rw-p 00000000 00:00 0 [stack]
00400000-00401000 r-xp 00000000 08:01 10 /usr/bin/app
";
        let starts: Vec<u64> = parse(text).segments().iter().map(Segment::start).collect();
        assert_eq!(starts, [0x7ffd_0000, 0x0040_0000]);
    }

    #[test]
    fn test_process_name_from_first_segment() {
        let map = parse("00400000-00401000 r-xp 00000000 08:01 10 /usr/bin/amxrt\n");
        assert_eq!(map.process_name(), "amxrt");

        let map = parse("00400000-00401000 r-xp 00000000 08:01 10 busybox\n");
        assert_eq!(map.process_name(), "busybox");

        let map = parse("00400000-00401000 rw-p 00000000 00:00 0\n");
        assert_eq!(map.process_name(), "");
    }

    #[test]
    fn test_parse_empty_input() {
        let map = parse("# only a comment\n\n");
        assert!(map.is_empty());
        assert_eq!(map.total_size(), 0);
        assert_eq!(map.process_name(), "");
    }

    #[test]
    fn test_parse_file_missing() {
        let err = parse_file("/nonexistent/pmap/maps.txt").unwrap_err();
        assert_eq!(err.io_kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_parse_process_self() {
        // /proc is only available on Linux hosts
        if !Path::new("/proc/self/maps").exists() {
            return;
        }
        let pid = std::process::id();
        let map = parse_process(pid).expect("own maps are readable");
        assert_eq!(map.pid(), pid);
        assert!(!map.is_empty());
        assert!(!map.process_name().is_empty());
    }
}
