//! Memory segment model
//!
//! A [`Segment`] is one line of a `/proc/<pid>/maps` dump: a half-open virtual
//! address range `[start, end)` with uniform permissions, plus the backing file
//! identity (offset, device, inode, pathname). Each segment carries exactly one
//! [`Category`], computed once by [`crate::classification::classify`] when the
//! segment is built.
//!
//! ```text
//! 0098b000-0098c000 r-xp 00000000 b3:04 6081   /usr/bin/amxrt
//! └─start─┘└─end──┘ perm  offset  dev   inode  pathname
//! ```

use std::fmt;
use std::str::FromStr;

use crate::classification::classify;
use crate::errors::PermsError;

/// Display name used for mappings without a pathname.
pub const ANON_DISPLAY_NAME: &str = "[anon]";

// =============================================================================
// PERMISSIONS
// =============================================================================

/// The 4-character permission word, e.g. `r-xp`.
///
/// Validated on construction: position 0 is `r`/`-`, 1 is `w`/`-`, 2 is `x`/`-`
/// and 3 is `p` (private) or `s` (shared).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Perms([u8; 4]);

impl Perms {
    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.0[0] == b'r'
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.0[1] == b'w'
    }

    #[must_use]
    pub fn is_executable(&self) -> bool {
        self.0[2] == b'x'
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        self.0[3] == b'p'
    }

    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.0[3] == b's'
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only ASCII bytes pass validation in `from_str`.
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl FromStr for Perms {
    type Err = PermsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| PermsError(s.to_string()))?;

        let valid = matches!(bytes[0], b'r' | b'-')
            && matches!(bytes[1], b'w' | b'-')
            && matches!(bytes[2], b'x' | b'-')
            && matches!(bytes[3], b'p' | b's');

        if valid {
            Ok(Self(bytes))
        } else {
            Err(PermsError(s.to_string()))
        }
    }
}

impl fmt::Display for Perms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Perms {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// =============================================================================
// CATEGORY
// =============================================================================

/// Semantic purpose of a mapped region.
///
/// `Bss` exists for report completeness; the maps format carries no section
/// boundaries, so the classifier folds `.bss` into [`Category::Data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "UPPERCASE"))]
pub enum Category {
    Code,
    Data,
    Rodata,
    Bss,
    Heap,
    Stack,
    Anon,
    Vdso,
    Unknown,
}

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Category; 9] = [
        Category::Code,
        Category::Data,
        Category::Rodata,
        Category::Bss,
        Category::Heap,
        Category::Stack,
        Category::Anon,
        Category::Vdso,
        Category::Unknown,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Code => "CODE",
            Category::Data => "DATA",
            Category::Rodata => "RODATA",
            Category::Bss => "BSS",
            Category::Heap => "HEAP",
            Category::Stack => "STACK",
            Category::Anon => "ANON",
            Category::Vdso => "VDSO",
            Category::Unknown => "UNKNOWN",
        }
    }

    /// One-line legend text for reports.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Category::Code => "Executable code (.text section)",
            Category::Data => "Initialized data (.data section)",
            Category::Rodata => "Read-only data (.rodata section)",
            Category::Bss => "Uninitialized data (.bss section)",
            Category::Heap => "Dynamic memory allocation area",
            Category::Stack => "Thread stack (local variables)",
            Category::Anon => "Anonymous memory mapping",
            Category::Vdso => "Virtual dynamic shared object",
            Category::Unknown => "Unknown or special segment",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// =============================================================================
// SEGMENT
// =============================================================================

/// One mapped region of a process address space.
///
/// Immutable once built; the category always matches `(perms, pathname)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    start: u64,
    end: u64,
    perms: Perms,
    offset: u64,
    dev_major: u32,
    dev_minor: u32,
    inode: u64,
    pathname: String,
    category: Category,
}

impl Segment {
    /// Build a segment covering `[start, end)`.
    ///
    /// Returns `None` unless `start < end`.
    #[must_use]
    pub fn new(start: u64, end: u64, perms: Perms, pathname: impl Into<String>) -> Option<Self> {
        if start >= end {
            return None;
        }
        let pathname = pathname.into();
        let category = classify(perms, &pathname);
        Some(Self {
            start,
            end,
            perms,
            offset: 0,
            dev_major: 0,
            dev_minor: 0,
            inode: 0,
            pathname,
            category,
        })
    }

    /// Set the offset of the mapping within its backing file.
    #[must_use]
    pub fn with_file_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_device(mut self, major: u32, minor: u32) -> Self {
        self.dev_major = major;
        self.dev_minor = minor;
        self
    }

    #[must_use]
    pub fn with_inode(mut self, inode: u64) -> Self {
        self.inode = inode;
        self
    }

    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    #[must_use]
    pub fn perms(&self) -> Perms {
        self.perms
    }

    /// Offset of the mapping within the backing file.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn dev_major(&self) -> u32 {
        self.dev_major
    }

    #[must_use]
    pub fn dev_minor(&self) -> u32 {
        self.dev_minor
    }

    #[must_use]
    pub fn inode(&self) -> u64 {
        self.inode
    }

    /// Raw pathname, empty for anonymous mappings.
    #[must_use]
    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Pathname, or `[anon]` when the mapping has none.
    #[must_use]
    pub fn display_path(&self) -> &str {
        if self.pathname.is_empty() {
            ANON_DISPLAY_NAME
        } else {
            &self.pathname
        }
    }

    /// Kernel-synthesized region such as `[heap]` or `[vdso]`.
    #[must_use]
    pub fn is_pseudo(&self) -> bool {
        self.pathname.starts_with('[')
    }

    /// Backed by a real file that an external symbolizer could open.
    #[must_use]
    pub fn is_file_backed(&self) -> bool {
        !self.pathname.is_empty() && !self.is_pseudo()
    }

    /// Half-open containment: `start <= addr < end`.
    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end
    }

    #[must_use]
    pub fn is_writable_executable(&self) -> bool {
        self.perms.is_writable() && self.perms.is_executable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms(s: &str) -> Perms {
        s.parse().expect("valid perms")
    }

    #[test]
    fn test_perms_predicates() {
        let rwxp = perms("rwxp");
        assert!(rwxp.is_readable());
        assert!(rwxp.is_writable());
        assert!(rwxp.is_executable());
        assert!(rwxp.is_private());
        assert!(!rwxp.is_shared());

        let shared = perms("r--s");
        assert!(shared.is_readable());
        assert!(!shared.is_writable());
        assert!(!shared.is_executable());
        assert!(!shared.is_private());
        assert!(shared.is_shared());
    }

    #[test]
    fn test_perms_rejects_bad_words() {
        for bad in ["", "rwx", "rwxpp", "xwrp", "rw-q", "RWXP", "r-x-"] {
            assert!(bad.parse::<Perms>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_perms_display_round_trips_text() {
        assert_eq!(perms("r-xp").to_string(), "r-xp");
        assert_eq!(format!("{:<6}|", perms("---p")), "---p  |");
    }

    #[test]
    fn test_segment_requires_non_empty_range() {
        assert!(Segment::new(0x2000, 0x2000, perms("r--p"), "").is_none());
        assert!(Segment::new(0x3000, 0x2000, perms("r--p"), "").is_none());
        assert!(Segment::new(0x1000, 0x2000, perms("r--p"), "").is_some());
    }

    #[test]
    fn test_segment_size_and_containment() {
        let seg = Segment::new(0x1000, 0x3000, perms("r-xp"), "/bin/test").unwrap();
        assert_eq!(seg.size(), 0x2000);
        assert!(seg.contains(0x1000));
        assert!(seg.contains(0x2fff));
        assert!(!seg.contains(0x3000));
        assert!(!seg.contains(0x0fff));
    }

    #[test]
    fn test_segment_path_kinds() {
        let anon = Segment::new(0x1000, 0x2000, perms("rw-p"), "").unwrap();
        assert_eq!(anon.display_path(), "[anon]");
        assert!(!anon.is_file_backed());
        assert!(!anon.is_pseudo());

        let heap = Segment::new(0x1000, 0x2000, perms("rw-p"), "[heap]").unwrap();
        assert!(heap.is_pseudo());
        assert!(!heap.is_file_backed());

        let lib = Segment::new(0x1000, 0x2000, perms("r-xp"), "/lib/libc.so.6").unwrap();
        assert!(lib.is_file_backed());
        assert_eq!(lib.display_path(), "/lib/libc.so.6");
    }

    #[test]
    fn test_segment_builders_keep_category() {
        let seg = Segment::new(0x1000, 0x2000, perms("r-xp"), "/usr/bin/amxrt")
            .unwrap()
            .with_file_offset(0x4000)
            .with_device(0xb3, 0x04)
            .with_inode(6081);
        assert_eq!(seg.category(), Category::Code);
        assert_eq!(seg.offset(), 0x4000);
        assert_eq!((seg.dev_major(), seg.dev_minor()), (0xb3, 0x04));
        assert_eq!(seg.inode(), 6081);
    }

    #[test]
    fn test_category_literals() {
        let names: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
        assert_eq!(
            names,
            ["CODE", "DATA", "RODATA", "BSS", "HEAP", "STACK", "ANON", "VDSO", "UNKNOWN"]
        );
    }
}
