//! Parsed process memory map and address resolution
//!
//! A [`MemoryMap`] owns the segments of one dump in file order (top to bottom as
//! dumped), together with the process identity recovered while parsing. It is
//! never mutated after construction; renderers only borrow it.

use indexmap::IndexMap;

use crate::segment::{Category, Segment};

/// Process memory map: ordered segments plus pid and process name.
///
/// `pid == 0` and an empty `process_name` mean "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryMap {
    pid: u32,
    process_name: String,
    segments: Vec<Segment>,
}

/// Aggregated count and size for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStats {
    pub category: Category,
    pub count: usize,
    pub size: u64,
}

/// Lowest start and highest end over all segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressSpan {
    pub low: u64,
    pub high: u64,
}

impl AddressSpan {
    #[must_use]
    pub fn range(&self) -> u64 {
        self.high - self.low
    }
}

impl MemoryMap {
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { pid: 0, process_name: String::new(), segments }
    }

    #[must_use]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    #[must_use]
    pub fn with_process_name(mut self, name: impl Into<String>) -> Self {
        self.process_name = name.into();
        self
    }

    #[must_use]
    pub fn pid(&self) -> u32 {
        self.pid
    }

    #[must_use]
    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of all segment sizes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.segments.iter().map(Segment::size).sum()
    }

    /// Find the segment containing `addr`.
    ///
    /// Linear scan in file order; with overlapping input the first segment in
    /// the file wins.
    #[must_use]
    pub fn find_segment(&self, addr: u64) -> Option<&Segment> {
        self.segments.iter().find(|seg| seg.contains(addr))
    }

    /// All segments whose pathname is exactly `binary`.
    #[must_use]
    pub fn segments_by_binary(&self, binary: &str) -> Vec<&Segment> {
        self.segments.iter().filter(|seg| seg.pathname() == binary).collect()
    }

    /// Segments keyed by display path, in order of first appearance.
    #[must_use]
    pub fn group_by_binary(&self) -> IndexMap<&str, Vec<&Segment>> {
        let mut groups: IndexMap<&str, Vec<&Segment>> = IndexMap::new();
        for seg in &self.segments {
            groups.entry(seg.display_path()).or_default().push(seg);
        }
        groups
    }

    /// Per-category totals for categories that occur, sorted by category name.
    #[must_use]
    pub fn category_stats(&self) -> Vec<CategoryStats> {
        let mut stats: Vec<CategoryStats> = Vec::new();
        for seg in &self.segments {
            if let Some(entry) = stats.iter_mut().find(|s| s.category == seg.category()) {
                entry.count += 1;
                entry.size += seg.size();
            } else {
                stats.push(CategoryStats { category: seg.category(), count: 1, size: seg.size() });
            }
        }
        stats.sort_by_key(|s| s.category.as_str());
        stats
    }

    /// Address span over all segments, `None` for an empty map.
    #[must_use]
    pub fn address_span(&self) -> Option<AddressSpan> {
        let low = self.segments.iter().map(Segment::start).min()?;
        let high = self.segments.iter().map(Segment::end).max()?;
        Some(AddressSpan { low, high })
    }

    /// Pathname of the main executable.
    ///
    /// The first absolute pathname whose final component equals the process
    /// name. `None` when the process name is unknown or nothing matches.
    #[must_use]
    pub fn main_binary_path(&self) -> Option<&str> {
        if self.process_name.is_empty() {
            return None;
        }
        self.segments
            .iter()
            .map(Segment::pathname)
            .filter(|path| path.starts_with('/'))
            .find(|path| path.rsplit('/').next() == Some(self.process_name.as_str()))
    }

    /// File-backed segment of a shared library rather than the main binary.
    #[must_use]
    pub fn is_shared_library(&self, seg: &Segment) -> bool {
        if !seg.is_file_backed() {
            return false;
        }
        if self.main_binary_path() == Some(seg.pathname()) {
            return false;
        }
        let path = seg.pathname();
        path.contains(".so") || path.contains("/lib/") || path.contains("/usr/lib/")
    }
}
