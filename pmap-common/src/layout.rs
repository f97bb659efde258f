//! Address-space layout groups
//!
//! Reports that draw the classic process layout (stack at the top, code at the
//! bottom) bucket segments into five fixed groups. Segments that fit none of
//! them (vDSO pages, inaccessible guard regions) are left out of the picture.

use crate::memory_map::MemoryMap;
use crate::segment::{Category, Segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutGroupKind {
    Stack,
    SharedLibraries,
    Heap,
    BssData,
    Code,
}

impl LayoutGroupKind {
    /// Groups from high to low memory.
    pub const ORDER: [LayoutGroupKind; 5] = [
        LayoutGroupKind::Stack,
        LayoutGroupKind::SharedLibraries,
        LayoutGroupKind::Heap,
        LayoutGroupKind::BssData,
        LayoutGroupKind::Code,
    ];

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            LayoutGroupKind::Stack => "Stack",
            LayoutGroupKind::SharedLibraries => "Shared Libraries",
            LayoutGroupKind::Heap => "Heap",
            LayoutGroupKind::BssData => "BSS / Data",
            LayoutGroupKind::Code => "Code (.text)",
        }
    }

    /// Compact title for fixed-width text boxes.
    #[must_use]
    pub fn short_title(&self) -> &'static str {
        match self {
            LayoutGroupKind::SharedLibraries => "Shared Libs",
            other => other.title(),
        }
    }

    fn admits(self, map: &MemoryMap, seg: &Segment) -> bool {
        match self {
            LayoutGroupKind::Stack => seg.category() == Category::Stack,
            LayoutGroupKind::SharedLibraries => map.is_shared_library(seg),
            LayoutGroupKind::Heap => seg.category() == Category::Heap,
            LayoutGroupKind::BssData => {
                matches!(
                    seg.category(),
                    Category::Data | Category::Anon | Category::Bss | Category::Rodata
                ) && !map.is_shared_library(seg)
            }
            LayoutGroupKind::Code => {
                seg.category() == Category::Code && !map.is_shared_library(seg)
            }
        }
    }
}

/// One layout bucket with its segments in file order.
#[derive(Debug, Clone)]
pub struct LayoutGroup<'a> {
    pub kind: LayoutGroupKind,
    pub segments: Vec<&'a Segment>,
}

/// Bucket the map into the five layout groups, always in [`LayoutGroupKind::ORDER`].
///
/// Groups may be empty. A shared library's writable data appears under
/// "Shared Libraries", not "BSS / Data".
#[must_use]
pub fn layout_groups(map: &MemoryMap) -> Vec<LayoutGroup<'_>> {
    LayoutGroupKind::ORDER
        .into_iter()
        .map(|kind| LayoutGroup {
            kind,
            segments: map.segments().iter().filter(|seg| kind.admits(map, seg)).collect(),
        })
        .collect()
}
