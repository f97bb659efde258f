//! Segment classification from permissions and pathname.
//!
//! The maps format carries no ELF section information, so the category of a
//! region is inferred from two signals: the bracketed pseudo-name the kernel
//! gives special regions, and the permission bits.
//!
//! # Classification Strategy
//!
//! The rules form an ordered decision list and the first match wins:
//!
//! 1. **Pseudo-names** - `[heap]`, `[stack]`, `[vdso]`/`[sigpage]`/`[vectors]`
//! 2. **Executable bit** - any `x` mapping is code, whatever backs it
//! 3. **Read-only** - readable and not writable
//! 4. **Writable** - anonymous vs file-backed
//!
//! A `[heap]` mapping with `rwxp` therefore classifies as HEAP, never CODE.

use crate::segment::{Category, Perms};

/// Pseudo-paths of kernel-provided code pages (vDSO and the ARM vector pages).
pub const PSEUDO_VDSO_NAMES: &[&str] = &["[vdso]", "[sigpage]", "[vectors]"];

/// Classify a mapping by its permission word and pathname.
///
/// # Examples
///
/// ```ignore
/// classify("r-xp".parse()?, "/usr/bin/amxrt");  // → Category::Code
/// classify("rw-p".parse()?, "[heap]");          // → Category::Heap
/// classify("rw-p".parse()?, "");                // → Category::Anon
/// ```
#[must_use]
pub fn classify(perms: Perms, pathname: &str) -> Category {
    // === PSEUDO-NAME CLASSIFICATION ===
    if pathname == "[heap]" {
        return Category::Heap;
    }
    if pathname == "[stack]" {
        return Category::Stack;
    }
    if PSEUDO_VDSO_NAMES.contains(&pathname) {
        return Category::Vdso;
    }

    // === PERMISSION CLASSIFICATION ===
    if perms.is_executable() {
        return Category::Code;
    }
    if perms.is_readable() && !perms.is_writable() {
        return Category::Rodata;
    }
    if perms.is_writable() {
        // .data and .bss both land here
        return if pathname.is_empty() { Category::Anon } else { Category::Data };
    }

    Category::Unknown
}
