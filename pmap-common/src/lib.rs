//! # Process Memory Map Engine
//!
//! Parses Linux `/proc/<pid>/maps` dumps, classifies every mapped region and
//! resolves crash addresses against the result. All report front ends
//! (`pmap`, `pmap2html`) consume the types defined here; none of them parse or
//! classify on their own.
//!
//! ## Pipeline
//!
//! ```text
//!   maps text ──► parser ──► MemoryMap (Segments, each with a Category)
//!                                │
//!   CrashContext ───────────────►├──► analysis::analyze_crash  (per register)
//!   (regs dump / CLI)            ├──► analysis::security_sweep (map-wide)
//!                                └──► layout::layout_groups    (report layout)
//! ```
//!
//! ## Key Types
//!
//! - [`Segment`] - one mapped region, immutable after parsing
//! - [`Category`] - CODE, DATA, RODATA, BSS, HEAP, STACK, ANON, VDSO, UNKNOWN
//! - [`MemoryMap`] - ordered segments plus pid and process name
//! - [`CrashContext`] / [`CrashLocation`] - register values and their resolution
//!
//! ## Features
//!
//! - `serde` - `Serialize` for `Perms`, `Category` and `Register`, used by the JSON export

pub mod analysis;
pub mod classification;
pub mod crash;
pub mod errors;
pub mod layout;
pub mod memory_map;
pub mod parser;
pub mod registers;
pub mod segment;

pub use analysis::{analyze_crash, security_sweep, CrashAnalysis, Finding, Severity};
pub use classification::classify;
pub use crash::{CrashContext, CrashLocation, DebugCommand, Register};
pub use errors::{FormatError, PermsError};
pub use memory_map::{AddressSpan, CategoryStats, MemoryMap};
pub use parser::{parse, parse_file, parse_files, parse_line, parse_process};
pub use segment::{Category, Perms, Segment};
