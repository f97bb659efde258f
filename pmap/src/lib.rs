//! # pmap - Process Memory Map Reports
//!
//! Front end over `pmap-common`: renders a parsed `/proc/<pid>/maps` dump as
//! text reports, a self-contained HTML page or JSON, optionally annotated
//! with a crash register context.
//!
//! ```text
//!   MAPS_FILE / --pid ──► pmap_common::parse* ──► MemoryMap
//!   --pc --lr --sp --fp                              │
//!   --bt, --regs      ──► cli::CrashArgs ──► CrashContext
//!                                                    │
//!                         ┌──────────────────────────┼─────────────────┐
//!                         ▼                          ▼                 ▼
//!                  report::{table, ...}      report::HtmlReport   export::json
//!                     (stdout)               (export::write_report)
//! ```
//!
//! ## Modules
//!
//! - [`cli`]: argument definitions, report selection, exit codes
//! - [`report`]: pure renderers returning `String`
//! - [`export`]: file output (HTML/text via `write_report`, JSON)
//! - [`preflight`]: live-mode checks with actionable errors
//! - [`domain`]: report errors
//!
//! ## Typical Usage
//!
//! ```bash
//! # Everything, from a saved dump
//! pmap crash_dump_1523.maps
//!
//! # Where did it crash?
//! pmap crash_dump_1523.maps --pc 0xf79e245c --sp 0xff8c1000
//!
//! # Shareable report
//! pmap2html crash_dump_1523.maps --regs crash_dump_1523.regs --html crash.html
//! ```

pub mod cli;
pub mod domain;
pub mod export;
pub mod preflight;
pub mod report;
