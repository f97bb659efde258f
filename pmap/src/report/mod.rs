//! Report rendering
//!
//! Every renderer is a pure function of the parsed map (and crash context
//! where markers are drawn) returning the finished text. Nothing here prints
//! or touches the filesystem; the CLI decides where output goes.
//!
//! | Renderer           | Flag          | Width |
//! |--------------------|---------------|-------|
//! | [`table`]          | `--table`     | 130   |
//! | [`stats`]          | `--stats`     | 90    |
//! | [`grouped`]        | `--grouped`   | 90    |
//! | [`overview`]       | `--segments`  | fit   |
//! | [`ascii`]          | `--ascii`     | 90    |
//! | [`crash`]          | `--pc` etc.   | 90    |
//! | [`security`]       | `--security`  | 90    |
//! | [`HtmlReport`]     | `--html`      | page  |

pub mod crash;
pub mod format;
pub mod html;
pub mod layout;
pub mod tables;
pub mod theme;

pub use crash::{crash, security};
pub use html::HtmlReport;
pub use layout::{ascii, overview};
pub use tables::{grouped, stats, table};

use pmap_common::MemoryMap;
use std::fmt::{self, Write};

const RULE_WIDE: usize = 130;
const RULE: usize = 90;

/// Run a writer against a fresh `String`.
fn render(f: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    // fmt::Write for String never fails
    let _ = f(&mut out);
    out
}

/// Blank line, `=` rule, centred title, `=` rule.
fn banner(out: &mut String, title: &str, width: usize) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(width))?;
    writeln!(out, "{}", format::centered(title, width).trim_end())?;
    writeln!(out, "{}", "=".repeat(width))
}

fn process_label(map: &MemoryMap) -> &str {
    if map.process_name().is_empty() {
        "Unknown"
    } else {
        map.process_name()
    }
}

fn pid_label(map: &MemoryMap) -> String {
    if map.pid() == 0 {
        "N/A".to_string()
    } else {
        map.pid().to_string()
    }
}
