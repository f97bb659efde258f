//! Address-space pictures: the boxed segment overview and the ASCII layout
//!
//! ```text
//! High Memory
//!      ↑
//!      │
//! 0xff8c2000 ──┬─ rw-p  STACK    [stack] ← SP
//!              │
//! 0xff8a1000 ──┴─ (size: 135,168 bytes)
//!      │
//!      ↓
//! Low Memory
//! ```

use std::fmt::Write;

use pmap_common::layout::layout_groups;
use pmap_common::{CrashContext, MemoryMap, Segment};

use super::format::{centered, thousands};
use super::{banner, render, RULE};

const OVERVIEW_TITLE: &str = "SEGMENT OVERVIEW";

/// Box of the five layout groups, stack first; empty groups show `(n/a)`.
#[must_use]
pub fn overview(map: &MemoryMap) -> String {
    let groups = layout_groups(map);

    let sections: Vec<(&str, Vec<String>)> = groups
        .iter()
        .map(|group| {
            let lines = if group.segments.is_empty() {
                vec!["(n/a)".to_string()]
            } else {
                group.segments.iter().map(|seg| overview_line(seg)).collect()
            };
            (group.kind.short_title(), lines)
        })
        .collect();

    let width = sections
        .iter()
        .flat_map(|(title, lines)| std::iter::once(*title).chain(lines.iter().map(String::as_str)))
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
        .max(OVERVIEW_TITLE.len());
    let rule = "─".repeat(width + 2);

    render(|out| {
        writeln!(out)?;
        writeln!(out, "{}", centered(OVERVIEW_TITLE, RULE).trim_end())?;
        writeln!(out, "┌{rule}┐")?;
        for (i, (title, lines)) in sections.iter().enumerate() {
            if i > 0 {
                writeln!(out, "├{rule}┤")?;
            }
            writeln!(out, "│ {title:<width$} │")?;
            for line in lines {
                writeln!(out, "│ {line:<width$} │")?;
            }
        }
        writeln!(out, "└{rule}┘")?;
        writeln!(out)
    })
}

fn overview_line(seg: &Segment) -> String {
    format!(
        "0x{:08x}-0x{:08x}  {:<4} {:<6} {}",
        seg.start(),
        seg.end(),
        seg.perms(),
        seg.category(),
        seg.display_path()
    )
}

/// Segments from high to low memory (reverse file order) with register markers.
#[must_use]
pub fn ascii(map: &MemoryMap, ctx: Option<&CrashContext>) -> String {
    render(|out| {
        banner(out, "MEMORY LAYOUT - ASCII VISUALIZATION", RULE)?;
        writeln!(out)?;
        writeln!(out, "High Memory")?;
        writeln!(out, "     ↑")?;
        writeln!(out, "     │")?;

        for seg in map.segments().iter().rev() {
            let markers = ctx.map(|ctx| ctx.markers_for(map, seg)).unwrap_or_default();
            let marker_str = if markers.is_empty() {
                String::new()
            } else {
                format!(" ← {}", markers.join(" "))
            };

            writeln!(
                out,
                "0x{:08x} ──┬─ {:<5} {:<8} {}{marker_str}",
                seg.end(),
                seg.perms(),
                seg.category(),
                seg.display_path()
            )?;
            writeln!(out, "             │")?;
            writeln!(
                out,
                "0x{:08x} ──┴─ (size: {} bytes)",
                seg.start(),
                thousands(seg.size())
            )?;
            writeln!(out, "     │")?;
        }

        writeln!(out, "     ↓")?;
        writeln!(out, "Low Memory")?;
        writeln!(out)
    })
}
