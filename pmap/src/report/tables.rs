//! Tabular, grouped and statistics views

use std::fmt::Write;

use pmap_common::MemoryMap;

use super::format::{mib, percentage, thousands};
use super::{banner, pid_label, process_label, render, RULE, RULE_WIDE};

/// One row per segment in file order.
#[must_use]
pub fn table(map: &MemoryMap) -> String {
    render(|out| {
        banner(out, "MEMORY MAP - TABULAR VIEW", RULE_WIDE)?;
        writeln!(
            out,
            "Process: {:<20} PID: {:<10} Segments: {:<5} Total Size: {} bytes",
            process_label(map),
            pid_label(map),
            map.len(),
            thousands(map.total_size())
        )?;
        writeln!(out, "{}", "=".repeat(RULE_WIDE))?;
        writeln!(
            out,
            "{:<14} {:<14} {:<12} {:<6} {:<10} {}",
            "Start Addr", "End Addr", "Size", "Perms", "Type", "Binary/Mapping"
        )?;
        writeln!(out, "{}", "-".repeat(RULE_WIDE))?;

        for seg in map.segments() {
            writeln!(
                out,
                "0x{:08x}     0x{:08x}     {:>10}  {:<6} {:<10} {}",
                seg.start(),
                seg.end(),
                seg.size(),
                seg.perms(),
                seg.category(),
                seg.display_path()
            )?;
        }

        writeln!(out, "{}", "=".repeat(RULE_WIDE))?;
        writeln!(out)
    })
}

/// Per-category totals sorted by category name, then a TOTAL row.
#[must_use]
pub fn stats(map: &MemoryMap) -> String {
    let total = map.total_size();
    render(|out| {
        banner(out, "MEMORY STATISTICS", RULE)?;
        writeln!(out)?;
        writeln!(
            out,
            "{:<15} {:<8} {:<21} {:<12} {}",
            "Segment Type", "Count", "Total Size", "Size (MB)", "Percentage"
        )?;
        writeln!(out, "{}", "-".repeat(RULE))?;

        for entry in map.category_stats() {
            writeln!(
                out,
                "{:<15} {:<8} {:>15} bytes {:>9.2} MB  {:>6.2}%",
                entry.category,
                entry.count,
                thousands(entry.size),
                mib(entry.size),
                percentage(entry.size, total)
            )?;
        }

        writeln!(out, "{}", "-".repeat(RULE))?;
        writeln!(
            out,
            "{:<15} {:<8} {:>15} bytes {:>9.2} MB  {:>6.2}%",
            "TOTAL",
            map.len(),
            thousands(total),
            mib(total),
            percentage(total, total)
        )?;
        writeln!(out)
    })
}

/// Segments grouped by display path in order of first appearance.
#[must_use]
pub fn grouped(map: &MemoryMap) -> String {
    render(|out| {
        banner(out, "MEMORY MAP - GROUPED BY BINARY", RULE)?;
        writeln!(out)?;

        for (binary, segments) in map.group_by_binary() {
            let size: u64 = segments.iter().map(|seg| seg.size()).sum();
            writeln!(out, "📦 {binary}")?;
            writeln!(
                out,
                "   Total size: {} bytes ({} segments)",
                thousands(size),
                segments.len()
            )?;
            for seg in segments {
                writeln!(
                    out,
                    "   0x{:08x}-0x{:08x}  {:<5}  {:<8}  {:>10} bytes",
                    seg.start(),
                    seg.end(),
                    seg.perms(),
                    seg.category(),
                    seg.size()
                )?;
            }
            writeln!(out)?;
        }
        Ok(())
    })
}
