//! Crash context and security reports

use std::fmt::Write;

use pmap_common::analysis::{AddressReport, AddressSource};
use pmap_common::{analyze_crash, security_sweep, CrashContext, MemoryMap, Severity};

use super::{banner, render, RULE};

/// Per-register resolution followed by the backtrace, if any.
#[must_use]
pub fn crash(map: &MemoryMap, ctx: &CrashContext) -> String {
    let analysis = analyze_crash(map, ctx);

    render(|out| {
        banner(out, "CRASH CONTEXT ANALYSIS", RULE)?;
        writeln!(out)?;

        for report in &analysis.registers {
            write_register(out, report)?;
        }

        if !analysis.backtrace.is_empty() {
            writeln!(out, "Backtrace Analysis:")?;
            writeln!(out)?;
            for frame in &analysis.backtrace {
                let AddressSource::Backtrace(index) = frame.source else { continue };
                match &frame.location {
                    Some(loc) => writeln!(
                        out,
                        "  #{index}: 0x{:016x} → {} + 0x{:x} [{}]",
                        frame.addr,
                        loc.segment.display_path(),
                        loc.offset_in_segment,
                        loc.segment.category()
                    )?,
                    None => writeln!(out, "  #{index}: 0x{:016x} → NOT MAPPED", frame.addr)?,
                }
            }
            writeln!(out)?;
        }
        Ok(())
    })
}

fn write_register(out: &mut String, report: &AddressReport<'_>) -> std::fmt::Result {
    let label = match report.source {
        AddressSource::Register(register) => register.label(),
        AddressSource::Backtrace(_) => "Backtrace frame",
    };
    writeln!(out, "{label}:")?;
    writeln!(out, "  Address: 0x{:016x}", report.addr)?;

    if let Some(loc) = &report.location {
        let seg = loc.segment;
        writeln!(out, "  Segment: {} [{}]", seg.display_path(), seg.category())?;
        writeln!(out, "  Permissions: {}", seg.perms())?;
        writeln!(out, "  Offset in segment: 0x{:x}", loc.offset_in_segment)?;
        writeln!(out, "  Offset in binary: 0x{:x}", loc.offset_in_binary)?;
        writeln!(out, "  Debug command: {}", loc.debug_command())?;
    }

    for finding in &report.findings {
        let level = match finding.severity() {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        writeln!(out, "  ⚠️  {level}: {}", finding.message())?;
    }
    writeln!(out)
}

/// Map-wide writable+executable sweep.
#[must_use]
pub fn security(map: &MemoryMap) -> String {
    let flagged = security_sweep(map);

    render(|out| {
        banner(out, "SECURITY ANALYSIS", RULE)?;
        writeln!(out)?;
        if flagged.is_empty() {
            writeln!(out, "✓ No suspicious writable+executable regions found.")?;
        } else {
            writeln!(out, "Security issues found:")?;
            for seg in flagged {
                writeln!(
                    out,
                    "  ⚠️  WRITABLE+EXECUTABLE: 0x{:08x}-0x{:08x} {} {}",
                    seg.start(),
                    seg.end(),
                    seg.perms(),
                    seg.display_path()
                )?;
            }
        }
        writeln!(out)
    })
}
