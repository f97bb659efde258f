//! Crash and security analysis over a parsed map
//!
//! Pure logic producing advisory findings; nothing here mutates the map.
//!
//! - **Unmapped address** (error) - a register or backtrace entry falls in no
//!   segment
//! - **Stack pointer outside stack** (warning) - `sp` resolves to a segment
//!   that is not `[stack]`
//! - **Writable + executable** (warning) - a register points into a `w+x`
//!   segment; the same check runs map-wide in [`security_sweep`]

use crate::crash::{CrashContext, CrashLocation, Register};
use crate::memory_map::MemoryMap;
use crate::segment::{Category, Segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finding {
    /// The address is not inside any mapped segment.
    UnmappedAddress,
    /// The stack pointer resolved to a non-stack segment of this category.
    StackPointerOutsideStack { category: Category },
    /// The containing segment is both writable and executable.
    WritableExecutable,
}

impl Finding {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Finding::UnmappedAddress => Severity::Error,
            Finding::StackPointerOutsideStack { .. } | Finding::WritableExecutable => {
                Severity::Warning
            }
        }
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Finding::UnmappedAddress => "Address not found in any mapped segment!",
            Finding::StackPointerOutsideStack { .. } => "Stack pointer not in stack segment!",
            Finding::WritableExecutable => "Segment is both writable and executable!",
        }
    }
}

/// Where an analyzed address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSource {
    Register(Register),
    /// Index into the backtrace, innermost frame first.
    Backtrace(usize),
}

/// Resolution result and findings for one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressReport<'a> {
    pub source: AddressSource,
    pub addr: u64,
    pub location: Option<CrashLocation<'a>>,
    pub findings: Vec<Finding>,
}

impl AddressReport<'_> {
    #[must_use]
    pub fn is_mapped(&self) -> bool {
        self.location.is_some()
    }

    #[must_use]
    pub fn has_finding(&self, finding: Finding) -> bool {
        self.findings.contains(&finding)
    }
}

/// Per-register and per-frame analysis of a crash context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrashAnalysis<'a> {
    pub registers: Vec<AddressReport<'a>>,
    pub backtrace: Vec<AddressReport<'a>>,
}

impl CrashAnalysis<'_> {
    /// All findings across registers and backtrace.
    #[must_use]
    pub fn findings(&self) -> Vec<Finding> {
        self.registers
            .iter()
            .chain(&self.backtrace)
            .flat_map(|r| r.findings.iter().copied())
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty() && self.backtrace.is_empty()
    }
}

/// Resolve every register and backtrace entry of `ctx` against `map`.
///
/// Each address is resolved on its own; there is no ordering dependency
/// between registers.
#[must_use]
pub fn analyze_crash<'a>(map: &'a MemoryMap, ctx: &CrashContext) -> CrashAnalysis<'a> {
    let registers = ctx
        .registers()
        .map(|(register, addr)| analyze_register(map, register, addr))
        .collect();

    let backtrace = ctx
        .backtrace
        .iter()
        .enumerate()
        .map(|(index, &addr)| {
            let location = CrashLocation::resolve(map, addr);
            let findings =
                if location.is_none() { vec![Finding::UnmappedAddress] } else { Vec::new() };
            AddressReport { source: AddressSource::Backtrace(index), addr, location, findings }
        })
        .collect();

    CrashAnalysis { registers, backtrace }
}

fn analyze_register(map: &MemoryMap, register: Register, addr: u64) -> AddressReport<'_> {
    let location = CrashLocation::resolve(map, addr);
    let mut findings = Vec::new();

    match location {
        None => findings.push(Finding::UnmappedAddress),
        Some(loc) => {
            let category = loc.segment.category();
            if register == Register::Sp && category != Category::Stack {
                findings.push(Finding::StackPointerOutsideStack { category });
            }
            if loc.segment.is_writable_executable() {
                findings.push(Finding::WritableExecutable);
            }
        }
    }

    AddressReport { source: AddressSource::Register(register), addr, location, findings }
}

/// Every writable+executable segment, in file order.
#[must_use]
pub fn security_sweep(map: &MemoryMap) -> Vec<&Segment> {
    map.segments().iter().filter(|seg| seg.is_writable_executable()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> MemoryMap {
        let seg = |start, end, perms: &str, path: &str| {
            Segment::new(start, end, perms.parse().unwrap(), path).unwrap()
        };
        MemoryMap::new(vec![
            seg(0x0040_0000, 0x0041_0000, "r-xp", "/usr/bin/app"),
            seg(0x0060_0000, 0x0061_0000, "rwxp", ""),
            seg(0x7ffd_0000, 0x7ffe_0000, "rw-p", "[stack]"),
        ])
    }

    #[test]
    fn test_sp_in_code_warns_mismatch() {
        let map = map();
        let ctx = CrashContext::new().with_register(Register::Sp, 0x0040_1000);
        let analysis = analyze_crash(&map, &ctx);
        let sp = &analysis.registers[0];
        assert!(sp.is_mapped());
        assert_eq!(
            sp.findings,
            [Finding::StackPointerOutsideStack { category: Category::Code }]
        );
    }

    #[test]
    fn test_sp_unmapped_is_error_not_mismatch() {
        let map = map();
        let ctx = CrashContext::new().with_register(Register::Sp, 0x10);
        let analysis = analyze_crash(&map, &ctx);
        let sp = &analysis.registers[0];
        assert!(!sp.is_mapped());
        assert_eq!(sp.findings, [Finding::UnmappedAddress]);
        assert_eq!(sp.findings[0].severity(), Severity::Error);
    }

    #[test]
    fn test_sp_in_stack_is_clean() {
        let map = map();
        let ctx = CrashContext::new().with_register(Register::Sp, 0x7ffd_8000);
        assert!(analyze_crash(&map, &ctx).registers[0].findings.is_empty());
    }

    #[test]
    fn test_only_sp_gets_stack_check() {
        let map = map();
        let ctx = CrashContext::new()
            .with_register(Register::Pc, 0x0040_1000)
            .with_register(Register::Fp, 0x0040_2000);
        let analysis = analyze_crash(&map, &ctx);
        assert!(analysis.findings().is_empty());
    }

    #[test]
    fn test_register_in_wx_segment_warns() {
        let map = map();
        let ctx = CrashContext::new()
            .with_register(Register::Pc, 0x0060_0100)
            .with_register(Register::Sp, 0x0060_0200);
        let analysis = analyze_crash(&map, &ctx);
        assert_eq!(analysis.registers[0].findings, [Finding::WritableExecutable]);
        assert!(analysis.registers[1].has_finding(Finding::WritableExecutable));
        assert!(analysis.registers[1]
            .has_finding(Finding::StackPointerOutsideStack { category: Category::Code }));
    }

    #[test]
    fn test_backtrace_resolution() {
        let map = map();
        let ctx = CrashContext::new().with_backtrace(vec![0x0040_0010, 0xdead_0000]);
        let analysis = analyze_crash(&map, &ctx);
        assert!(analysis.registers.is_empty());
        assert_eq!(analysis.backtrace.len(), 2);
        assert_eq!(analysis.backtrace[0].source, AddressSource::Backtrace(0));
        assert_eq!(analysis.backtrace[0].location.unwrap().offset_in_segment, 0x10);
        assert!(analysis.backtrace[0].findings.is_empty());
        assert_eq!(analysis.backtrace[1].findings, [Finding::UnmappedAddress]);
    }

    #[test]
    fn test_security_sweep_flags_rwx() {
        let map = map();
        let flagged = security_sweep(&map);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].perms().as_str(), "rwxp");
    }

    #[test]
    fn test_security_sweep_clean_map() {
        let map = MemoryMap::new(vec![Segment::new(
            0x1000,
            0x2000,
            "r-xp".parse().unwrap(),
            "/bin/true",
        )
        .unwrap()]);
        assert!(security_sweep(&map).is_empty());
    }
}
