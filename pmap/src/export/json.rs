//! JSON export of a parsed map and its crash analysis
//!
//! ```json
//! {
//!   "pid": 1523,
//!   "process_name": "amxrt",
//!   "segment_count": 15,
//!   "total_size": 1851392,
//!   "segments": [{ "start": 65536, "end": 69632, "perms": "r-xp", "category": "CODE", ... }],
//!   "statistics": [{ "category": "ANON", "count": 2, "size": 16384 }],
//!   "writable_executable": [{ "start": 4155179008, "end": 4155183104, ... }],
//!   "crash": { "registers": [...], "backtrace": [...] }
//! }
//! ```
//!
//! `pid` is `null` when unknown; `crash` is `null` without a crash context.

use serde::Serialize;
use std::io::Write;

use pmap_common::analysis::{AddressReport, AddressSource};
use pmap_common::{
    analyze_crash, security_sweep, Category, CrashContext, MemoryMap, Perms, Register, Segment,
    Severity,
};

use crate::domain::ReportError;

#[derive(Debug, Serialize)]
struct MapDocument<'a> {
    pid: Option<u32>,
    process_name: &'a str,
    segment_count: usize,
    total_size: u64,
    segments: Vec<SegmentRecord<'a>>,
    statistics: Vec<StatRecord>,
    writable_executable: Vec<SegmentRecord<'a>>,
    crash: Option<CrashRecord<'a>>,
}

#[derive(Debug, Serialize)]
struct SegmentRecord<'a> {
    start: u64,
    end: u64,
    size: u64,
    perms: Perms,
    offset: u64,
    dev: String,
    inode: u64,
    pathname: &'a str,
    category: Category,
}

impl<'a> From<&'a Segment> for SegmentRecord<'a> {
    fn from(seg: &'a Segment) -> Self {
        Self {
            start: seg.start(),
            end: seg.end(),
            size: seg.size(),
            perms: seg.perms(),
            offset: seg.offset(),
            dev: format!("{:02x}:{:02x}", seg.dev_major(), seg.dev_minor()),
            inode: seg.inode(),
            pathname: seg.pathname(),
            category: seg.category(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatRecord {
    category: Category,
    count: usize,
    size: u64,
}

#[derive(Debug, Serialize)]
struct CrashRecord<'a> {
    registers: Vec<AddressRecord<'a>>,
    backtrace: Vec<AddressRecord<'a>>,
}

#[derive(Debug, Serialize)]
struct AddressRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    register: Option<Register>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame: Option<usize>,
    addr: u64,
    mapped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pathname: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset_in_segment: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset_in_binary: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug_command: Option<String>,
    findings: Vec<FindingRecord>,
}

#[derive(Debug, Serialize)]
struct FindingRecord {
    severity: &'static str,
    message: &'static str,
}

impl<'a> From<&AddressReport<'a>> for AddressRecord<'a> {
    fn from(report: &AddressReport<'a>) -> Self {
        let (register, frame) = match report.source {
            AddressSource::Register(register) => (Some(register), None),
            AddressSource::Backtrace(index) => (None, Some(index)),
        };
        let location = report.location.as_ref();
        Self {
            register,
            frame,
            addr: report.addr,
            mapped: report.is_mapped(),
            pathname: location.map(|loc| loc.segment.pathname()),
            category: location.map(|loc| loc.segment.category()),
            offset_in_segment: location.map(|loc| loc.offset_in_segment),
            offset_in_binary: location.map(|loc| loc.offset_in_binary),
            debug_command: location.map(|loc| loc.debug_command().to_string()),
            findings: report
                .findings
                .iter()
                .map(|finding| FindingRecord {
                    severity: match finding.severity() {
                        Severity::Warning => "warning",
                        Severity::Error => "error",
                    },
                    message: finding.message(),
                })
                .collect(),
        }
    }
}

/// Serialize `map` (and the analysis of `ctx`, when given) as pretty JSON.
///
/// # Errors
/// Returns [`ReportError::Json`] if serialization or the underlying write fails.
pub fn write_json<W: Write>(
    map: &MemoryMap,
    ctx: Option<&CrashContext>,
    writer: W,
) -> Result<(), ReportError> {
    let crash = ctx.filter(|ctx| !ctx.is_empty()).map(|ctx| {
        let analysis = analyze_crash(map, ctx);
        CrashRecord {
            registers: analysis.registers.iter().map(AddressRecord::from).collect(),
            backtrace: analysis.backtrace.iter().map(AddressRecord::from).collect(),
        }
    });

    let document = MapDocument {
        pid: (map.pid() != 0).then_some(map.pid()),
        process_name: map.process_name(),
        segment_count: map.len(),
        total_size: map.total_size(),
        segments: map.segments().iter().map(SegmentRecord::from).collect(),
        statistics: map
            .category_stats()
            .into_iter()
            .map(|s| StatRecord { category: s.category, count: s.count, size: s.size })
            .collect(),
        writable_executable: security_sweep(map).into_iter().map(SegmentRecord::from).collect(),
        crash,
    };

    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}
