//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use pmap_common::registers::load_register_dump;
use pmap_common::{CrashContext, FormatError, Register};

#[derive(Parser, Debug)]
#[command(
    name = "pmap",
    version,
    about = "Analyze Linux /proc/<pid>/maps dumps and crash addresses",
    after_help = "\
EXAMPLES:
    pmap maps.txt                             All text reports
    pmap maps.txt --table --security          Only the table and security reports
    pmap maps.txt --pc 0xf79e245c             Crash analysis for PC
    pmap maps.txt --regs crash.regs --ascii   Registers from a dump, with markers
    pmap maps.txt --pc 0x1234 --html          HTML report to maps.txt.html
    pmap --pid 1234 --segments                Live process, segment overview"
)]
pub struct Args {
    /// Memory map dump (a copy of /proc/<pid>/maps)
    #[arg(value_name = "MAPS_FILE", required_unless_present = "pid", conflicts_with = "pid")]
    pub maps_file: Option<PathBuf>,

    /// Read the maps of a running process instead of a dump
    #[arg(short, long)]
    pub pid: Option<u32>,

    /// Companion comm file with the process name (used with MAPS_FILE)
    #[arg(long, value_name = "FILE", conflicts_with = "pid")]
    pub comm: Option<PathBuf>,

    /// Show all text reports (default when no report is selected)
    #[arg(long)]
    pub report: bool,

    /// Show the tabular view
    #[arg(long)]
    pub table: bool,

    /// Show per-category statistics
    #[arg(long)]
    pub stats: bool,

    /// Show segments grouped by binary
    #[arg(long)]
    pub grouped: bool,

    /// Show the boxed segment overview
    #[arg(long)]
    pub segments: bool,

    /// Show the ASCII memory layout
    #[arg(long)]
    pub ascii: bool,

    /// Show writable+executable regions
    #[arg(long)]
    pub security: bool,

    /// Write an HTML report instead of text (default: <MAPS_FILE>.html)
    #[arg(long, value_name = "FILE")]
    pub html: Option<Option<PathBuf>>,

    /// Also write the map and crash analysis as JSON
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    #[command(flatten)]
    pub crash: CrashArgs,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments of the standalone HTML generator.
#[derive(Parser, Debug)]
#[command(
    name = "pmap2html",
    version,
    about = "Generate an HTML report from a /proc/<pid>/maps dump",
    after_help = "\
EXAMPLES:
    pmap2html maps.txt --html report.html
    pmap2html maps.txt --pc 0xf79e245c --sp 0xff8c1000 --html crash_report.html"
)]
pub struct HtmlArgs {
    /// Memory map dump (a copy of /proc/<pid>/maps)
    #[arg(value_name = "MAPS_FILE")]
    pub maps_file: PathBuf,

    /// Output HTML file
    #[arg(long, value_name = "FILE")]
    pub html: PathBuf,

    #[command(flatten)]
    pub crash: CrashArgs,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Crash register options shared by both binaries.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CrashArgs {
    /// Program counter (hex, `0x` optional)
    #[arg(long, value_name = "ADDR", value_parser = parse_address)]
    pub pc: Option<u64>,

    /// Link register (hex)
    #[arg(long, value_name = "ADDR", value_parser = parse_address)]
    pub lr: Option<u64>,

    /// Stack pointer (hex)
    #[arg(long, value_name = "ADDR", value_parser = parse_address)]
    pub sp: Option<u64>,

    /// Frame pointer (hex)
    #[arg(long, value_name = "ADDR", value_parser = parse_address)]
    pub fp: Option<u64>,

    /// Backtrace addresses, innermost frame first
    #[arg(long, value_name = "ADDR,...", value_delimiter = ',', value_parser = parse_address)]
    pub bt: Vec<u64>,

    /// Register dump (x86-64 or ARM64) to take PC/LR/SP/FP from
    #[arg(long, value_name = "FILE")]
    pub regs: Option<PathBuf>,
}

impl CrashArgs {
    /// Any crash option was given.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.pc.is_some()
            || self.lr.is_some()
            || self.sp.is_some()
            || self.fp.is_some()
            || !self.bt.is_empty()
            || self.regs.is_some()
    }

    /// Crash context from the register dump (if any), overridden by explicit
    /// register flags.
    ///
    /// # Errors
    /// Returns [`FormatError`] if the register dump can't be read.
    pub fn crash_context(&self) -> Result<CrashContext, FormatError> {
        let base = match &self.regs {
            Some(path) => load_register_dump(path)?.crash_context(),
            None => CrashContext::new(),
        };

        let explicit = [
            (Register::Pc, self.pc),
            (Register::Lr, self.lr),
            (Register::Sp, self.sp),
            (Register::Fp, self.fp),
        ];
        let ctx = explicit.into_iter().fold(base, |ctx, (register, value)| match value {
            Some(addr) => ctx.with_register(register, addr),
            None => ctx,
        });

        Ok(if self.bt.is_empty() { ctx } else { ctx.with_backtrace(self.bt.clone()) })
    }
}

/// Text reports in the order they are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextReport {
    Table,
    Stats,
    Grouped,
    Segments,
    Ascii,
    Crash,
    Security,
}

impl Args {
    /// Where to write the HTML report, if requested.
    ///
    /// A bare `--html` writes `<MAPS_FILE basename>.html`, or `pid-<PID>.html`
    /// in live mode, into the current directory.
    #[must_use]
    pub fn html_path(&self) -> Option<PathBuf> {
        match &self.html {
            None => None,
            Some(Some(path)) => Some(path.clone()),
            Some(None) => Some(self.default_html_path()),
        }
    }

    fn default_html_path(&self) -> PathBuf {
        let stem = match (&self.maps_file, self.pid) {
            (Some(path), _) => path
                .file_name()
                .map_or_else(|| "report".to_string(), |name| name.to_string_lossy().into_owned()),
            (None, Some(pid)) => format!("pid-{pid}"),
            (None, None) => "report".to_string(),
        };
        PathBuf::from(format!("{stem}.html"))
    }

    /// Text reports to print, honouring `--report` and the individual flags.
    ///
    /// With no report flag, no crash option and no `--json`, everything
    /// `--report` covers is printed.
    #[must_use]
    pub fn text_reports(&self) -> Vec<TextReport> {
        let has_crash = self.crash.is_present();
        let any_selected = self.table
            || self.stats
            || self.grouped
            || self.segments
            || self.ascii
            || self.security
            || has_crash
            || self.json.is_some();

        if self.report || !any_selected {
            let mut reports =
                vec![TextReport::Table, TextReport::Stats, TextReport::Grouped, TextReport::Ascii];
            if has_crash {
                reports.push(TextReport::Crash);
            }
            reports.push(TextReport::Security);
            return reports;
        }

        [
            (self.table, TextReport::Table),
            (self.stats, TextReport::Stats),
            (self.grouped, TextReport::Grouped),
            (self.segments, TextReport::Segments),
            (self.ascii, TextReport::Ascii),
            (has_crash, TextReport::Crash),
            (self.security, TextReport::Security),
        ]
        .into_iter()
        .filter_map(|(selected, report)| selected.then_some(report))
        .collect()
    }
}

/// Parse a hex address with or without a `0x` prefix.
///
/// # Errors
/// Returns a message naming the rejected input.
pub fn parse_address(s: &str) -> Result<u64, String> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if digits.is_empty() {
        return Err(format!("invalid hex address: {s:?}"));
    }
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid hex address {s:?}: {e}"))
}
