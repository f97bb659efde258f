//! Self-contained HTML report
//!
//! One page with inline CSS and no external assets:
//!
//! ```text
//! header     process, pid, generation time
//! stats      total segments, total memory, CODE/DATA/HEAP/STACK cards
//! crash      register analysis (only when a register is given)
//! layout     five layout groups, high to low, with register markers
//! legend     category colours
//! table      every segment with full 16-digit addresses
//! ```
//!
//! All map-derived text passes through [`escape`] before it reaches markup.

use std::fmt::{self, Write};

use pmap_common::analysis::AddressSource;
use pmap_common::layout::layout_groups;
use pmap_common::{analyze_crash, Category, CrashContext, MemoryMap, Segment, Severity};

use super::format::{hex16, hex8, kib, mib, thousands};
use super::theme::{category_color, CRASH_MARKER};
use super::{pid_label, process_label, render};
use crate::domain::ReportError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Categories that get their own statistics card, when present.
const STAT_CARD_CATEGORIES: [Category; 4] =
    [Category::Code, Category::Data, Category::Heap, Category::Stack];

const STYLE: &str = r"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            padding: 10px; color: #333; font-size: 15px;
        }
        .container {
            max-width: 1200px; margin: 0 auto; background: white;
            border-radius: 5px; box-shadow: 0 5px 20px rgba(0,0,0,0.2); overflow: hidden;
        }
        .header {
            background: linear-gradient(135deg, #2c3e50 0%, #34495e 100%);
            color: white; padding: 15px 20px; text-align: center;
        }
        .header h1 { font-size: 1.8em; margin-bottom: 5px; }
        .header .info { font-size: 0.9em; opacity: 0.9; }
        .content { padding: 15px; }
        .section { margin-bottom: 20px; }
        .section-title {
            font-size: 1.4em; color: #2c3e50; border-bottom: 2px solid #3498db;
            padding-bottom: 5px; margin-bottom: 10px;
        }
        .memory-viz { background: #f8f9fa; border-radius: 5px; padding: 10px; }
        .memory-scale { font-family: monospace; font-size: 0.85em; color: #666; margin: 3px 0; }
        .memory-container {
            background: white; border: 2px solid #2c3e50; border-radius: 3px;
            overflow: auto; max-height: 600px; font-family: monospace;
        }
        .segment-group { border-bottom: 2px solid #2c3e50; }
        .segment-group:last-child { border-bottom: none; }
        .segment-group-header {
            background: #2c3e50; color: white; padding: 4px 8px; font-weight: bold; font-size: 0.85em;
        }
        .segment { padding: 3px 8px; font-size: 0.8em; white-space: nowrap; }
        .segment-addr { color: #2c3e50; font-weight: bold; margin-right: 8px; }
        .segment-perms { color: #555; margin-right: 8px; }
        .segment-type { font-weight: bold; margin-right: 8px; min-width: 60px; display: inline-block; }
        .segment-path { color: #333; }
        .crash-marker {
            color: white; padding: 1px 5px; border-radius: 3px;
            font-size: 0.85em; font-weight: bold; margin-left: 6px;
        }
        .legend { display: flex; flex-wrap: wrap; gap: 8px; margin-top: 10px; }
        .legend-item { display: flex; align-items: center; gap: 5px; font-size: 0.8em; }
        .legend-color { width: 14px; height: 14px; border-radius: 2px; }
        .stats-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 10px; }
        .stat-card { background: #f8f9fa; border-radius: 5px; padding: 10px; text-align: center; }
        .stat-card h3 { font-size: 0.85em; color: #666; margin-bottom: 5px; }
        .stat-card .value { font-size: 1.4em; font-weight: bold; color: #2c3e50; }
        .crash-info { background: #fff3f3; border-left: 4px solid #e53935; padding: 10px; border-radius: 3px; }
        .crash-info h3 { color: #c62828; margin-bottom: 6px; font-size: 1em; }
        .crash-detail { margin: 6px 0; font-size: 0.85em; line-height: 1.5; font-family: monospace; }
        .finding-error { color: #c62828; font-weight: bold; }
        .finding-warning { color: #ef6c00; font-weight: bold; }
        table { width: 100%; border-collapse: collapse; margin-top: 8px; font-size: 0.75em; }
        table th { background: #2c3e50; color: white; padding: 6px 8px; text-align: left; position: sticky; top: 0; }
        table td { padding: 4px 8px; border-bottom: 1px solid #eee; }
        table tbody tr:hover { background: #f8f9fa; }
        .monospace { font-family: monospace; }
        .footer {
            background: #f8f9fa; padding: 8px; text-align: center; color: #666;
            border-top: 1px solid #ddd; font-size: 0.75em;
        }
";

/// HTML rendering of one map, optionally annotated with a crash context.
#[derive(Debug, Clone)]
pub struct HtmlReport<'a> {
    map: &'a MemoryMap,
    ctx: Option<&'a CrashContext>,
    generated: String,
}

impl<'a> HtmlReport<'a> {
    /// Report stamped with the current local time.
    #[must_use]
    pub fn new(map: &'a MemoryMap) -> Self {
        Self {
            map,
            ctx: None,
            generated: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    #[must_use]
    pub fn with_crash_context(mut self, ctx: &'a CrashContext) -> Self {
        self.ctx = Some(ctx);
        self
    }

    /// Override the generation timestamp shown in the header.
    #[must_use]
    pub fn with_timestamp(mut self, generated: impl Into<String>) -> Self {
        self.generated = generated.into();
        self
    }

    /// Render the full page.
    ///
    /// # Errors
    /// Returns [`ReportError::NothingToVisualize`] when the map has no segments.
    pub fn render(&self) -> Result<String, ReportError> {
        let Some(span) = self.map.address_span() else {
            return Err(ReportError::NothingToVisualize);
        };

        Ok(render(|out| {
            writeln!(out, "<!DOCTYPE html>")?;
            writeln!(out, "<html lang=\"en\">")?;
            writeln!(out, "<head>")?;
            writeln!(out, "    <meta charset=\"UTF-8\">")?;
            writeln!(
                out,
                "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
            )?;
            let title = match self.map.process_name() {
                "" => "Process",
                name => name,
            };
            writeln!(out, "    <title>Process Map Analysis - {}</title>", escape(title))?;
            writeln!(out, "    <style>{STYLE}    </style>")?;
            writeln!(out, "</head>")?;
            writeln!(out, "<body>")?;
            writeln!(out, "<div class=\"container\">")?;

            writeln!(out, "<div class=\"header\">")?;
            writeln!(out, "    <h1>📊 Process Map Analysis</h1>")?;
            writeln!(
                out,
                "    <div class=\"info\">Process: <strong>{}</strong> | PID: <strong>{}</strong> | Generated: <strong>{}</strong></div>",
                escape(process_label(self.map)),
                pid_label(self.map),
                escape(&self.generated)
            )?;
            writeln!(out, "</div>")?;

            writeln!(out, "<div class=\"content\">")?;
            self.write_statistics(out)?;
            self.write_crash(out)?;

            writeln!(out, "<div class=\"section\">")?;
            writeln!(out, "    <h2 class=\"section-title\">📊 Memory Layout Visualization</h2>")?;
            writeln!(out, "    <div class=\"memory-viz\">")?;
            writeln!(
                out,
                "        <div class=\"memory-scale\">⬇️ High Memory: {}</div>",
                hex16(span.high)
            )?;
            writeln!(out, "        <div class=\"memory-container\">")?;
            self.write_segments(out)?;
            writeln!(out, "        </div>")?;
            writeln!(
                out,
                "        <div class=\"memory-scale\">⬆️ Low Memory: {}</div>",
                hex16(span.low)
            )?;
            writeln!(
                out,
                "        <div class=\"memory-scale\">Address range: {} bytes</div>",
                thousands(span.range())
            )?;
            write_legend(out)?;
            writeln!(out, "    </div>")?;
            writeln!(out, "</div>")?;

            self.write_table(out)?;
            writeln!(out, "</div>")?;

            writeln!(
                out,
                "<div class=\"footer\">Generated by pmap v{}</div>",
                env!("CARGO_PKG_VERSION")
            )?;
            writeln!(out, "</div>")?;
            writeln!(out, "</body>")?;
            writeln!(out, "</html>")
        }))
    }

    fn write_statistics(&self, out: &mut String) -> fmt::Result {
        let stats = self.map.category_stats();

        writeln!(out, "<div class=\"section\">")?;
        writeln!(out, "    <h2 class=\"section-title\">📈 Statistics</h2>")?;
        writeln!(out, "    <div class=\"stats-grid\">")?;
        write_card(out, "Total Segments", &self.map.len().to_string())?;
        write_card(out, "Total Memory", &format!("{:.1} MB", mib(self.map.total_size())))?;
        for category in STAT_CARD_CATEGORIES {
            if let Some(entry) = stats.iter().find(|s| s.category == category) {
                write_card(out, category.as_str(), &format!("{:.0} KB", kib(entry.size)))?;
            }
        }
        writeln!(out, "    </div>")?;
        writeln!(out, "</div>")
    }

    fn write_crash(&self, out: &mut String) -> fmt::Result {
        let Some(ctx) = self.ctx.filter(|ctx| ctx.has_registers()) else {
            return Ok(());
        };
        let analysis = analyze_crash(self.map, ctx);

        writeln!(out, "<div class=\"section\">")?;
        writeln!(out, "    <h2 class=\"section-title\">🔍 Crash Context Analysis</h2>")?;
        writeln!(out, "    <div class=\"crash-info\">")?;
        writeln!(out, "        <h3>Register Analysis</h3>")?;

        for report in &analysis.registers {
            let AddressSource::Register(register) = report.source else { continue };
            writeln!(out, "        <div class=\"crash-detail\">")?;
            writeln!(
                out,
                "            <strong>{}:</strong> {}<br>",
                register.label(),
                hex16(report.addr)
            )?;
            if let Some(loc) = &report.location {
                let seg = loc.segment;
                writeln!(
                    out,
                    "            Segment: {} [{}]<br>",
                    escape(seg.display_path()),
                    seg.category()
                )?;
                writeln!(
                    out,
                    "            Permissions: {} | Offset: 0x{:x}<br>",
                    seg.perms(),
                    loc.offset_in_segment
                )?;
                let command = loc.debug_command().to_string();
                writeln!(out, "            Debug: <code>{}</code><br>", escape(&command))?;
            }
            for finding in &report.findings {
                let class = match finding.severity() {
                    Severity::Warning => "finding-warning",
                    Severity::Error => "finding-error",
                };
                writeln!(
                    out,
                    "            <span class=\"{class}\">⚠️ {}</span><br>",
                    finding.message()
                )?;
            }
            writeln!(out, "        </div>")?;
        }

        if !analysis.backtrace.is_empty() {
            writeln!(out, "        <h3>Backtrace</h3>")?;
            for frame in &analysis.backtrace {
                let AddressSource::Backtrace(index) = frame.source else { continue };
                match &frame.location {
                    Some(loc) => writeln!(
                        out,
                        "        <div class=\"crash-detail\">#{index}: {} → {} + 0x{:x} [{}]</div>",
                        hex16(frame.addr),
                        escape(loc.segment.display_path()),
                        loc.offset_in_segment,
                        loc.segment.category()
                    )?,
                    None => writeln!(
                        out,
                        "        <div class=\"crash-detail\">#{index}: {} → <span class=\"finding-error\">NOT MAPPED</span></div>",
                        hex16(frame.addr)
                    )?,
                }
            }
        }

        writeln!(out, "    </div>")?;
        writeln!(out, "</div>")
    }

    fn write_segments(&self, out: &mut String) -> fmt::Result {
        for group in layout_groups(self.map) {
            if group.segments.is_empty() {
                continue;
            }
            writeln!(out, "<div class=\"segment-group\">")?;
            writeln!(out, "<div class=\"segment-group-header\">{}</div>", group.kind.title())?;
            for seg in group.segments {
                self.write_segment(out, seg)?;
            }
            writeln!(out, "</div>")?;
        }
        Ok(())
    }

    fn write_segment(&self, out: &mut String, seg: &Segment) -> fmt::Result {
        let color = category_color(seg.category());
        write!(
            out,
            "<div class=\"segment\" style=\"background-color: {color}33; border-left: 3px solid {color};\">\
             <span class=\"segment-addr\">{}-{}</span>\
             <span class=\"segment-perms\">{}</span>\
             <span class=\"segment-type\">{}</span>\
             <span class=\"segment-path\">{}</span>",
            hex8(seg.start()),
            hex8(seg.end()),
            seg.perms(),
            seg.category(),
            escape(seg.display_path())
        )?;
        if let Some(ctx) = self.ctx {
            for (register, addr) in ctx.registers_in(self.map, seg) {
                write!(
                    out,
                    " <span class=\"crash-marker\" style=\"background: {CRASH_MARKER};\" title=\"{}\">{}</span>",
                    hex16(addr),
                    register.short_name()
                )?;
            }
        }
        writeln!(out, "</div>")
    }

    fn write_table(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "<div class=\"section\">")?;
        writeln!(out, "    <h2 class=\"section-title\">📋 Detailed Segment Table</h2>")?;
        writeln!(out, "    <div style=\"overflow-x: auto;\">")?;
        writeln!(out, "    <table>")?;
        writeln!(
            out,
            "        <thead><tr><th>Start Address</th><th>End Address</th><th>Size (bytes)</th>\
             <th>Permissions</th><th>Type</th><th>Binary/Mapping</th></tr></thead>"
        )?;
        writeln!(out, "        <tbody>")?;
        for seg in self.map.segments() {
            writeln!(
                out,
                "        <tr><td class=\"monospace\">{}</td><td class=\"monospace\">{}</td><td>{}</td>\
                 <td class=\"monospace\">{}</td>\
                 <td><span style=\"color: {}; font-weight: bold;\">●</span> {}</td>\
                 <td style=\"font-size: 0.85em;\">{}</td></tr>",
                hex16(seg.start()),
                hex16(seg.end()),
                thousands(seg.size()),
                seg.perms(),
                category_color(seg.category()),
                seg.category(),
                escape(seg.display_path())
            )?;
        }
        writeln!(out, "        </tbody>")?;
        writeln!(out, "    </table>")?;
        writeln!(out, "    </div>")?;
        writeln!(out, "</div>")
    }
}

fn write_card(out: &mut String, title: &str, value: &str) -> fmt::Result {
    writeln!(
        out,
        "        <div class=\"stat-card\"><h3>{title}</h3><div class=\"value\">{value}</div></div>"
    )
}

fn write_legend(out: &mut String) -> fmt::Result {
    writeln!(out, "        <div class=\"legend\">")?;
    for category in Category::ALL {
        writeln!(
            out,
            "            <div class=\"legend-item\"><div class=\"legend-color\" style=\"background-color: {};\"></div>\
             <div class=\"legend-text\"><strong>{}</strong>: {}</div></div>",
            category_color(category),
            category,
            category.description()
        )?;
    }
    writeln!(out, "        </div>")
}

/// Escape text for use in element content and quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
