//! # pmap - Main Entry Point
//!
//! Supports two input modes:
//! - **Dump** (`pmap <MAPS_FILE>`): analyze a saved copy of `/proc/<pid>/maps`
//! - **Live** (`pmap --pid <PID>`): read `/proc/<PID>/maps` and `comm` directly
//!
//! Output is either the selected text reports on stdout or a single HTML file.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};

use pmap::cli::{emit, exit_code_for, render_text, save_html, Args, EXIT_SUCCESS};
use pmap::export::write_json;
use pmap::preflight::run_preflight_checks;
use pmap_common::{parse_file, parse_files, parse_process, CrashContext, MemoryMap};

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

/// Load the map from a dump file (with optional comm file) or a live process.
fn load_map(args: &Args) -> Result<MemoryMap> {
    if let Some(pid) = args.pid {
        run_preflight_checks(pid)?;
        return parse_process(pid).with_context(|| format!("Failed to read maps of process {pid}"));
    }

    let Some(maps_file) = &args.maps_file else {
        anyhow::bail!(
            "Missing required argument: MAPS_FILE or --pid\n\n\
             Usage:\n  \
             pmap maps.txt           Analyze a saved maps dump\n  \
             pmap --pid 1234         Analyze a running process\n\n\
             Run 'pmap --help' for more options"
        );
    };

    let map = match &args.comm {
        Some(comm) => parse_files(maps_file, comm)?,
        None => parse_file(maps_file)?,
    };
    Ok(map)
}

fn write_json_file(args: &Args, map: &MemoryMap, ctx: &CrashContext) -> Result<()> {
    let Some(path) = &args.json else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_json(map, Some(ctx), &mut writer).context("Failed to export JSON")?;
    writer.flush().with_context(|| format!("Failed to write {}", path.display()))?;

    if !args.quiet {
        println!("saved: {}", path.display());
    }
    Ok(())
}

fn run() -> Result<()> {
    let args = Args::parse();

    let map = load_map(&args)?;
    if map.is_empty() {
        warn!("No valid segments parsed");
    } else {
        info!("Loaded {} segments, process {:?}", map.len(), map.process_name());
    }

    let ctx = args.crash.crash_context().context("Failed to load register dump")?;

    write_json_file(&args, &map, &ctx)?;

    if let Some(path) = args.html_path() {
        return save_html(&map, &ctx, &path, args.quiet);
    }

    let texts = args.text_reports().into_iter().map(|which| render_text(which, &map, &ctx));
    emit(std::io::stdout().lock(), texts)
}
