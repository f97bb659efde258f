//! # pmap2html - standalone HTML report generator
//!
//! `pmap2html <MAPS_FILE> --html <FILE>` with the same crash options as `pmap`.

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;

use pmap::cli::{exit_code_for, save_html, HtmlArgs, EXIT_SUCCESS};
use pmap_common::parse_file;

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

fn run() -> Result<()> {
    let args = HtmlArgs::parse();

    let map = parse_file(&args.maps_file)?;
    if map.is_empty() {
        warn!("No valid segments parsed from {}", args.maps_file.display());
    }

    let ctx = args.crash.crash_context().context("Failed to load register dump")?;
    save_html(&map, &ctx, &args.html, args.quiet)
}
