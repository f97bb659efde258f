use std::path::PathBuf;

use pmap::export::{write_json, write_report};
use pmap::report::{self, HtmlReport};
use pmap_common::registers::load_register_dump;
use pmap_common::{parse_file, CrashContext, MemoryMap, Register};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn sample() -> MemoryMap {
    parse_file(fixture("pmap-sample.txt")).expect("fixture readable")
}

#[test]
fn test_table_header_for_sample() {
    let out = report::table(&sample());
    assert!(out.contains("Process: amxrt"));
    assert!(out.contains("PID: 1523"));
    assert!(out.contains("Segments: 15"));
    assert!(out.contains("Total Size: 1,851,392 bytes"));
    assert_eq!(out.lines().filter(|l| l.starts_with("0x")).count(), 15);
}

#[test]
fn test_stats_total_row() {
    let out = report::stats(&sample());
    let total = out.lines().find(|l| l.starts_with("TOTAL")).unwrap();
    assert!(total.contains(" 15 "));
    assert!(total.contains("1,851,392 bytes"));
    assert!(total.ends_with("100.00%"));
}

#[test]
fn test_overview_for_sample() {
    let out = report::overview(&sample());
    assert!(out.contains("0xff8a1000-0xff8c2000  rw-p STACK  [stack]"));
    assert!(out.contains("0xf7ac0000-0xf7ae0000  r-xp CODE   /lib/ld-linux-armhf.so.3"));
    assert!(out.contains("0xf7ab0000-0xf7ab1000  rwxp CODE   [anon]"));
    assert!(!out.contains("(n/a)"));
    assert!(!out.contains("[vectors]"));
}

#[test]
fn test_crash_report_from_register_dump() {
    let map = sample();
    let ctx = load_register_dump(fixture("crash.regs")).unwrap().crash_context();
    let out = report::crash(&map, &ctx);
    assert!(out.contains("Program Counter (PC):"));
    assert!(out.contains("Link Register (LR):"));
    assert!(out.contains("Stack Pointer (SP):"));
    assert!(out.contains("Frame Pointer (FP):"));
    assert!(out.contains("Debug command: addr2line -f -C -i -e /lib/libc.so.6 0x8245c"));
    assert!(out.contains("Debug command: # addr2line not applicable for [stack]"));
    assert!(!out.contains("WARNING"));
    assert!(!out.contains("ERROR"));
}

#[test]
fn test_ascii_markers_for_sample() {
    let map = sample();
    let ctx = CrashContext::new()
        .with_register(Register::Pc, 0xf79e_245c)
        .with_register(Register::Sp, 0xff8c_1000)
        .with_register(Register::Fp, 0xff8c_1010);
    let out = report::ascii(&map, Some(&ctx));
    assert!(out.contains("[stack] ← SP FP"));
    assert!(out.contains("/lib/libc.so.6 ← PC"));
    let first = out.lines().find(|l| l.contains("──┬─")).unwrap();
    assert!(first.starts_with("0xffff1000"));
}

#[test]
fn test_security_report_for_sample() {
    let out = report::security(&sample());
    assert!(out.contains("WRITABLE+EXECUTABLE: 0xf7ab0000-0xf7ab1000 rwxp [anon]"));
}

#[test]
fn test_html_report_written_to_disk() {
    let map = sample();
    let ctx = CrashContext::new().with_register(Register::Pc, 0xf79e_245c);
    let html = HtmlReport::new(&map)
        .with_crash_context(&ctx)
        .with_timestamp("2024-05-06 07:08:09")
        .render()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.html");
    write_report(&path, &html).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, html);
    assert!(written.contains("Generated: <strong>2024-05-06 07:08:09</strong>"));
    assert!(written.contains("Crash Context Analysis"));
    assert!(written.contains(">PC</span>"));
    assert_eq!(written.matches("<tr><td class=\"monospace\">").count(), 15);
}

#[test]
fn test_json_export_of_sample() {
    let map = sample();
    let ctx = CrashContext::new().with_backtrace(vec![0xf79e_245c, 0x4]);
    let mut buffer = Vec::new();
    write_json(&map, Some(&ctx), &mut buffer).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&buffer).expect("valid JSON");
    assert_eq!(value["pid"], 1523);
    assert_eq!(value["total_size"], 1_851_392);
    assert_eq!(value["segments"].as_array().unwrap().len(), 15);
    assert_eq!(value["crash"]["registers"].as_array().unwrap().len(), 0);
    assert_eq!(value["crash"]["backtrace"][0]["pathname"], "/lib/libc.so.6");
    assert_eq!(value["crash"]["backtrace"][1]["mapped"], false);
}
