use std::path::PathBuf;
use std::process::Command;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn pmap() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pmap"))
}

#[test]
fn test_default_prints_all_text_reports() {
    let output = pmap().arg(fixture("pmap-sample.txt")).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for title in [
        "MEMORY MAP - TABULAR VIEW",
        "MEMORY STATISTICS",
        "MEMORY MAP - GROUPED BY BINARY",
        "MEMORY LAYOUT - ASCII VISUALIZATION",
        "SECURITY ANALYSIS",
    ] {
        assert!(stdout.contains(title), "missing {title}");
    }
    assert!(!stdout.contains("CRASH CONTEXT ANALYSIS"));
    assert!(!stdout.contains("SEGMENT OVERVIEW"));
}

#[test]
fn test_crash_option_shows_only_crash_analysis() {
    let output = pmap()
        .arg(fixture("pmap-sample.txt"))
        .args(["--pc", "f79e245c", "--sp", "0x10"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("CRASH CONTEXT ANALYSIS"));
    assert!(stdout.contains("ERROR: Address not found in any mapped segment!"));
    assert!(!stdout.contains("TABULAR VIEW"));
}

#[test]
fn test_html_output_skips_text_reports() {
    let dir = tempfile::tempdir().unwrap();
    let html = dir.path().join("out.html");
    let output = pmap()
        .arg(fixture("pmap-sample.txt"))
        .arg("--table")
        .arg("--html")
        .arg(&html)
        .arg("--quiet")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(std::fs::read_to_string(&html).unwrap().contains("Detailed Segment Table"));
}

#[test]
fn test_empty_dump_html_fails() {
    let dir = tempfile::tempdir().unwrap();
    let maps = dir.path().join("empty.txt");
    std::fs::write(&maps, "# nothing here\nnot a record\n").unwrap();
    let html = dir.path().join("empty.html");

    let output = pmap().arg(&maps).arg("--html").arg(&html).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No memory segments to visualize"));
    assert!(!html.exists());
}

#[test]
fn test_missing_dump_is_error() {
    let output = pmap().arg(fixture("nope.txt")).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.txt"));
}

#[test]
fn test_usage_errors_exit_2() {
    let output = pmap().output().unwrap();
    assert_eq!(output.status.code(), Some(2));

    let output = pmap().arg(fixture("pmap-sample.txt")).args(["--pc", "zz"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_pmap2html_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let html = dir.path().join("crash.html");
    let output = Command::new(env!("CARGO_BIN_EXE_pmap2html"))
        .arg(fixture("pmap-sample.txt"))
        .arg("--regs")
        .arg(fixture("crash.regs"))
        .arg("--html")
        .arg(&html)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("HTML visualization saved to"));
    let page = std::fs::read_to_string(&html).unwrap();
    assert!(page.contains("Crash Context Analysis"));
    assert!(page.contains(">SP</span>"));
}
