//! Number and address formatting shared by the text and HTML reports

// Sizes are shown as approximate MiB/KiB; precision loss is fine for display
#![allow(clippy::cast_precision_loss)]

/// Decimal with `,` thousands separators: `1851392` → `1,851,392`.
#[must_use]
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `0x` plus at least 8 hex digits.
#[must_use]
pub fn hex8(addr: u64) -> String {
    format!("0x{addr:08x}")
}

/// `0x` plus at least 16 hex digits.
#[must_use]
pub fn hex16(addr: u64) -> String {
    format!("0x{addr:016x}")
}

#[must_use]
pub fn mib(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[must_use]
pub fn kib(bytes: u64) -> f64 {
    bytes as f64 / 1024.0
}

/// Share of `part` in `total` as a percentage; 0 when `total` is 0.
#[must_use]
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Centre `text` in a field of `width` columns.
pub(crate) fn centered(text: &str, width: usize) -> String {
    format!("{text:^width$}")
}
