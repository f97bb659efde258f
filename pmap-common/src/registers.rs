//! Import of crash register dumps
//!
//! Crash handlers commonly write a register file next to the maps dump
//! (`crash_dump_<pid>.regs`). Two layouts are recognised:
//!
//! ```text
//! x86-64 registers          ARM64 registers
//! rip: 000055d4c8a0114d     pc  : 0000aaaab2c01a3c
//! rsp: 00007ffd2b4c9e10     sp  : 0000ffffe6b5e2d0
//! rbp: 00007ffd2b4c9e30     x29 : 0000ffffe6b5e2e0
//!                           x30 : 0000aaaab2c01a10
//! ```
//!
//! The architecture is detected from the `x86-64` / `ARM64` marker text.

use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::crash::{CrashContext, Register};
use crate::errors::FormatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    Arm64,
    Unknown,
}

impl Arch {
    fn detect(text: &str) -> Self {
        if text.contains("x86-64") {
            Arch::X86_64
        } else if text.contains("ARM64") {
            Arch::Arm64
        } else {
            Arch::Unknown
        }
    }

    /// Register names mapped onto the crash context slots.
    fn register_names(self) -> &'static [(&'static str, Register)] {
        const X86_64: &[(&str, Register)] =
            &[("rip", Register::Pc), ("rsp", Register::Sp), ("rbp", Register::Fp)];
        const ARM64: &[(&str, Register)] = &[
            ("pc", Register::Pc),
            ("sp", Register::Sp),
            ("x29", Register::Fp),
            ("x30", Register::Lr),
        ];
        match self {
            Arch::X86_64 => X86_64,
            Arch::Arm64 => ARM64,
            Arch::Unknown => &[],
        }
    }
}

/// All registers found in a dump, names lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDump {
    pub arch: Arch,
    pub registers: BTreeMap<String, u64>,
}

impl RegisterDump {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u64> {
        self.registers.get(name).copied()
    }

    /// Crash context from the key registers of the detected architecture.
    ///
    /// For an unknown architecture the x86-64 names are tried first, then the
    /// ARM64 ones.
    #[must_use]
    pub fn crash_context(&self) -> CrashContext {
        let names = match self.arch {
            Arch::Unknown if self.registers.contains_key("rip") => Arch::X86_64.register_names(),
            Arch::Unknown => Arch::Arm64.register_names(),
            arch => arch.register_names(),
        };

        names.iter().fold(CrashContext::new(), |ctx, (name, register)| match self.get(name) {
            Some(addr) => ctx.with_register(*register, addr),
            None => ctx,
        })
    }
}

/// Parse the text of a register dump.
#[must_use]
pub fn parse_register_dump(text: &str) -> RegisterDump {
    let arch = Arch::detect(text);
    let mut registers = BTreeMap::new();

    for line in text.lines() {
        if let Some((name, value)) = parse_register_line(line, arch) {
            registers.insert(name, value);
        }
    }

    debug!("Parsed {} registers ({arch:?})", registers.len());
    RegisterDump { arch, registers }
}

/// Read and parse a register dump file.
///
/// # Errors
/// Returns [`FormatError::SourceUnavailable`] if the file cannot be read.
pub fn load_register_dump(path: impl AsRef<Path>) -> Result<RegisterDump, FormatError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| FormatError::unavailable(path, e))?;
    Ok(parse_register_dump(&String::from_utf8_lossy(&bytes)))
}

/// `name: value` (x86-64) or `name : value` (ARM64). Unknown dumps accept both.
fn parse_register_line(line: &str, arch: Arch) -> Option<(String, u64)> {
    let (name, value) = line.split_once(':')?;

    let spaced = name.ends_with(char::is_whitespace);
    let layout_ok = match arch {
        Arch::X86_64 => !spaced,
        Arch::Arm64 => spaced,
        Arch::Unknown => true,
    };
    if !layout_ok {
        return None;
    }

    let name = name.split_whitespace().last()?;
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    let value = value.split_whitespace().next()?;
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    Some((name.to_ascii_lowercase(), u64::from_str_radix(digits, 16).ok()?))
}
