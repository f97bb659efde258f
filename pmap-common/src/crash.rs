//! Crash register context and address resolution
//!
//! A crash report usually gives a handful of register values: program
//! counter, link register, stack pointer, frame pointer and maybe a backtrace.
//! Each value is resolved independently against the parsed map to find the
//! segment it points into and its offset in the backing binary.
//!
//! ```text
//! PC = 0xf79e245c
//!   segment      f79e0000-f7a00000 r-xp 00010000 /lib/libc.so.6
//!   in segment   0x245c               (PC - segment.start)
//!   in binary    0x1245c              (in segment + segment.offset)
//!   command      addr2line -f -C -i -e /lib/libc.so.6 0x1245c
//! ```

use std::fmt;
use std::ptr;

use crate::memory_map::MemoryMap;
use crate::segment::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "lowercase"))]
pub enum Register {
    Pc,
    Lr,
    Sp,
    Fp,
}

impl Register {
    pub const ALL: [Register; 4] = [Register::Pc, Register::Lr, Register::Sp, Register::Fp];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Register::Pc => "Program Counter (PC)",
            Register::Lr => "Link Register (LR)",
            Register::Sp => "Stack Pointer (SP)",
            Register::Fp => "Frame Pointer (FP)",
        }
    }

    #[must_use]
    pub fn short_name(&self) -> &'static str {
        match self {
            Register::Pc => "PC",
            Register::Lr => "LR",
            Register::Sp => "SP",
            Register::Fp => "FP",
        }
    }
}

/// Register values captured at crash time. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrashContext {
    pub pc: Option<u64>,
    pub lr: Option<u64>,
    pub sp: Option<u64>,
    pub fp: Option<u64>,
    pub backtrace: Vec<u64>,
}

impl CrashContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_register(mut self, register: Register, addr: u64) -> Self {
        *self.slot(register) = Some(addr);
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: Vec<u64>) -> Self {
        self.backtrace = backtrace;
        self
    }

    #[must_use]
    pub fn get(&self, register: Register) -> Option<u64> {
        match register {
            Register::Pc => self.pc,
            Register::Lr => self.lr,
            Register::Sp => self.sp,
            Register::Fp => self.fp,
        }
    }

    fn slot(&mut self, register: Register) -> &mut Option<u64> {
        match register {
            Register::Pc => &mut self.pc,
            Register::Lr => &mut self.lr,
            Register::Sp => &mut self.sp,
            Register::Fp => &mut self.fp,
        }
    }

    /// Present registers in PC, LR, SP, FP order.
    pub fn registers(&self) -> impl Iterator<Item = (Register, u64)> + '_ {
        Register::ALL.into_iter().filter_map(|r| self.get(r).map(|addr| (r, addr)))
    }

    #[must_use]
    pub fn has_registers(&self) -> bool {
        self.registers().next().is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.has_registers() && self.backtrace.is_empty()
    }

    /// Present registers that `map` resolves to exactly `segment`.
    ///
    /// A register inside several overlapping segments belongs only to the one
    /// [`MemoryMap::find_segment`] returns.
    pub fn registers_in<'s>(
        &'s self,
        map: &'s MemoryMap,
        segment: &'s Segment,
    ) -> impl Iterator<Item = (Register, u64)> + 's {
        self.registers().filter(move |(_, addr)| {
            map.find_segment(*addr).is_some_and(|found| ptr::eq(found, segment))
        })
    }

    /// Short names of the registers resolving to `segment`.
    #[must_use]
    pub fn markers_for(&self, map: &MemoryMap, segment: &Segment) -> Vec<&'static str> {
        self.registers_in(map, segment).map(|(r, _)| r.short_name()).collect()
    }
}

/// An address resolved to the segment containing it.
///
/// Borrows the segment from the [`MemoryMap`] it was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrashLocation<'a> {
    pub addr: u64,
    pub segment: &'a Segment,
    pub offset_in_segment: u64,
    pub offset_in_binary: u64,
}

impl<'a> CrashLocation<'a> {
    /// Resolve `addr`; `None` if no segment contains it.
    #[must_use]
    pub fn resolve(map: &'a MemoryMap, addr: u64) -> Option<Self> {
        let segment = map.find_segment(addr)?;
        let offset_in_segment = addr - segment.start();
        Some(Self {
            addr,
            segment,
            offset_in_segment,
            offset_in_binary: offset_in_segment.saturating_add(segment.offset()),
        })
    }

    /// `addr2line` invocation for this location, when the segment has a
    /// backing file.
    #[must_use]
    pub fn debug_command(&self) -> DebugCommand {
        if self.segment.is_file_backed() {
            DebugCommand::Addr2Line {
                binary: self.segment.pathname().to_string(),
                offset: self.offset_in_binary,
            }
        } else {
            let mapping = if self.segment.pathname().is_empty() {
                "anonymous mapping"
            } else {
                self.segment.pathname()
            };
            DebugCommand::NotApplicable { mapping: mapping.to_string() }
        }
    }
}

/// External symbolization command, or why there is none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugCommand {
    Addr2Line { binary: String, offset: u64 },
    NotApplicable { mapping: String },
}

impl DebugCommand {
    #[must_use]
    pub fn is_applicable(&self) -> bool {
        matches!(self, DebugCommand::Addr2Line { .. })
    }
}

impl fmt::Display for DebugCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebugCommand::Addr2Line { binary, offset } => {
                write!(f, "addr2line -f -C -i -e {binary} 0x{offset:x}")
            }
            DebugCommand::NotApplicable { mapping } => {
                write!(f, "# addr2line not applicable for {mapping}")
            }
        }
    }
}
