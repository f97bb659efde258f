//! Report colour theme
//!
//! One colour per segment category, shared by the HTML segment bars, legend
//! and table bullets.

use pmap_common::Category;

pub const CODE: &str = "#4CAF50";
pub const DATA: &str = "#2196F3";
pub const RODATA: &str = "#9C27B0";
pub const BSS: &str = "#FF9800";
pub const HEAP: &str = "#F44336";
pub const STACK: &str = "#00BCD4";
pub const ANON: &str = "#9E9E9E";
pub const VDSO: &str = "#795548";
pub const UNKNOWN: &str = "#607D8B";

/// Marker badge colour for crash registers
pub const CRASH_MARKER: &str = "#E53935";

#[must_use]
pub fn category_color(category: Category) -> &'static str {
    match category {
        Category::Code => CODE,
        Category::Data => DATA,
        Category::Rodata => RODATA,
        Category::Bss => BSS,
        Category::Heap => HEAP,
        Category::Stack => STACK,
        Category::Anon => ANON,
        Category::Vdso => VDSO,
        Category::Unknown => UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_distinct_color() {
        let mut colors: Vec<&str> = Category::ALL.iter().map(|c| category_color(*c)).collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), Category::ALL.len());
    }
}
