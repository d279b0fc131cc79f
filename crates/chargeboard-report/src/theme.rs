//! Dashboard palette
//!
//! Shared by the stylesheet and the chart renderer so both stay in sync.

pub const BACKGROUND: &str = "#111217";
pub const CARD: &str = "#1a1b23";
pub const TEXT: &str = "#e0e0e0";
pub const MUTED_TEXT: &str = "#888888";
pub const GRID: &str = "#2a2b35";

pub const ACCENT: &str = "#3e6ae1";
pub const GREEN: &str = "#22c55e";
pub const ORANGE: &str = "#f59e0b";
pub const PURPLE: &str = "#a855f7";
pub const TEAL: &str = "#14b8a6";

/// Parse a `#rrggbb` color into its components
///
/// Malformed input yields black.
pub fn rgb(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    (channel(0..2), channel(2..4), channel(4..6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb() {
        assert_eq!(rgb(ACCENT), (0x3e, 0x6a, 0xe1));
        assert_eq!(rgb("#fff"), (0xff, 0, 0));
        assert_eq!(rgb("zz"), (0, 0, 0));
    }
}
