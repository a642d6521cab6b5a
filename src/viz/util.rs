//! Utility functions for visualization: number formatting and chart palettes.

use num_format::{Locale, ToFormattedString};
use plotters::style::RGBColor;

/// Warm palette for the withdrawal and income charts.
/// Order: terracotta, gold, olive, slate gray, mauve, purple.
pub const COLORS: [RGBColor; 6] = [
    RGBColor(0xD9, 0x8B, 0x5F), // terracotta (#D98B5F)
    RGBColor(0xE0, 0xB5, 0x50), // gold       (#E0B550)
    RGBColor(0x8F, 0x8F, 0x4C), // olive      (#8F8F4C)
    RGBColor(0x70, 0x80, 0x90), // slate gray (#708090)
    RGBColor(0xB3, 0x8C, 0xB4), // mauve      (#B38CB4)
    RGBColor(0x93, 0x70, 0xDB), // purple     (#9370DB)
];

/// Muted cool palette for the mandatory-spending chart.
pub const COLORS_SPENDING: [RGBColor; 6] = [
    RGBColor(0x4E, 0x8B, 0xAF), // steel blue (#4E8BAF)
    RGBColor(0x76, 0xC0, 0xC0), // teal       (#76C0C0)
    RGBColor(0x8F, 0xBC, 0x8F), // sea green  (#8FBC8F)
    RGBColor(0xA9, 0xA9, 0xA9), // gray       (#A9A9A9)
    RGBColor(0x5F, 0x9E, 0xA0), // cadet blue (#5F9EA0)
    RGBColor(0x69, 0x69, 0x69), // dim gray   (#696969)
];

/// Dark palette for the AGI and conversion charts.
pub const COLORS_OTHER: [RGBColor; 6] = [
    RGBColor(0x19, 0x19, 0x70), // midnight   (#191970)
    RGBColor(0x00, 0x64, 0x00), // dark green (#006400)
    RGBColor(0x8B, 0x00, 0x00), // dark red   (#8B0000)
    RGBColor(0x48, 0x3D, 0x8B), // dark slate (#483D8B)
    RGBColor(0xB8, 0x86, 0x0B), // dark gold  (#B8860B)
    RGBColor(0x59, 0x59, 0x59), // gray       (#595959)
];

/// Single-series teal for the available-spending chart (#004040).
pub const SPENDING_TEAL: RGBColor = RGBColor(0x00, 0x40, 0x40);

/// Whole-dollar currency with thousands separators: `$1,234`.
pub fn format_currency(v: f64) -> String {
    let negative = v < 0.0;
    let whole = v.abs().round() as i64;
    let body = whole.to_formatted_string(&Locale::en);
    if negative {
        format!("-${body}")
    } else {
        format!("${body}")
    }
}

/// A rate as a percentage with one decimal: `0.223` becomes `22.3%`.
pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Compact currency for axis ticks: `$1.25M`, `$450K`, `$900`. Up to two
/// decimals, trailing zeros trimmed.
pub fn format_axis_compact(v: f64) -> String {
    let sign = if v < 0.0 { "-" } else { "" };
    let a = v.abs();
    if a >= 1.0e6 {
        format!("{sign}${}M", trim_decimals(a / 1.0e6))
    } else if a >= 1.0e3 {
        format!("{sign}${}K", trim_decimals(a / 1.0e3))
    } else {
        format!("{sign}${}", trim_decimals(a))
    }
}

/// Axis values expressed in thousands with one decimal, regardless of
/// magnitude: `12345` becomes `12.3k`, `900` becomes `0.9k`.
pub fn format_si_thousands(v: f64) -> String {
    format!("{:.1}k", v / 1000.0)
}

fn trim_decimals(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0');
    s.trim_end_matches('.').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(1234.0), "$1,234");
        assert_eq!(format_currency(1_234_567.4), "$1,234,567");
        assert_eq!(format_currency(-950.0), "-$950");
    }

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(format_percent(0.22), "22.0%");
        assert_eq!(format_percent(0.0495), "5.0%");
        assert_eq!(format_percent(0.223), "22.3%");
    }

    #[test]
    fn compact_axis_magnitudes() {
        assert_eq!(format_axis_compact(1_250_000.0), "$1.25M");
        assert_eq!(format_axis_compact(2_000_000.0), "$2M");
        assert_eq!(format_axis_compact(450_000.0), "$450K");
        assert_eq!(format_axis_compact(900.0), "$900");
        assert_eq!(format_axis_compact(0.0), "$0");
        assert_eq!(format_axis_compact(-450_000.0), "-$450K");
    }

    #[test]
    fn si_thousands_always_scales_by_1000() {
        assert_eq!(format_si_thousands(12_345.0), "12.3k");
        assert_eq!(format_si_thousands(900.0), "0.9k");
        assert_eq!(format_si_thousands(0.0), "0.0k");
    }
}
