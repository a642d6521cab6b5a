//! Horizontal bracket-threshold overlays for the AGI charts.
//!
//! Each tax bracket's lower bound, shifted up by the applicable standard
//! deduction, becomes a dashed horizontal line at that gross-income level.
//! Because the federal deduction grows at a pivot age, a federal overlay can
//! split into two segments at the pivot's column.

use plotters::style::RGBColor;

use crate::models::{PivotAdjustment, TaxBracket};

/// How the standard deduction shifts bracket thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeductionRule {
    /// One deduction for the whole age span (state overlays).
    Flat(f64),
    /// Deduction changes at a pivot age (federal overlays).
    AgePivot(PivotAdjustment),
}

/// Dash pattern and color for one overlay's lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub color: RGBColor,
    /// Dash on/off lengths in pixels.
    pub dash_on: f64,
    pub dash_off: f64,
}

/// One bracket table to overlay, with its deduction rule and line style.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketOverlay {
    pub brackets: Vec<TaxBracket>,
    pub deduction: DeductionRule,
    pub style: OverlayStyle,
}

/// All overlays for one chart. Federal AGI carries two (ordinary income and
/// capital gains), state AGI carries one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceLineSpec {
    pub overlays: Vec<BracketOverlay>,
}

/// A computed overlay line: threshold in data units, horizontal extent in
/// pixels, and the bracket rate for its label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// Gross-income threshold, to be mapped through the Y scale.
    pub threshold: f64,
    pub x0: f64,
    pub x1: f64,
    pub rate: f64,
}

/// Compute the visible line segments for one overlay.
///
/// `ages` is the chart's X domain in ascending order, `y_domain` its Y data
/// domain, `x_range` the plot's horizontal pixel extent. `pivot_x` is the
/// pixel position of the pivot age's column start; it is only consulted when
/// the ages straddle an [`DeductionRule::AgePivot`] boundary.
///
/// Thresholds are visible only strictly inside the Y domain: a line at or
/// beyond either end is dropped rather than drawn on top of an axis.
pub fn compute_segments(
    overlay: &BracketOverlay,
    ages: &[u32],
    y_domain: (f64, f64),
    x_range: (f64, f64),
    pivot_x: Option<f64>,
) -> Vec<LineSegment> {
    let (Some(&first), Some(&last)) = (ages.first(), ages.last()) else {
        return Vec::new();
    };
    let (x0, x1) = x_range;

    // Each span is a deduction amount and the x extent it applies to.
    let mut spans: Vec<(f64, f64, f64)> = Vec::with_capacity(2);
    match overlay.deduction {
        DeductionRule::Flat(d) => spans.push((d, x0, x1)),
        DeductionRule::AgePivot(adj) => {
            if last < adj.pivot_age {
                spans.push((adj.deduction_below, x0, x1));
            } else if first >= adj.pivot_age {
                spans.push((adj.deduction_at_or_above, x0, x1));
            } else {
                let split = pivot_x.unwrap_or(x0);
                spans.push((adj.deduction_below, x0, split));
                spans.push((adj.deduction_at_or_above, split, x1));
            }
        }
    }

    let mut segments = Vec::new();
    for bracket in &overlay.brackets {
        for &(deduction, sx0, sx1) in &spans {
            let threshold = bracket.from_income + deduction;
            if threshold > y_domain.0 && threshold < y_domain.1 {
                segments.push(LineSegment {
                    threshold,
                    x0: sx0,
                    x1: sx1,
                    rate: bracket.rate,
                });
            }
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::style::colors::BLACK;

    fn bracket(rate: f64, from: f64) -> TaxBracket {
        TaxBracket {
            rate,
            from_income: from,
            to_income: 1.0e8,
        }
    }

    fn overlay(deduction: DeductionRule) -> BracketOverlay {
        BracketOverlay {
            brackets: vec![bracket(0.10, 0.0), bracket(0.12, 11_600.0), bracket(0.22, 47_150.0)],
            deduction,
            style: OverlayStyle {
                color: BLACK,
                dash_on: 6.0,
                dash_off: 2.0,
            },
        }
    }

    #[test]
    fn straddling_ages_split_each_threshold_at_the_pivot() {
        let adj = PivotAdjustment {
            pivot_age: 65,
            deduction_below: 15_000.0,
            deduction_at_or_above: 17_000.0,
        };
        let ages: Vec<u32> = (55..=75).collect();
        let segs = compute_segments(
            &overlay(DeductionRule::AgePivot(adj)),
            &ages,
            (0.0, 100_000.0),
            (0.0, 650.0),
            Some(310.0),
        );
        // Three brackets, two spans each, all thresholds inside the domain.
        assert_eq!(segs.len(), 6);
        let first_bracket: Vec<&LineSegment> =
            segs.iter().filter(|s| s.rate == 0.10).collect();
        assert_eq!(first_bracket[0].threshold, 15_000.0);
        assert_eq!((first_bracket[0].x0, first_bracket[0].x1), (0.0, 310.0));
        assert_eq!(first_bracket[1].threshold, 17_000.0);
        assert_eq!((first_bracket[1].x0, first_bracket[1].x1), (310.0, 650.0));
    }

    #[test]
    fn all_ages_past_the_pivot_use_the_larger_deduction_full_width() {
        let adj = PivotAdjustment {
            pivot_age: 65,
            deduction_below: 15_000.0,
            deduction_at_or_above: 17_000.0,
        };
        let ages: Vec<u32> = (70..=80).collect();
        let segs = compute_segments(
            &overlay(DeductionRule::AgePivot(adj)),
            &ages,
            (0.0, 100_000.0),
            (0.0, 650.0),
            None,
        );
        assert_eq!(segs.len(), 3);
        for s in &segs {
            assert_eq!((s.x0, s.x1), (0.0, 650.0));
        }
        assert_eq!(segs[0].threshold, 17_000.0);
    }

    #[test]
    fn thresholds_outside_the_domain_are_dropped() {
        let segs = compute_segments(
            &overlay(DeductionRule::Flat(5_000.0)),
            &[59, 60, 61],
            (5_000.0, 40_000.0),
            (0.0, 650.0),
            None,
        );
        // 0 + 5000 sits exactly on the lower bound, 47150 + 5000 is past the
        // top; only the 12% threshold survives.
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].threshold, 16_600.0);
        assert_eq!(segs[0].rate, 0.12);
    }

    #[test]
    fn empty_age_domain_yields_no_segments() {
        let segs = compute_segments(
            &overlay(DeductionRule::Flat(5_000.0)),
            &[],
            (0.0, 100_000.0),
            (0.0, 650.0),
            None,
        );
        assert!(segs.is_empty());
    }
}
