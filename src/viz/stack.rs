//! Turns per-key series into cumulative stacked bands, bottom first.

use crate::models::{ProjectionPoint, SeriesKey};

/// One layer of a stacked column: the key it belongs to and the cumulative
/// lower/upper bounds of its band in data units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackedBand {
    pub key: SeriesKey,
    pub lower: f64,
    pub upper: f64,
}

impl StackedBand {
    /// The layer's own (non-cumulative) value.
    pub fn value(&self) -> f64 {
        self.upper - self.lower
    }
}

/// All bands for one age, in the caller's key order, plus the column total.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedColumn {
    pub age: u32,
    pub bands: Vec<StackedBand>,
    pub total: f64,
}

/// Stack `keys` over `points`, accumulating in the given key order so the
/// first key sits at the bottom of every column.
pub fn stack_series(points: &[ProjectionPoint], keys: &[SeriesKey]) -> Vec<StackedColumn> {
    points
        .iter()
        .map(|p| {
            let mut cumulative = 0.0;
            let bands = keys
                .iter()
                .map(|&key| {
                    let lower = cumulative;
                    cumulative += key.value(p);
                    StackedBand {
                        key,
                        lower,
                        upper: cumulative,
                    }
                })
                .collect();
            StackedColumn {
                age: p.age,
                bands,
                total: cumulative,
            }
        })
        .collect()
}

/// Largest column total across a stacked dataset. Zero when empty.
pub fn max_total(columns: &[StackedColumn]) -> f64 {
    columns.iter().fold(0.0, |acc, c| acc.max(c.total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(age: u32, brokerage: f64, ira: f64, roth: f64) -> ProjectionPoint {
        ProjectionPoint {
            age,
            brokerage_withdraw: brokerage,
            ira_withdraw: ira,
            roth_withdraw: roth,
            ..ProjectionPoint::default()
        }
    }

    const KEYS: [SeriesKey; 3] = [
        SeriesKey::BrokerageWithdraw,
        SeriesKey::IraWithdraw,
        SeriesKey::RothWithdraw,
    ];

    #[test]
    fn bands_accumulate_in_key_order() {
        let points = vec![
            point(59, 1000.0, 0.0, 0.0),
            point(60, 0.0, 1500.0, 500.0),
            point(61, 500.0, 250.0, 250.0),
        ];
        let stacked = stack_series(&points, &KEYS);
        assert_eq!(stacked.len(), 3);

        let totals: Vec<f64> = stacked.iter().map(|c| c.total).collect();
        assert_eq!(totals, vec![1000.0, 2000.0, 1000.0]);

        // Bottom layer's top edge is its own value.
        let bottom_tops: Vec<f64> = stacked.iter().map(|c| c.bands[0].upper).collect();
        assert_eq!(bottom_tops, vec![1000.0, 0.0, 500.0]);

        // Each column's bottom band starts at zero and bands are contiguous.
        for col in &stacked {
            assert_eq!(col.bands[0].lower, 0.0);
            for pair in col.bands.windows(2) {
                assert_eq!(pair[0].upper, pair[1].lower);
            }
            assert_eq!(col.bands.last().unwrap().upper, col.total);
        }
    }

    #[test]
    fn zero_value_layers_collapse_but_keep_position() {
        let stacked = stack_series(&[point(70, 100.0, 0.0, 50.0)], &KEYS);
        let col = &stacked[0];
        assert_eq!(col.bands[1].value(), 0.0);
        assert_eq!(col.bands[1].lower, col.bands[1].upper);
        assert_eq!(col.bands[2].lower, 100.0);
        assert_eq!(col.total, 150.0);
    }

    #[test]
    fn empty_input_stacks_to_nothing() {
        let stacked = stack_series(&[], &KEYS);
        assert!(stacked.is_empty());
        assert_eq!(max_total(&stacked), 0.0);
    }

    #[test]
    fn max_total_finds_tallest_column() {
        let points = vec![point(59, 10.0, 0.0, 0.0), point(60, 5.0, 7.0, 0.0)];
        let stacked = stack_series(&points, &KEYS);
        assert_eq!(max_total(&stacked), 12.0);
    }
}
