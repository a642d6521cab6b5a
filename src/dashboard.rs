//! Chart orchestrator: owns the dashboard's chart catalog, renders every
//! chart for a projection result, and routes pointer events to the shared
//! tooltip.

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use plotters::style::RGBColor;

use crate::models::{ProjectionResult, SeriesKey};
use crate::viz::refline::{BracketOverlay, DeductionRule, OverlayStyle, ReferenceLineSpec};
use crate::viz::stack::{max_total, stack_series};
use crate::viz::tooltip::TooltipCoordinator;
use crate::viz::util::{
    COLORS, COLORS_OTHER, COLORS_SPENDING, SPENDING_TEAL, format_axis_compact, format_si_thousands,
};
use crate::viz::{HitMap, SeriesSpec, render_line_chart, render_stacked_bar_chart};

/// Dash color for ordinary-income and state bracket lines (CSS gray).
const OVERLAY_GRAY: RGBColor = RGBColor(0x80, 0x80, 0x80);

/// Dash color for capital-gains bracket lines (CSS darkgray).
const OVERLAY_DARK_GRAY: RGBColor = RGBColor(0xA9, 0xA9, 0xA9);

/// Which renderer a catalog entry uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChartKind {
    Line,
    StackedBar,
}

/// One chart produced by a render pass.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    /// Surface name, also the SVG file stem.
    pub surface: String,
    pub path: PathBuf,
    pub hits: HitMap,
}

/// Renders the full dashboard into a directory of SVG files, one per chart
/// surface, and keeps the hit maps for tooltip routing.
///
/// A render pass is a full rebuild: previous surfaces are cleared first, so
/// rendering the same result twice is idempotent and rendering a new result
/// leaves nothing stale behind.
pub struct Dashboard {
    out_dir: PathBuf,
    tooltip: Rc<TooltipCoordinator>,
    charts: Vec<RenderedChart>,
}

impl Dashboard {
    pub fn new(out_dir: impl Into<PathBuf>, tooltip: Rc<TooltipCoordinator>) -> Self {
        Dashboard {
            out_dir: out_dir.into(),
            tooltip,
            charts: Vec::new(),
        }
    }

    pub fn tooltip(&self) -> &Rc<TooltipCoordinator> {
        &self.tooltip
    }

    /// Charts produced by the last render pass, in catalog order.
    pub fn charts(&self) -> &[RenderedChart] {
        &self.charts
    }

    /// Clear previous output, then render every catalog chart for `result`.
    ///
    /// An empty projection clears the dashboard and renders nothing.
    pub fn render(&mut self, result: &ProjectionResult) -> Result<()> {
        let catalog = catalog(result);
        self.clear(&catalog)?;
        if result.years.is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("creating chart directory {:?}", self.out_dir))?;
        for (kind, spec) in catalog {
            let path = self.out_dir.join(format!("{}.svg", spec.surface));
            let hits = match kind {
                ChartKind::Line => render_line_chart(&result.years, &spec, &path)?,
                ChartKind::StackedBar => render_stacked_bar_chart(&result.years, &spec, &path)?,
            };
            self.charts.push(RenderedChart {
                surface: spec.surface,
                path,
                hits,
            });
        }
        Ok(())
    }

    /// Remove every surface the catalog can produce, whether or not the last
    /// pass rendered it.
    fn clear(&mut self, catalog: &[(ChartKind, SeriesSpec)]) -> Result<()> {
        for (_, spec) in catalog {
            let path = self.out_dir.join(format!("{}.svg", spec.surface));
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e).with_context(|| format!("clearing {path:?}")),
            }
        }
        self.charts.clear();
        Ok(())
    }

    /// Route a pointer position on one chart surface to the shared tooltip.
    pub fn pointer_moved(&self, surface: &str, px: f64, py: f64) {
        match self.charts.iter().find(|c| c.surface == surface) {
            Some(chart) => self.tooltip.pointer_moved(&chart.hits, px, py),
            None => self.tooltip.hide(),
        }
    }
}

/// The dashboard's eight chart surfaces, in page order.
fn catalog(result: &ProjectionResult) -> Vec<(ChartKind, SeriesSpec)> {
    let years = &result.years;
    let stacked_max = |keys: &[SeriesKey]| max_total(&stack_series(years, keys));

    let mut charts = Vec::with_capacity(8);

    charts.push((
        ChartKind::Line,
        SeriesSpec::new("withdrawals", "Withdrawals & Conversions", "Dollars").keys(&[
            SeriesKey::BrokerageWithdraw,
            SeriesKey::IraWithdraw,
            SeriesKey::RothWithdraw,
            SeriesKey::IraToRoth,
        ])
        .colors(&[COLORS[0], COLORS[1], COLORS[2], COLORS_OTHER[5]])
        .y_format(format_axis_compact),
    ));

    let balance_keys = [
        SeriesKey::BrokerageBalance,
        SeriesKey::IraBalance,
        SeriesKey::RothBalance,
    ];
    charts.push((
        ChartKind::StackedBar,
        SeriesSpec::new("account-balances", "Account Balances", "Balance")
            .keys(&balance_keys)
            .colors(&COLORS)
            .y_format(format_axis_compact)
            .y_max(stacked_max(&balance_keys)),
    ));

    let income_keys = [
        SeriesKey::BrokerageWithdraw,
        SeriesKey::IraWithdraw,
        SeriesKey::RothWithdraw,
        SeriesKey::SocialSecurity,
        SeriesKey::CgdSpendable,
        SeriesKey::CashWithdraw,
    ];
    charts.push((
        ChartKind::StackedBar,
        SeriesSpec::new("income-sources", "Income Sources", "Dollars (thousands)")
            .keys(&income_keys)
            .colors(&COLORS)
            .y_format(format_si_thousands)
            .y_max(stacked_max(&income_keys)),
    ));

    let spending_keys = [
        SeriesKey::FedTax,
        SeriesKey::StateTax,
        SeriesKey::AcaHcPayment,
    ];
    charts.push((
        ChartKind::StackedBar,
        SeriesSpec::new("mandatory-spending", "Mandatory Spending", "Dollars (thousands)")
            .keys(&spending_keys)
            .colors(&COLORS_SPENDING)
            .y_format(format_si_thousands)
            .y_max(stacked_max(&spending_keys)),
    ));

    let fed_agi_keys = [SeriesKey::OrdinaryIncome, SeriesKey::TotalCapitalGains];
    let mut federal_agi = SeriesSpec::new("federal-agi", "Federal AGI", "AGI")
        .keys(&fed_agi_keys)
        .colors(&COLORS_OTHER)
        .y_format(format_axis_compact)
        .y_max(stacked_max(&fed_agi_keys));
    if let Some(fed) = &result.federal {
        let pivot = DeductionRule::AgePivot(fed.pivot_adjustment());
        federal_agi = federal_agi.overlay(ReferenceLineSpec {
            overlays: vec![
                BracketOverlay {
                    brackets: fed.taxtable.clone(),
                    deduction: pivot,
                    style: OverlayStyle {
                        color: OVERLAY_GRAY,
                        dash_on: 6.0,
                        dash_off: 2.0,
                    },
                },
                BracketOverlay {
                    brackets: fed.cg_taxtable.clone(),
                    deduction: pivot,
                    style: OverlayStyle {
                        color: OVERLAY_DARK_GRAY,
                        dash_on: 2.0,
                        dash_off: 6.0,
                    },
                },
            ],
        });
    }
    charts.push((ChartKind::StackedBar, federal_agi));

    let state_agi_keys = [SeriesKey::StateAgi];
    let mut state_agi = SeriesSpec::new("state-agi", "State AGI", "AGI")
        .keys(&state_agi_keys)
        .colors(&COLORS_OTHER)
        .y_format(format_axis_compact)
        .y_max(stacked_max(&state_agi_keys));
    if let Some(state) = &result.state {
        state_agi = state_agi.overlay(ReferenceLineSpec {
            overlays: vec![BracketOverlay {
                brackets: state.taxtable.clone(),
                deduction: DeductionRule::Flat(state.standard_deduction),
                style: OverlayStyle {
                    color: OVERLAY_GRAY,
                    dash_on: 2.0,
                    dash_off: 4.0,
                },
            }],
        });
    }
    charts.push((ChartKind::StackedBar, state_agi));

    let automatic_keys = [
        SeriesKey::IraRmd,
        SeriesKey::SocialSecurity,
        SeriesKey::CgdSpendable,
        SeriesKey::CashWithdraw,
    ];
    charts.push((
        ChartKind::StackedBar,
        SeriesSpec::new("automatic-income", "Automatic Income", "Dollars (thousands)")
            .keys(&automatic_keys)
            .colors(&[COLORS[1], COLORS[3], COLORS[4], COLORS[5]])
            .y_format(format_si_thousands)
            .y_max(stacked_max(&automatic_keys)),
    ));

    let spending_key = [SeriesKey::AvailableSpending];
    charts.push((
        ChartKind::StackedBar,
        SeriesSpec::new("available-spending", "Available Spending", "Dollars")
            .keys(&spending_key)
            .colors(&[SPENDING_TEAL])
            .y_format(format_axis_compact)
            .height(300)
            .y_max(stacked_max(&spending_key)),
    ));

    charts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FederalTaxData, StateTaxData, TaxBracket};

    fn result_with_tax_tables() -> ProjectionResult {
        ProjectionResult {
            years: Vec::new(),
            federal: Some(FederalTaxData {
                taxtable: vec![TaxBracket {
                    rate: 0.10,
                    from_income: 0.0,
                    to_income: 11_600.0,
                }],
                cg_taxtable: vec![TaxBracket {
                    rate: 0.15,
                    from_income: 47_025.0,
                    to_income: 1.0e8,
                }],
                nii: 200_000.0,
                standard_deduction: 15_000.0,
                standard_deduction_extra65: 2_000.0,
                status: "Single".into(),
            }),
            state: Some(StateTaxData {
                taxtable: vec![TaxBracket {
                    rate: 0.04,
                    from_income: 0.0,
                    to_income: 10_000.0,
                }],
                standard_deduction: 14_600.0,
                status: "DC_Single".into(),
                taxes_retirement_income: true,
                taxes_ss: false,
            }),
            spending_floor: None,
            end_of_plan_assets: None,
            status: None,
        }
    }

    #[test]
    fn catalog_has_eight_surfaces_with_overlays_on_the_agi_charts() {
        let charts = catalog(&result_with_tax_tables());
        assert_eq!(charts.len(), 8);
        let surfaces: Vec<&str> = charts.iter().map(|(_, s)| s.surface.as_str()).collect();
        assert_eq!(
            surfaces,
            vec![
                "withdrawals",
                "account-balances",
                "income-sources",
                "mandatory-spending",
                "federal-agi",
                "state-agi",
                "automatic-income",
                "available-spending",
            ]
        );
        for (_, spec) in &charts {
            let expect_overlay = spec.surface == "federal-agi" || spec.surface == "state-agi";
            assert_eq!(spec.overlay.is_some(), expect_overlay, "{}", spec.surface);
        }
        let federal = charts[4].1.overlay.as_ref().unwrap();
        assert_eq!(federal.overlays.len(), 2);
        let state = charts[5].1.overlay.as_ref().unwrap();
        assert_eq!(state.overlays.len(), 1);
        assert_eq!(
            state.overlays[0].deduction,
            DeductionRule::Flat(14_600.0)
        );
    }

    #[test]
    fn missing_tax_tables_mean_no_overlays() {
        let mut result = result_with_tax_tables();
        result.federal = None;
        result.state = None;
        let charts = catalog(&result);
        assert!(charts.iter().all(|(_, s)| s.overlay.is_none()));
    }

    #[test]
    fn axis_formatters_scale_the_withdrawal_and_automatic_income_charts() {
        let charts = catalog(&result_with_tax_tables());
        let format_for = |surface: &str| {
            charts
                .iter()
                .find(|(_, s)| s.surface == surface)
                .and_then(|(_, s)| s.y_format)
                .expect(surface)
        };
        // Compact currency on the withdrawals line chart.
        assert_eq!(format_for("withdrawals")(30_000.0), "$30K");
        // SI-thousands on automatic income, like the other income charts.
        assert_eq!(format_for("automatic-income")(5_000.0), "5.0k");
        assert_eq!(format_for("income-sources")(5_000.0), "5.0k");
    }

    #[test]
    fn only_the_first_chart_is_a_line_chart() {
        let charts = catalog(&result_with_tax_tables());
        assert_eq!(charts[0].0, ChartKind::Line);
        assert!(charts[1..].iter().all(|(k, _)| *k == ChartKind::StackedBar));
    }
}
