//! drawdown-viz
//!
//! Chart engine for the DrawdownCalc retirement dashboard: turns a
//! year-by-year drawdown projection into a set of coordinated SVG charts.
//!
//! ### Features
//! - Parse the optimization service's projection response into a tidy model
//! - Line and stacked-bar charts over any projection fields, in a fixed
//!   800x400 view box
//! - Dashed tax-bracket overlay lines on the AGI charts, split at the age-65
//!   deduction pivot
//! - One tooltip shared across all charts, driven by per-chart hit maps
//!
//! ### Example
//! ```no_run
//! use drawdown_viz::dashboard::Dashboard;
//! use drawdown_viz::models::ProjectionResult;
//! use drawdown_viz::viz::TooltipCoordinator;
//!
//! let body = std::fs::read_to_string("plan.json")?;
//! let result = ProjectionResult::from_json(&body, 59)?;
//! let mut dashboard = Dashboard::new("charts", TooltipCoordinator::new());
//! dashboard.render(&result)?;
//! dashboard.pointer_moved("withdrawals", 220.0, 180.0);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod dashboard;
pub mod models;
pub mod viz;

pub use dashboard::{Dashboard, RenderedChart};
pub use models::{ProjectionPoint, ProjectionResult, SeriesKey};
