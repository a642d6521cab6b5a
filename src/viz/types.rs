//! Public types and constants for the visualization module.

use crate::models::SeriesKey;
use crate::viz::refline::ReferenceLineSpec;
use plotters::style::RGBColor;

/// View-box width shared by every chart, in pixels.
pub const VIEW_WIDTH: u32 = 800;

/// Default view-box height, in pixels.
pub const VIEW_HEIGHT: u32 = 400;

/// Formats a Y-axis tick value for display.
pub type AxisFormatter = fn(f64) -> String;

/// Space around the plot area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Default for Margins {
    fn default() -> Self {
        Margins {
            top: 40,
            right: 60,
            bottom: 60,
            left: 90,
        }
    }
}

/// Everything a renderer needs to draw one chart.
///
/// `keys` and `colors` are parallel; stacked charts layer keys bottom-first in
/// the order given. `surface` names the output (the SVG file stem).
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub surface: String,
    pub title: String,
    pub y_label: String,
    pub keys: Vec<SeriesKey>,
    pub colors: Vec<RGBColor>,
    /// Tick formatter; plain currency when absent.
    pub y_format: Option<AxisFormatter>,
    /// Overrides [`VIEW_HEIGHT`] when set.
    pub height: Option<u32>,
    pub margins: Option<Margins>,
    /// Bracket lines to draw over the chart, if any.
    pub overlay: Option<ReferenceLineSpec>,
    /// Fixed Y-axis maximum; computed from the data when absent.
    pub y_max: Option<f64>,
}

impl SeriesSpec {
    pub fn new(surface: &str, title: &str, y_label: &str) -> Self {
        SeriesSpec {
            surface: surface.to_owned(),
            title: title.to_owned(),
            y_label: y_label.to_owned(),
            keys: Vec::new(),
            colors: Vec::new(),
            y_format: None,
            height: None,
            margins: None,
            overlay: None,
            y_max: None,
        }
    }

    pub fn keys(mut self, keys: &[SeriesKey]) -> Self {
        self.keys = keys.to_vec();
        self
    }

    pub fn colors(mut self, colors: &[RGBColor]) -> Self {
        self.colors = colors.to_vec();
        self
    }

    pub fn y_format(mut self, f: AxisFormatter) -> Self {
        self.y_format = Some(f);
        self
    }

    pub fn height(mut self, h: u32) -> Self {
        self.height = Some(h);
        self
    }

    pub fn overlay(mut self, overlay: ReferenceLineSpec) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn y_max(mut self, max: f64) -> Self {
        self.y_max = Some(max);
        self
    }

    /// Color for the series at `idx`, cycling when there are more keys than
    /// colors.
    pub fn color(&self, idx: usize) -> RGBColor {
        if self.colors.is_empty() {
            RGBColor(0, 0, 0)
        } else {
            self.colors[idx % self.colors.len()]
        }
    }
}
