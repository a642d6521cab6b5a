//! A single tooltip shared by every chart on the dashboard.
//!
//! Charts never own tooltip state. They register invisible hit targets while
//! drawing, and the coordinator decides what to show when the pointer moves.
//! Host pages poll [`TooltipCoordinator::display`] to position and fade the
//! actual tooltip element.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Offset from the pointer to the tooltip's top-left corner, in pixels.
pub const TOOLTIP_OFFSET: (f64, f64) = (15.0, -28.0);

/// Fade-in duration when a tooltip appears.
pub const FADE_IN: Duration = Duration::from_millis(200);

/// Fade-out duration when the pointer leaves a target.
pub const FADE_OUT: Duration = Duration::from_millis(500);

/// Geometry of one interactive region, in page pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitShape {
    Circle { cx: f64, cy: f64, r: f64 },
    Rect { x: f64, y: f64, w: f64, h: f64 },
}

impl HitShape {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        match *self {
            HitShape::Circle { cx, cy, r } => {
                let (dx, dy) = (px - cx, py - cy);
                dx * dx + dy * dy <= r * r
            }
            HitShape::Rect { x, y, w, h } => px >= x && px <= x + w && py >= y && py <= y + h,
        }
    }
}

/// A hit region and the tooltip text it reveals.
#[derive(Debug, Clone, PartialEq)]
pub struct HitTarget {
    pub shape: HitShape,
    pub content: String,
}

/// All hit targets of one rendered chart, in draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitMap {
    targets: Vec<HitTarget>,
}

impl HitMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, shape: HitShape, content: String) {
        self.targets.push(HitTarget { shape, content });
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn targets(&self) -> &[HitTarget] {
        &self.targets
    }

    /// The topmost target under the pointer. Later registrations are drawn on
    /// top, so the scan runs back to front.
    pub fn hit_test(&self, px: f64, py: f64) -> Option<&HitTarget> {
        self.targets.iter().rev().find(|t| t.shape.contains(px, py))
    }
}

/// What the host page should currently render for the tooltip.
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipDisplay {
    Hidden,
    /// Fading out over [`FADE_OUT`]; content stays put while it fades.
    FadingOut { content: String },
    /// Visible (or fading in over [`FADE_IN`]) at a page position.
    Visible { content: String, x: f64, y: f64 },
}

/// Shared tooltip state. One instance serves the whole dashboard, so a show
/// from one chart replaces whatever another chart put up.
#[derive(Debug, Default)]
pub struct TooltipCoordinator {
    state: RefCell<TooltipDisplay>,
}

impl Default for TooltipDisplay {
    fn default() -> Self {
        TooltipDisplay::Hidden
    }
}

impl TooltipCoordinator {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Show `content` near the pointer at `(px, py)`. Last writer wins.
    pub fn show(&self, content: &str, px: f64, py: f64) {
        *self.state.borrow_mut() = TooltipDisplay::Visible {
            content: content.to_owned(),
            x: px + TOOLTIP_OFFSET.0,
            y: py + TOOLTIP_OFFSET.1,
        };
    }

    /// Begin hiding the tooltip. Keeps the last content so the host can fade
    /// it out rather than blanking it.
    pub fn hide(&self) {
        let mut state = self.state.borrow_mut();
        *state = match &*state {
            TooltipDisplay::Visible { content, .. } => TooltipDisplay::FadingOut {
                content: content.clone(),
            },
            _ => TooltipDisplay::Hidden,
        };
    }

    pub fn display(&self) -> TooltipDisplay {
        self.state.borrow().clone()
    }

    /// Route a pointer position against a chart's hit map: show the topmost
    /// target under the pointer, or hide when there is none.
    pub fn pointer_moved(&self, map: &HitMap, px: f64, py: f64) {
        match map.hit_test(px, py) {
            Some(target) => self.show(&target.content, px, py),
            None => self.hide(),
        }
    }
}
