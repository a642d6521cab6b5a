//! Linear and band coordinate mappings from a data domain to a pixel range.

/// Continuous affine mapping from `[d0, d1]` to `[r0, r1]`.
///
/// The range may be inverted (`r0 > r1`), which is how Y axes are built:
/// domain zero at the bottom of the plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            d0: domain.0,
            d1: domain.1,
            r0: range.0,
            r1: range.1,
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.d0, self.d1)
    }

    pub fn range(&self) -> (f64, f64) {
        (self.r0, self.r1)
    }

    /// Map a domain value to a range coordinate.
    ///
    /// A degenerate domain (`d0 == d1`) maps every value to the middle of the
    /// range rather than dividing by zero.
    pub fn scale(&self, v: f64) -> f64 {
        let span = self.d1 - self.d0;
        if span == 0.0 {
            return (self.r0 + self.r1) / 2.0;
        }
        self.r0 + (v - self.d0) / span * (self.r1 - self.r0)
    }

    /// Inverse mapping: range coordinate back to a domain value.
    pub fn invert(&self, px: f64) -> f64 {
        let rspan = self.r1 - self.r0;
        if rspan == 0.0 || self.d1 == self.d0 {
            return self.d0;
        }
        self.d0 + (px - self.r0) / rspan * (self.d1 - self.d0)
    }

    /// Extend the domain outward to multiples of a round tick step, for
    /// readable Y axes. Two passes, so the step settles on the widened span.
    pub fn nice(mut self, count: usize) -> Self {
        for _ in 0..2 {
            let step = tick_step(self.d0, self.d1, count);
            if step > 0.0 {
                self.d0 = (self.d0 / step).floor() * step;
                self.d1 = (self.d1 / step).ceil() * step;
            }
        }
        self
    }

    /// Round tick values covering the domain, at a 1/2/5 ladder step sized to
    /// yield roughly `count` ticks.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let step = tick_step(self.d0, self.d1, count);
        if step <= 0.0 {
            return vec![self.d0];
        }
        let start = (self.d0 / step).ceil() as i64;
        let stop = (self.d1 / step).floor() as i64;
        (start..=stop).map(|i| i as f64 * step).collect()
    }
}

/// Step from the 1-2-5 ladder producing about `count` intervals over
/// `[d0, d1]`. Zero for a degenerate span.
fn tick_step(d0: f64, d1: f64, count: usize) -> f64 {
    let span = d1 - d0;
    if span <= 0.0 || count == 0 {
        return 0.0;
    }
    let raw = span / count as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    // Thresholds are sqrt(50), sqrt(10), sqrt(2): round to the nearest ladder
    // step in log space.
    let factor = if residual >= 7.071 {
        10.0
    } else if residual >= 3.162 {
        5.0
    } else if residual >= 1.414 {
        2.0
    } else {
        1.0
    };
    magnitude * factor
}

/// Discrete mapping from an ordered set of ages to contiguous equal-width
/// bands across `[r0, r1]`, with padding as a fraction of the band step.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<u32>,
    r0: f64,
    r1: f64,
    step: f64,
    bandwidth: f64,
    start: f64,
}

/// Default inter-band padding, 10% of the step.
pub const BAND_PADDING: f64 = 0.1;

impl BandScale {
    pub fn new(domain: Vec<u32>, range: (f64, f64)) -> Self {
        Self::with_padding(domain, range, BAND_PADDING)
    }

    pub fn with_padding(domain: Vec<u32>, range: (f64, f64), padding: f64) -> Self {
        let (r0, r1) = range;
        let span = r1 - r0;
        let n = domain.len();
        let (step, bandwidth, start) = match n {
            0 => (0.0, 0.0, r0),
            // A single band fills the whole range.
            1 => (span, span, r0),
            _ => {
                let step = span / (n as f64 - padding + 2.0 * padding);
                let bandwidth = step * (1.0 - padding);
                let start = r0 + (span - step * (n as f64 - padding)) / 2.0;
                (step, bandwidth, start)
            }
        };
        Self {
            domain,
            r0,
            r1,
            step,
            bandwidth,
            start,
        }
    }

    pub fn domain(&self) -> &[u32] {
        &self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        (self.r0, self.r1)
    }

    /// Left edge of the band for `age`, or `None` if the age is not in the
    /// domain.
    pub fn position(&self, age: u32) -> Option<f64> {
        let idx = self.domain.iter().position(|&a| a == age)?;
        Some(self.start + self.step * idx as f64)
    }

    /// Width of every band.
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Distance between the left edges of adjacent bands.
    pub fn step(&self) -> f64 {
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_maps_domain_endpoints_to_range_endpoints() {
        let s = LinearScale::new((59.0, 89.0), (0.0, 650.0));
        assert_eq!(s.scale(59.0), 0.0);
        assert_eq!(s.scale(89.0), 650.0);
        // Inverted range, the Y-axis configuration.
        let y = LinearScale::new((0.0, 120_000.0), (300.0, 0.0));
        assert_eq!(y.scale(0.0), 300.0);
        assert_eq!(y.scale(120_000.0), 0.0);
    }

    #[test]
    fn linear_invert_round_trips() {
        let s = LinearScale::new((0.0, 50_000.0), (300.0, 0.0));
        let px = s.scale(12_345.0);
        assert!((s.invert(px) - 12_345.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_linear_domain_does_not_divide_by_zero() {
        let s = LinearScale::new((65.0, 65.0), (0.0, 650.0));
        assert_eq!(s.scale(65.0), 325.0);
        assert_eq!(s.invert(10.0), 65.0);
    }

    #[test]
    fn nice_extends_to_round_numbers() {
        let s = LinearScale::new((0.0, 93_417.0), (300.0, 0.0)).nice(10);
        let (d0, d1) = s.domain();
        assert_eq!(d0, 0.0);
        assert_eq!(d1, 100_000.0);
    }

    #[test]
    fn ticks_follow_125_ladder() {
        let s = LinearScale::new((0.0, 100.0), (0.0, 650.0));
        let t = s.ticks(10);
        assert_eq!(t.first().copied(), Some(0.0));
        assert_eq!(t.last().copied(), Some(100.0));
        let step = t[1] - t[0];
        assert_eq!(step, 10.0);
    }

    #[test]
    fn band_layout_stays_within_range() {
        let ages: Vec<u32> = (59..=89).collect();
        let s = BandScale::new(ages.clone(), (0.0, 800.0));
        assert_eq!(s.domain().len(), 31);
        assert!(s.bandwidth() > 0.0);
        assert!(s.step() > s.bandwidth());
        for &age in &ages {
            let x0 = s.position(age).unwrap();
            let x1 = x0 + s.bandwidth();
            assert!(x0 >= 0.0, "band start {x0} below range");
            assert!(x1 <= 800.0, "band end {x1} beyond range");
        }
        // Gap between adjacent bands is step - bandwidth.
        let gap = s.step() - s.bandwidth();
        let a = s.position(59).unwrap();
        let b = s.position(60).unwrap();
        assert!(((b - (a + s.bandwidth())) - gap).abs() < 1e-9);
    }

    #[test]
    fn single_band_fills_range() {
        let s = BandScale::new(vec![70], (0.0, 650.0));
        assert_eq!(s.position(70), Some(0.0));
        assert_eq!(s.bandwidth(), 650.0);
    }

    #[test]
    fn unknown_age_has_no_band() {
        let s = BandScale::new(vec![59, 60, 61], (0.0, 650.0));
        assert_eq!(s.position(70), None);
    }
}
