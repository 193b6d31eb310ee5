use std::str::FromStr;

use plotters::style::RGBColor;

///
/// A color ramp: ordered RGB stops with linear interpolation between them.
/// Position 0.0 is the first stop, 1.0 the last; out-of-range positions
/// clamp.
///
#[derive(Clone, Debug)]
pub struct ColorRamp {
    stops: Vec<RGBColor>,
}

impl ColorRamp {
    pub fn new(stops: Vec<RGBColor>) -> ColorRamp {
        assert!(stops.len() >= 2, "a ramp needs at least two stops");
        ColorRamp { stops }
    }

    /// Green -> black -> red, the classic two-color expression heatmap ramp.
    pub fn green_black_red() -> ColorRamp {
        ColorRamp::new(vec![
            RGBColor(0, 170, 0),
            RGBColor(0, 0, 0),
            RGBColor(220, 0, 0),
        ])
    }

    /// Blue -> white -> red, for centered data such as z-scores.
    pub fn blue_white_red() -> ColorRamp {
        ColorRamp::new(vec![
            RGBColor(33, 102, 172),
            RGBColor(255, 255, 255),
            RGBColor(178, 24, 43),
        ])
    }

    /// White -> orange -> red, for non-negative intensities.
    pub fn white_orange_red() -> ColorRamp {
        ColorRamp::new(vec![
            RGBColor(255, 255, 255),
            RGBColor(255, 165, 0),
            RGBColor(255, 0, 0),
        ])
    }

    pub fn color_at(&self, t: f64) -> RGBColor {
        let t = t.clamp(0.0, 1.0);
        let last = self.stops.len() - 1;
        let scaled = t * last as f64;
        let lo = scaled.floor() as usize;
        if lo >= last {
            return self.stops[last];
        }
        let frac = scaled - lo as f64;
        let a = self.stops[lo];
        let b = self.stops[lo + 1];
        RGBColor(
            lerp(a.0, b.0, frac),
            lerp(a.1, b.1, frac),
            lerp(a.2, b.2, frac),
        )
    }
}

impl FromStr for ColorRamp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "green-black-red" | "gbr" => Ok(ColorRamp::green_black_red()),
            "blue-white-red" | "bwr" => Ok(ColorRamp::blue_white_red()),
            "white-orange-red" | "wor" => Ok(ColorRamp::white_orange_red()),
            _ => Err(format!(
                "Invalid ramp: {} (expected green-black-red, blue-white-red, or white-orange-red)",
                s
            )),
        }
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

///
/// Maps data values onto ramp positions in [0, 1].
///
/// `Linear` spreads the range uniformly. `Quantile` spaces breakpoints at
/// data quantiles, so a handful of extreme values can't compress the rest
/// of the ramp into one color.
///
#[derive(Clone, Debug)]
pub enum Breaks {
    Linear { lo: f64, hi: f64 },
    Quantile { points: Vec<f64> },
}

impl Breaks {
    pub fn linear(values: &[f64]) -> Breaks {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Breaks::Linear { lo, hi }
    }

    /// Linear breaks over `[-m, m]` with `m = max(|min|, |max|)`, so value
    /// 0 always sits at the ramp midpoint. The right choice for centered
    /// data such as z-scores, where the observed range is rarely symmetric
    /// but zero still means "no change".
    pub fn symmetric(values: &[f64]) -> Breaks {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let m = lo.abs().max(hi.abs());
        if m.is_finite() && m > 0.0 {
            Breaks::Linear { lo: -m, hi: m }
        } else {
            Breaks::Linear { lo: 0.0, hi: 0.0 }
        }
    }

    /// Breakpoints at `n` evenly spaced quantiles of `values` (n >= 2).
    pub fn quantile(values: &[f64], n: usize) -> Breaks {
        let n = n.max(2);
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let points = (0..n)
            .map(|i| {
                let q = i as f64 / (n - 1) as f64;
                quantile_of_sorted(&sorted, q)
            })
            .collect();
        Breaks::Quantile { points }
    }

    /// Ramp position of `value`, clamped to [0, 1].
    pub fn position(&self, value: f64) -> f64 {
        match self {
            Breaks::Linear { lo, hi } => {
                if hi <= lo {
                    0.5
                } else {
                    ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
                }
            }
            Breaks::Quantile { points } => {
                let last = points.len() - 1;
                if value <= points[0] {
                    return 0.0;
                }
                if value >= points[last] {
                    return 1.0;
                }
                for i in 0..last {
                    let (a, b) = (points[i], points[i + 1]);
                    if value <= b {
                        let within = if b > a { (value - a) / (b - a) } else { 0.0 };
                        return (i as f64 + within) / last as f64;
                    }
                }
                1.0
            }
        }
    }

    /// Smallest and largest mapped values, for the color-key labels.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Breaks::Linear { lo, hi } => (*lo, *hi),
            Breaks::Quantile { points } => (points[0], points[points.len() - 1]),
        }
    }
}

/// Linear-interpolation quantile of an already-sorted slice (R type 7).
fn quantile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    }
}

/// Distinct colors for categorical annotation levels, cycling a fixed
/// palette when there are more levels than palette entries.
pub fn categorical_palette(n: usize) -> Vec<RGBColor> {
    const PALETTE: [RGBColor; 10] = [
        RGBColor(31, 119, 180),
        RGBColor(255, 127, 14),
        RGBColor(44, 160, 44),
        RGBColor(214, 39, 40),
        RGBColor(148, 103, 189),
        RGBColor(140, 86, 75),
        RGBColor(227, 119, 194),
        RGBColor(127, 127, 127),
        RGBColor(188, 189, 34),
        RGBColor(23, 190, 207),
    ];
    (0..n).map(|i| PALETTE[i % PALETTE.len()]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_ramp_endpoints_and_midpoint() {
        let ramp = ColorRamp::green_black_red();
        assert_eq!(ramp.color_at(0.0), RGBColor(0, 170, 0));
        assert_eq!(ramp.color_at(0.5), RGBColor(0, 0, 0));
        assert_eq!(ramp.color_at(1.0), RGBColor(220, 0, 0));
        // clamping
        assert_eq!(ramp.color_at(-3.0), RGBColor(0, 170, 0));
        assert_eq!(ramp.color_at(7.0), RGBColor(220, 0, 0));
    }

    #[rstest]
    fn test_ramp_interpolates() {
        let ramp = ColorRamp::new(vec![RGBColor(0, 0, 0), RGBColor(100, 200, 50)]);
        assert_eq!(ramp.color_at(0.5), RGBColor(50, 100, 25));
    }

    #[rstest]
    fn test_ramp_from_str() {
        assert!("blue-white-red".parse::<ColorRamp>().is_ok());
        assert!("magma".parse::<ColorRamp>().is_err());
    }

    #[rstest]
    fn test_linear_breaks() {
        let b = Breaks::linear(&[0.0, 5.0, 10.0]);
        assert_eq!(b.position(0.0), 0.0);
        assert_eq!(b.position(5.0), 0.5);
        assert_eq!(b.position(10.0), 1.0);
        assert_eq!(b.position(-1.0), 0.0);
    }

    #[rstest]
    fn test_symmetric_breaks_center_zero() {
        // skewed z-score-like range: plain linear breaks would pull 0 into
        // the low half of the ramp
        let values = vec![-0.63, -0.52, 1.15, 0.0, 0.0, 0.0];
        let b = Breaks::symmetric(&values);

        assert_eq!(b.position(0.0), 0.5);
        assert_eq!(b.range(), (-1.15, 1.15));
        assert_eq!(b.position(1.15), 1.0);
        assert_eq!(b.position(-2.0), 0.0);
        // degenerate all-zero input still maps to the midpoint
        assert_eq!(Breaks::symmetric(&[0.0, 0.0]).position(0.0), 0.5);
    }

    #[rstest]
    fn test_quantile_breaks_resist_outliers() {
        // one huge outlier; linear breaks would push everything else below 0.01
        let mut values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        values.push(1_000_000.0);

        let linear = Breaks::linear(&values);
        let quantile = Breaks::quantile(&values, 11);

        assert!(linear.position(50.0) < 0.001);
        assert!(quantile.position(50.0) > 0.4);
        assert!(quantile.position(50.0) < 0.6);
    }

    #[rstest]
    fn test_quantile_positions_are_monotone() {
        let values: Vec<f64> = vec![1.0, 2.0, 2.0, 3.0, 8.0, 9.0, 50.0];
        let b = Breaks::quantile(&values, 5);
        let mut prev = -1.0;
        for v in [0.0, 1.0, 2.0, 3.0, 5.0, 10.0, 60.0] {
            let pos = b.position(v);
            assert!(pos >= prev, "position({}) = {} < {}", v, pos, prev);
            assert!((0.0..=1.0).contains(&pos));
            prev = pos;
        }
    }

    #[rstest]
    fn test_categorical_palette_cycles() {
        let colors = categorical_palette(12);
        assert_eq!(colors.len(), 12);
        assert_eq!(colors[0], colors[10]);
        assert_ne!(colors[0], colors[1]);
    }
}
