//! Inline SVG renderer backed by plotters
//!
//! Sparklines are drawn over the month index. Distributions are drawn as a
//! Gaussian kernel density estimate (Scott's rule bandwidth) with a vertical
//! marker at the highlighted value.

use crate::{Error, Renderer, Result};
use levelshift_core::{math, Ddof, SeriesPoint};
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

const LINE: RGBColor = RGBColor(31, 119, 180);
const MARKER: RGBColor = RGBColor(214, 39, 40);

/// An SVG document, embedded verbatim when displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgImage(String);

impl SvgImage {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SvgImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders sparklines and distributions as inline SVG
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgRenderer {
    /// Width and height of a sparkline, in pixels
    pub sparkline_size: (u32, u32),
    /// Width and height of a distribution plot, in pixels
    pub distribution_size: (u32, u32),
    /// Number of points the density curve is evaluated at
    pub density_points: usize,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            sparkline_size: (300, 200),
            distribution_size: (350, 100),
            density_points: 128,
        }
    }
}

/// Range around `[lo, hi]` with a little headroom; never empty
fn padded(lo: f64, hi: f64) -> Range<f64> {
    let span = hi - lo;
    if !span.is_finite() || span <= f64::EPSILON * lo.abs().max(1.0) {
        return (lo - 0.5)..(hi + 0.5);
    }
    (lo - 0.05 * span)..(hi + 0.05 * span)
}

type Line = (Vec<(f64, f64)>, RGBColor);

fn draw(size: (u32, u32), x: Range<f64>, y: Range<f64>, lines: Vec<Line>) -> Result<SvgImage> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        let mut chart = ChartBuilder::on(&root)
            .margin(2)
            .build_cartesian_2d(x, y)
            .map_err(Error::render)?;
        for (points, color) in lines {
            chart
                .draw_series(LineSeries::new(points, color.stroke_width(1)))
                .map_err(Error::render)?;
        }
        root.present().map_err(Error::render)?;
    }
    Ok(SvgImage(svg))
}

/// Scott's rule bandwidth `sd * n^(-1/5)`, `None` for fewer than two points
/// or no spread
fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    let sd = math::std_dev(values, Ddof::Sample);
    (sd.is_finite() && sd > 0.0).then(|| sd * (values.len() as f64).powf(-0.2))
}

/// Gaussian kernel density of `values` on an evenly spaced grid extending
/// three bandwidths past the data range
pub fn gaussian_kde(values: &[f64], points: usize) -> Option<Vec<(f64, f64)>> {
    if points < 2 || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let h = scott_bandwidth(values)?;
    let lo = math::min(values) - 3.0 * h;
    let hi = math::max(values) + 3.0 * h;
    let step = (hi - lo) / (points - 1) as f64;
    let norm = 1.0 / ((2.0 * std::f64::consts::PI).sqrt() * h * values.len() as f64);

    Some(
        (0..points)
            .map(|i| {
                let x = lo + i as f64 * step;
                let density: f64 = values
                    .iter()
                    .map(|&v| {
                        let u = (x - v) / h;
                        (-0.5 * u * u).exp()
                    })
                    .sum();
                (x, density * norm)
            })
            .collect(),
    )
}

impl Renderer for SvgRenderer {
    type Artifact = SvgImage;

    fn sparkline(&self, series: &[SeriesPoint]) -> Result<SvgImage> {
        if series.is_empty() {
            return Err(Error::Render("cannot draw an empty series".to_string()));
        }
        let points: Vec<(f64, f64)> = series
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.value))
            .collect();
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();

        draw(
            self.sparkline_size,
            padded(0.0, (points.len() - 1) as f64),
            padded(math::min(&values), math::max(&values)),
            vec![(points, LINE)],
        )
    }

    fn distribution(&self, value: f64, distribution: &[f64]) -> Result<SvgImage> {
        let curve = gaussian_kde(distribution, self.density_points).unwrap_or_default();

        let x_lo = curve.first().map_or(value, |p| p.0.min(value));
        let x_hi = curve.last().map_or(value, |p| p.0.max(value));
        let y_hi = curve.iter().map(|p| p.1).fold(0.0, f64::max);
        let y_top = if y_hi > 0.0 { y_hi } else { 1.0 };

        let mut lines = Vec::with_capacity(2);
        if !curve.is_empty() {
            lines.push((curve, LINE));
        }
        lines.push((vec![(value, 0.0), (value, y_top)], MARKER));

        draw(self.distribution_size, padded(x_lo, x_hi), 0.0..y_top * 1.05, lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use levelshift_core::Period;

    #[test]
    fn test_kde_integrates_to_one() {
        let values = [1.0, 1.1, 1.2, 2.0, 2.1, 2.2, 5.0];
        let curve = gaussian_kde(&values, 512).unwrap();
        let dx = curve[1].0 - curve[0].0;
        let integral: f64 = curve.iter().map(|p| p.1).sum::<f64>() * dx;
        assert_relative_eq!(integral, 1.0, epsilon = 0.05);
    }

    #[test]
    fn test_scott_bandwidth() {
        // Sample std of 1..=5 is sqrt(2.5)
        let h = scott_bandwidth(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_relative_eq!(h, 2.5f64.sqrt() * 5f64.powf(-0.2), epsilon = 1e-12);
    }

    #[test]
    fn test_kde_needs_spread() {
        assert!(gaussian_kde(&[2.0, 2.0, 2.0], 64).is_none());
        assert!(gaussian_kde(&[2.0], 64).is_none());
    }

    #[test]
    fn test_padded_never_empty() {
        let r = padded(3.0, 3.0);
        assert!(r.start < r.end);
        let r = padded(0.0, 10.0);
        assert_relative_eq!(r.start, -0.5);
        assert_relative_eq!(r.end, 10.5);
    }

    #[test]
    fn test_sparkline_is_svg() {
        let jan = Period::new(2020, 1).unwrap();
        let series: Vec<_> = [1.0, 2.0, 3.0, 8.0, 9.0]
            .iter()
            .enumerate()
            .map(|(i, &value)| SeriesPoint {
                period: jan.offset_months(i as i32).unwrap(),
                value,
            })
            .collect();

        let image = SvgRenderer::default().sparkline(&series).unwrap();
        assert!(image.as_str().contains("<svg"));
        assert!(SvgRenderer::default().sparkline(&[]).is_err());
    }

    #[test]
    fn test_distribution_with_constant_values_still_marks_value() {
        let image = SvgRenderer::default().distribution(2.0, &[2.0, 2.0]).unwrap();
        assert!(image.to_string().contains("<svg"));
    }
}
