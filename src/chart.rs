//! Chart composition as SVG markup, rasterized to PNG with resvg.

use anyhow::{anyhow, Context, Result};
use png::{BitDepth, ColorType, Encoder};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use std::fmt::Write as _;

use crate::aggregate::HistogramBin;

const FONT_FAMILY: &str = "DejaVu Sans, Liberation Sans, Arial, sans-serif";
const BAR_FILL: &str = "#4c72b0";
const GRID_STROKE: &str = "#e5e5e5";
const AXIS_STROKE: &str = "#555555";
const TEXT_FILL: &str = "#262626";

const MARGIN_TOP: f64 = 50.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 60.0;
const MARGIN_LEFT: f64 = 70.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ChartBody {
    /// Categories along x, one bar each.
    Columns(Vec<(String, f64)>),
    /// Categories down the y axis, bars extend right.
    Bars(Vec<(String, f64)>),
    /// Numeric x, connected points.
    Line(Vec<(f64, f64)>),
    Histogram(Vec<HistogramBin>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
    pub body: ChartBody,
}

struct Plot {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Plot {
    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Step and upper bound of a value axis starting at zero.
fn nice_axis(max: f64) -> (f64, f64) {
    if !(max > 0.0) {
        return (1.0, 1.0);
    }
    let step = nice_step(max / 5.0);
    (step, (max / step).ceil() * step)
}

fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn tick_label(value: f64, step: f64) -> String {
    if step >= 1.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn text(svg: &mut String, x: f64, y: f64, size: u32, anchor: &str, content: &str) {
    let _ = writeln!(
        svg,
        "  <text x='{x:.1}' y='{y:.1}' fill='{TEXT_FILL}' font-family='{FONT_FAMILY}' font-size='{size}' text-anchor='{anchor}'>{}</text>",
        escape_text(content)
    );
}

fn line(svg: &mut String, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) {
    let _ = writeln!(
        svg,
        "  <line x1='{x1:.1}' y1='{y1:.1}' x2='{x2:.1}' y2='{y2:.1}' stroke='{stroke}' stroke-width='1'/>"
    );
}

fn rect(svg: &mut String, x: f64, y: f64, w: f64, h: f64) {
    let _ = writeln!(
        svg,
        "  <rect x='{x:.1}' y='{y:.1}' width='{:.1}' height='{:.1}' fill='{BAR_FILL}'/>",
        w.max(0.0),
        h.max(0.0)
    );
}

impl Chart {
    fn plot_area(&self) -> Plot {
        let left = match &self.body {
            ChartBody::Bars(items) => {
                let longest = items.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
                (longest as f64 * 7.0 + 20.0).clamp(MARGIN_LEFT, self.width as f64 * 0.45)
            }
            _ => MARGIN_LEFT,
        };
        Plot {
            left,
            top: MARGIN_TOP,
            width: (self.width as f64 - left - MARGIN_RIGHT).max(1.0),
            height: (self.height as f64 - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
        }
    }

    pub fn to_svg(&self) -> String {
        let (w, h) = (self.width, self.height);
        let plot = self.plot_area();
        let mut svg = String::new();

        let _ = writeln!(
            svg,
            "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}'>"
        );
        let _ = writeln!(svg, "  <rect width='{w}' height='{h}' fill='#ffffff'/>");
        text(&mut svg, w as f64 / 2.0, 30.0, 16, "middle", &self.title);

        match &self.body {
            ChartBody::Columns(items) => self.draw_columns(&mut svg, &plot, items),
            ChartBody::Bars(items) => self.draw_bars(&mut svg, &plot, items),
            ChartBody::Line(points) => self.draw_line(&mut svg, &plot, points),
            ChartBody::Histogram(bins) => self.draw_histogram(&mut svg, &plot, bins),
        }

        line(&mut svg, plot.left, plot.top, plot.left, plot.bottom(), AXIS_STROKE);
        line(&mut svg, plot.left, plot.bottom(), plot.right(), plot.bottom(), AXIS_STROKE);

        if !self.x_label.is_empty() {
            text(&mut svg, plot.left + plot.width / 2.0, h as f64 - 15.0, 13, "middle", &self.x_label);
        }
        if !self.y_label.is_empty() {
            let (x, y) = (18.0, plot.top + plot.height / 2.0);
            let _ = writeln!(
                svg,
                "  <text x='{x:.1}' y='{y:.1}' fill='{TEXT_FILL}' font-family='{FONT_FAMILY}' font-size='13' text-anchor='middle' transform='rotate(-90 {x:.1} {y:.1})'>{}</text>",
                escape_text(&self.y_label)
            );
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// Horizontal grid lines and labels for a value axis running up the plot.
    fn value_axis_y(&self, svg: &mut String, plot: &Plot, max: f64) -> f64 {
        let (step, top) = nice_axis(max);
        let mut v = 0.0;
        while v <= top + step / 2.0 {
            let y = plot.bottom() - v / top * plot.height;
            line(svg, plot.left, y, plot.right(), y, GRID_STROKE);
            text(svg, plot.left - 6.0, y + 4.0, 11, "end", &tick_label(v, step));
            v += step;
        }
        top
    }

    /// Vertical grid lines and labels for a value axis running right.
    fn value_axis_x(&self, svg: &mut String, plot: &Plot, max: f64) -> f64 {
        let (step, top) = nice_axis(max);
        let mut v = 0.0;
        while v <= top + step / 2.0 {
            let x = plot.left + v / top * plot.width;
            line(svg, x, plot.top, x, plot.bottom(), GRID_STROKE);
            text(svg, x, plot.bottom() + 16.0, 11, "middle", &tick_label(v, step));
            v += step;
        }
        top
    }

    fn draw_columns(&self, svg: &mut String, plot: &Plot, items: &[(String, f64)]) {
        let max = items.iter().map(|(_, v)| *v).fold(0.0, f64::max);
        let top = self.value_axis_y(svg, plot, max);
        let slot = plot.width / items.len().max(1) as f64;
        for (i, (label, value)) in items.iter().enumerate() {
            let bar_h = value / top * plot.height;
            let x = plot.left + slot * i as f64 + slot * 0.1;
            rect(svg, x, plot.bottom() - bar_h, slot * 0.8, bar_h);
            text(svg, x + slot * 0.4, plot.bottom() + 16.0, 11, "middle", label);
        }
    }

    fn draw_bars(&self, svg: &mut String, plot: &Plot, items: &[(String, f64)]) {
        let max = items.iter().map(|(_, v)| *v).fold(0.0, f64::max);
        let top = self.value_axis_x(svg, plot, max);
        let slot = plot.height / items.len().max(1) as f64;
        for (i, (label, value)) in items.iter().enumerate() {
            let y = plot.top + slot * i as f64 + slot * 0.1;
            rect(svg, plot.left, y, value / top * plot.width, slot * 0.8);
            text(svg, plot.left - 6.0, y + slot * 0.4 + 4.0, 11, "end", label);
        }
    }

    fn draw_line(&self, svg: &mut String, plot: &Plot, points: &[(f64, f64)]) {
        let max = points.iter().map(|(_, v)| *v).fold(0.0, f64::max);
        let top = self.value_axis_y(svg, plot, max);
        let (x_min, x_max) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| (lo.min(*x), hi.max(*x)));
        let span = if x_max > x_min { x_max - x_min } else { 1.0 };
        let to_x = |x: f64| {
            if x_max > x_min {
                plot.left + (x - x_min) / span * plot.width
            } else {
                plot.left + plot.width / 2.0
            }
        };

        let label_every = (points.len() / 12).max(1);
        for (i, (x, _)) in points.iter().enumerate() {
            if i % label_every == 0 {
                text(svg, to_x(*x), plot.bottom() + 16.0, 11, "middle", &format!("{:.0}", x));
            }
        }

        let coords: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{:.1},{:.1}", to_x(*x), plot.bottom() - y / top * plot.height))
            .collect();
        let _ = writeln!(
            svg,
            "  <polyline points='{}' fill='none' stroke='{BAR_FILL}' stroke-width='2'/>",
            coords.join(" ")
        );
        for (x, y) in points {
            let _ = writeln!(
                svg,
                "  <circle cx='{:.1}' cy='{:.1}' r='3' fill='{BAR_FILL}'/>",
                to_x(*x),
                plot.bottom() - y / top * plot.height
            );
        }
    }

    fn draw_histogram(&self, svg: &mut String, plot: &Plot, bins: &[HistogramBin]) {
        let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
            return;
        };
        let max = bins.iter().map(|b| b.count as f64).fold(0.0, f64::max);
        let top = self.value_axis_y(svg, plot, max);
        let (lo, hi) = (first.lower, last.upper);
        let span = (hi - lo).max(f64::EPSILON);
        let to_x = |v: f64| plot.left + (v - lo) / span * plot.width;

        for bin in bins {
            let bar_h = bin.count as f64 / top * plot.height;
            let x = to_x(bin.lower);
            rect(svg, x, plot.bottom() - bar_h, to_x(bin.upper) - x - 1.0, bar_h);
        }

        let step = nice_step(span / 6.0);
        let mut v = (lo / step).ceil() * step;
        while v <= hi {
            text(svg, to_x(v), plot.bottom() + 16.0, 11, "middle", &tick_label(v, step));
            v += step;
        }
    }
}

/// Turns chart SVG into PNG bytes. Font discovery happens once per instance.
pub struct Rasterizer {
    options: Options<'static>,
}

impl Rasterizer {
    pub fn new() -> Self {
        let mut options = Options::default();
        options.fontdb_mut().load_system_fonts();
        Rasterizer { options }
    }

    pub fn render_png(&self, chart: &Chart) -> Result<Vec<u8>> {
        let svg = chart.to_svg();
        let tree = Tree::from_data(svg.as_bytes(), &self.options)
            .with_context(|| format!("Failed to build chart '{}'", chart.title))?;

        let mut pixmap = Pixmap::new(chart.width, chart.height)
            .ok_or_else(|| anyhow!("Invalid chart size {}x{}", chart.width, chart.height))?;
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        let mut out = Vec::new();
        let mut encoder = Encoder::new(&mut out, chart.width, chart.height);
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        encoder
            .write_header()
            .context("Failed to write PNG header")?
            .write_image_data(pixmap.data())
            .context("Failed to encode PNG data")?;
        Ok(out)
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}
