//! SVG chart rendering.
//!
//! Charts are emitted as standalone `<svg>` documents so they can be written
//! to disk as-is or inlined into the dashboard pages.

use super::escape;
use crate::config::ChartConfig;
use crate::dashboard::DashboardOutput;
use crate::models::{Category, FrequencyChart, HeatmapComparison, LeaderBoard, PrevalenceMatrix};

const FONT: &str = "font-family=\"Helvetica, Arial, sans-serif\"";

/// Line colours, cycled per series.
const PALETTE: &[&str] = &["#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3"];

/// Colour map of a heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    /// Yellow-green-blue over [0, 1], for prevalence rates.
    Sequential,
    /// Blue-white-red over [-1, 1], for differences.
    Diverging,
}

impl ColorScale {
    fn bounds(&self) -> (f64, f64) {
        match self {
            ColorScale::Sequential => (0.0, 1.0),
            ColorScale::Diverging => (-1.0, 1.0),
        }
    }

    fn stops(&self) -> &'static [(f64, (u8, u8, u8))] {
        match self {
            ColorScale::Sequential => &[
                (0.0, (0xff, 0xff, 0xd9)),
                (0.125, (0xed, 0xf8, 0xb1)),
                (0.25, (0xc7, 0xe9, 0xb4)),
                (0.375, (0x7f, 0xcd, 0xbb)),
                (0.5, (0x41, 0xb6, 0xc4)),
                (0.625, (0x1d, 0x91, 0xc0)),
                (0.75, (0x22, 0x5e, 0xa8)),
                (0.875, (0x25, 0x34, 0x94)),
                (1.0, (0x08, 0x1d, 0x58)),
            ],
            ColorScale::Diverging => &[
                (0.0, (0x3b, 0x4c, 0xc0)),
                (0.25, (0x7b, 0x9f, 0xf9)),
                (0.5, (0xdd, 0xdd, 0xdd)),
                (0.75, (0xf4, 0x9a, 0x7b)),
                (1.0, (0xb4, 0x04, 0x26)),
            ],
        }
    }

    /// RGB colour for a value. Values outside the scale's bounds are clipped.
    pub fn rgb(&self, value: f64) -> (u8, u8, u8) {
        let (lo, hi) = self.bounds();
        let t = if value.is_nan() {
            0.0
        } else {
            ((value.clamp(lo, hi) - lo) / (hi - lo)).clamp(0.0, 1.0)
        };

        let stops = self.stops();
        for pair in stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
                let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
                return (mix(c0.0, c1.0), mix(c0.1, c1.1), mix(c0.2, c1.2));
            }
        }
        stops[stops.len() - 1].1
    }

    /// Hex colour for a value.
    pub fn color(&self, value: f64) -> String {
        let (r, g, b) = self.rgb(value);
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// Annotation colour that stays readable on top of the cell colour.
    fn text_color(&self, value: f64) -> &'static str {
        let (r, g, b) = self.rgb(value);
        let luminance = (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0;
        if luminance < 0.5 {
            "white"
        } else {
            "black"
        }
    }
}

/// Round a maximum up to 1, 2, 2.5 or 5 times a power of ten.
fn nice_ceiling(value: f64) -> f64 {
    if value <= 0.0 || !value.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powi(value.log10().floor() as i32);
    let normalized = value / magnitude;
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .find(|s| normalized <= *s)
        .unwrap_or(10.0);
    step * magnitude
}

/// Tick label without trailing zeros.
fn tick_label(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

fn svg_open(width: u32, height: u32) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" {font}>\n<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n",
        w = width,
        h = height,
        font = FONT
    )
}

fn title(text: &str, x: f64, y: f64) -> String {
    format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"18\" font-weight=\"bold\">{}</text>\n",
        x,
        y,
        escape(text)
    )
}

fn empty_message(text: &str, x: f64, y: f64) -> String {
    format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"14\" fill=\"#666\">{}</text>\n",
        x,
        y,
        escape(text)
    )
}

/// The chart of any dashboard result.
pub fn dashboard_svg(output: &DashboardOutput, config: &ChartConfig) -> String {
    match output {
        DashboardOutput::Frequency(chart) => line_chart(chart, config),
        DashboardOutput::Leaders(board) => stacked_bar_chart(board, config),
        DashboardOutput::Heatmap(comparison) => comparison_panel(comparison),
    }
}

/// Multi-line chart of indicator values per year.
///
/// Years form a categorical x axis in ascending order. Missing values break
/// the line instead of dropping to zero.
pub fn line_chart(chart: &FrequencyChart, config: &ChartConfig) -> String {
    let width = config.width.max(400);
    let height = config.height.max(300);
    let (left, right, top, bottom) = (70.0, 280.0, 60.0, 60.0);
    let plot_w = width as f64 - left - right;
    let plot_h = height as f64 - top - bottom;

    let mut svg = svg_open(width, height);
    svg.push_str(&title(&chart.title(), width as f64 / 2.0, 30.0));

    let years = chart.years();
    if chart.series.is_empty() || years.is_empty() {
        svg.push_str(&empty_message(
            &format!("No disclosures found for {}", chart.company),
            width as f64 / 2.0,
            height as f64 / 2.0,
        ));
        svg.push_str("</svg>\n");
        return svg;
    }

    let max_value = chart
        .series
        .iter()
        .flat_map(|s| s.points.iter().filter_map(|p| p.value))
        .fold(0.0_f64, f64::max);
    let y_max = nice_ceiling(max_value);
    let x_of = |year: i32| {
        let idx = years.iter().position(|y| *y == year).unwrap_or(0);
        left + (idx as f64 + 0.5) * plot_w / years.len() as f64
    };
    let y_of = |value: f64| top + plot_h - (value / y_max) * plot_h;

    // Grid and y ticks
    for i in 0..=5 {
        let value = y_max * i as f64 / 5.0;
        let y = y_of(value);
        svg.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#e5e5e5\"/>\n",
            left,
            y,
            left + plot_w,
            y
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"11\">{}</text>\n",
            left - 8.0,
            y + 4.0,
            tick_label(value)
        ));
    }

    // Axes
    svg.push_str(&format!(
        "<line x1=\"{l:.1}\" y1=\"{t:.1}\" x2=\"{l:.1}\" y2=\"{b:.1}\" stroke=\"#444\"/>\n<line x1=\"{l:.1}\" y1=\"{b:.1}\" x2=\"{r:.1}\" y2=\"{b:.1}\" stroke=\"#444\"/>\n",
        l = left,
        t = top,
        b = top + plot_h,
        r = left + plot_w
    ));
    for year in &years {
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"11\">{}</text>\n",
            x_of(*year),
            top + plot_h + 18.0,
            year
        ));
    }
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"13\">Year</text>\n",
        left + plot_w / 2.0,
        height as f64 - 15.0
    ));
    svg.push_str(&format!(
        "<text x=\"18\" y=\"{y:.1}\" text-anchor=\"middle\" font-size=\"13\" transform=\"rotate(-90 18 {y:.1})\">ESG Indicator Frequency (Sentence Level)</text>\n",
        y = top + plot_h / 2.0
    ));

    // Series
    for (i, series) in chart.series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let mut segments: Vec<Vec<(f64, f64)>> = vec![Vec::new()];
        for point in &series.points {
            match point.value {
                Some(value) => {
                    if let Some(segment) = segments.last_mut() {
                        segment.push((x_of(point.year), y_of(value)));
                    }
                }
                None => segments.push(Vec::new()),
            }
        }

        svg.push_str(&format!(
            "<g class=\"series\" data-indicator=\"{}\">\n",
            escape(&series.indicator)
        ));
        for segment in segments.iter().filter(|s| !s.is_empty()) {
            if segment.len() > 1 {
                let points: Vec<String> = segment
                    .iter()
                    .map(|(x, y)| format!("{:.1},{:.1}", x, y))
                    .collect();
                svg.push_str(&format!(
                    "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>\n",
                    points.join(" "),
                    color
                ));
            }
            for (x, y) in segment {
                svg.push_str(&format!(
                    "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3.5\" fill=\"{}\"/>\n",
                    x, y, color
                ));
            }
        }
        svg.push_str("</g>\n");

        // Legend
        let ly = top + 10.0 + i as f64 * 22.0;
        let lx = left + plot_w + 20.0;
        svg.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"3\"/>\n",
            lx,
            ly,
            lx + 24.0,
            ly,
            color
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\">{}</text>\n",
            lx + 30.0,
            ly + 4.0,
            escape(&series.label)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Stacked horizontal bars of E, S and G scores, best company on top.
///
/// The figure grows with the number of companies.
pub fn stacked_bar_chart(board: &LeaderBoard, config: &ChartConfig) -> String {
    let row_h = 28.0;
    let bar_h = row_h * 0.6;
    let (left, right, top, bottom) = (230.0, 40.0, 90.0, 60.0);
    let width = config.width.max(500);
    let plot_w = width as f64 - left - right;
    let plot_h = (board.companies.len().max(1)) as f64 * row_h;
    let height = (top + plot_h + bottom).ceil() as u32;

    let mut svg = svg_open(width, height);
    svg.push_str(&title(&board.title(), width as f64 / 2.0, 30.0));

    if board.companies.is_empty() {
        svg.push_str(&empty_message(
            &format!(
                "No firms with at least {} years of reports",
                board.min_years_reported
            ),
            width as f64 / 2.0,
            top + row_h / 2.0,
        ));
        svg.push_str("</svg>\n");
        return svg;
    }

    let max_total = board
        .companies
        .iter()
        .map(|c| c.total)
        .max()
        .unwrap_or(0);
    let x_max = nice_ceiling(max_total as f64);
    let x_of = |value: f64| left + value / x_max * plot_w;

    // Dashed x grid
    for i in 0..=5 {
        let value = x_max * i as f64 / 5.0;
        let x = x_of(value);
        svg.push_str(&format!(
            "<line x1=\"{x:.1}\" y1=\"{:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\" stroke=\"#bbb\" stroke-dasharray=\"4 4\"/>\n",
            top,
            top + plot_h,
            x = x
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"11\">{}</text>\n",
            x,
            top + plot_h + 16.0,
            tick_label(value)
        ));
    }

    for (row, company) in board.companies.iter().enumerate() {
        let y = top + row as f64 * row_h + (row_h - bar_h) / 2.0;
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"12\">{}</text>\n",
            left - 8.0,
            y + bar_h / 2.0 + 4.0,
            escape(&company.company)
        ));

        let mut offset = 0.0;
        for category in Category::ALL {
            let value = company.score(category) as f64;
            let x0 = x_of(offset);
            let w = x_of(offset + value) - x0;
            svg.push_str(&format!(
                "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\" stroke=\"black\"/>\n",
                x0,
                y,
                w,
                bar_h,
                category.color()
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"11\">{}</text>\n",
                x0 + w / 2.0,
                y + bar_h / 2.0 + 4.0,
                value as u32
            ));
            offset += value;
        }
    }

    // Legend
    for (i, category) in Category::ALL.iter().enumerate() {
        let lx = width as f64 - right - 130.0;
        let ly = 48.0 + i as f64 * 16.0;
        svg.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"14\" height=\"10\" fill=\"{}\" stroke=\"black\"/>\n",
            lx,
            ly - 9.0,
            category.color()
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{}</text>\n",
            lx + 20.0,
            ly,
            category
        ));
    }

    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"13\">Average Number of Indicators Disclosed</text>\n",
        left + plot_w / 2.0,
        height as f64 - 15.0
    ));
    svg.push_str(&format!(
        "<text x=\"16\" y=\"{y:.1}\" text-anchor=\"middle\" font-size=\"13\" transform=\"rotate(-90 16 {y:.1})\">Firms</text>\n",
        y = top + plot_h / 2.0
    ));

    svg.push_str("</svg>\n");
    svg
}

struct HeatmapLayout {
    cell_w: f64,
    cell_h: f64,
    left: f64,
    top: f64,
    plot_w: f64,
    plot_h: f64,
    width: u32,
    height: u32,
}

impl HeatmapLayout {
    fn new(matrix: &PrevalenceMatrix, show_ylabel: bool) -> Self {
        let (cell_w, cell_h) = (72.0, 26.0);
        let longest = matrix
            .indicators
            .iter()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0);
        let label_w = (longest as f64 * 6.6 + 20.0).clamp(120.0, 440.0);
        let left = label_w + if show_ylabel { 30.0 } else { 0.0 };
        let (top, bottom, bar_area) = (60.0, 170.0, 90.0);
        let plot_w = matrix.industries.len().max(1) as f64 * cell_w;
        let plot_h = matrix.indicators.len().max(1) as f64 * cell_h;

        Self {
            cell_w,
            cell_h,
            left,
            top,
            plot_w,
            plot_h,
            width: (left + plot_w + bar_area + 20.0).ceil().max(480.0) as u32,
            height: (top + plot_h + bottom).ceil() as u32,
        }
    }
}

/// Annotated heatmap with one row per indicator and one column per industry.
pub fn heatmap(
    matrix: &PrevalenceMatrix,
    heading: &str,
    scale: ColorScale,
    show_ylabel: bool,
) -> String {
    let HeatmapLayout {
        cell_w,
        cell_h,
        left,
        top,
        plot_w,
        plot_h,
        width,
        height,
    } = HeatmapLayout::new(matrix, show_ylabel);

    let mut svg = svg_open(width, height);
    svg.push_str(&title(heading, width as f64 / 2.0, 30.0));

    if matrix.is_empty() {
        svg.push_str(&empty_message(
            "No reports for the selected year and category",
            width as f64 / 2.0,
            top + 30.0,
        ));
        svg.push_str("</svg>\n");
        return svg;
    }

    for (row, indicator) in matrix.indicators.iter().enumerate() {
        let y = top + row as f64 * cell_h;
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"11\">{}</text>\n",
            left - 6.0,
            y + cell_h / 2.0 + 4.0,
            escape(indicator)
        ));

        for col in 0..matrix.industries.len() {
            let value = matrix.get(col, row);
            let shown = if value == 0.0 { 0.0 } else { value };
            let x = left + col as f64 * cell_w;
            svg.push_str(&format!(
                "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\" stroke=\"white\" stroke-width=\"0.5\"/>\n",
                x,
                y,
                cell_w,
                cell_h,
                scale.color(value)
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"11\" fill=\"{}\">{:.2}</text>\n",
                x + cell_w / 2.0,
                y + cell_h / 2.0 + 4.0,
                scale.text_color(value),
                shown
            ));
        }
    }

    for (col, industry) in matrix.industries.iter().enumerate() {
        let x = left + (col as f64 + 0.5) * cell_w;
        let y = top + plot_h + 14.0;
        svg.push_str(&format!(
            "<text x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"end\" font-size=\"11\" transform=\"rotate(-45 {x:.1} {y:.1})\">{}</text>\n",
            escape(industry),
            x = x,
            y = y
        ));
    }

    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"13\">Industry</text>\n",
        left + plot_w / 2.0,
        height as f64 - 12.0
    ));
    if show_ylabel {
        svg.push_str(&format!(
            "<text x=\"14\" y=\"{y:.1}\" text-anchor=\"middle\" font-size=\"13\" transform=\"rotate(-90 14 {y:.1})\">Indicators</text>\n",
            y = top + plot_h / 2.0
        ));
    }

    svg.push_str(&color_bar(scale, left + plot_w + 24.0, top, plot_h));
    svg.push_str("</svg>\n");
    svg
}

/// The two single-year heatmaps and their difference, side by side.
pub fn comparison_panel(comparison: &HeatmapComparison) -> String {
    let panels = [
        (
            &comparison.first,
            comparison.year_title(comparison.year1),
            ColorScale::Sequential,
            true,
        ),
        (
            &comparison.second,
            comparison.year_title(comparison.year2),
            ColorScale::Sequential,
            false,
        ),
        (
            &comparison.difference,
            comparison.difference_title(),
            ColorScale::Diverging,
            false,
        ),
    ];

    let mut width = 0;
    let mut height = 0;
    let mut body = String::new();
    for (matrix, heading, scale, show_ylabel) in panels {
        let layout = HeatmapLayout::new(matrix, show_ylabel);
        body.push_str(&format!("<g transform=\"translate({},0)\">\n", width));
        body.push_str(&heatmap(matrix, &heading, scale, show_ylabel));
        body.push_str("</g>\n");
        width += layout.width;
        height = height.max(layout.height);
    }

    let mut svg = svg_open(width, height);
    svg.push_str(&body);
    svg.push_str("</svg>\n");
    svg
}

fn color_bar(scale: ColorScale, x: f64, y: f64, h: f64) -> String {
    let id = match scale {
        ColorScale::Sequential => "cbar-seq",
        ColorScale::Diverging => "cbar-div",
    };
    let (lo, hi) = scale.bounds();

    let mut bar = format!(
        "<defs><linearGradient id=\"{}\" x1=\"0\" y1=\"1\" x2=\"0\" y2=\"0\">\n",
        id
    );
    for (offset, _) in scale.stops() {
        let value = lo + offset * (hi - lo);
        bar.push_str(&format!(
            "<stop offset=\"{:.3}\" stop-color=\"{}\"/>\n",
            offset,
            scale.color(value)
        ));
    }
    bar.push_str("</linearGradient></defs>\n");
    bar.push_str(&format!(
        "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"16\" height=\"{:.1}\" fill=\"url(#{})\" stroke=\"#999\"/>\n",
        x, y, h, id
    ));

    for (fraction, value) in [(0.0, hi), (0.5, (lo + hi) / 2.0), (1.0, lo)] {
        bar.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"10\">{:.1}</text>\n",
            x + 22.0,
            y + fraction * h + 4.0,
            value
        ));
    }
    bar
}
