// src/chart.rs
use crate::models::{SeriesRow, DATE_FORMAT};
use crate::render::escape;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 800.0;
const PAD_LEFT: f64 = 80.0;
const PAD_RIGHT: f64 = 20.0;
const PAD_TOP: f64 = 20.0;
const PAD_BOTTOM: f64 = 110.0;
const STOCK_COLOR: &str = "#1f77b4";
const TOTAL_COLOR: &str = "#ff7f0e";
const TARGET_TICKS: usize = 10;

/// Step between labelled x ticks. With fewer than ten ticks `n / 10` is
/// zero, so every tick is shown.
pub fn tick_step(n: usize) -> usize {
    (n / TARGET_TICKS).max(1)
}

/// Indices of the ticks that get a label.
pub fn tick_indices(n: usize) -> Vec<usize> {
    (0..n).step_by(tick_step(n)).collect()
}

fn x_positions(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![PAD_LEFT + (WIDTH - PAD_LEFT - PAD_RIGHT) / 2.0],
        _ => {
            let inner = WIDTH - PAD_LEFT - PAD_RIGHT;
            (0..len)
                .map(|i| PAD_LEFT + inner * i as f64 / (len - 1) as f64)
                .collect()
        }
    }
}

fn extent(rows: &[SeriesRow]) -> Option<(f64, f64)> {
    let (min, max) = rows
        .iter()
        .flat_map(|r| [r.stock_value, r.value])
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return None;
    }
    if min == max {
        // Flat series: open the range so the line sits mid-plot.
        return Some((min - 1.0, max + 1.0));
    }
    Some((min, max))
}

fn scale(value: f64, min: f64, max: f64) -> f64 {
    let inner = HEIGHT - PAD_TOP - PAD_BOTTOM;
    PAD_TOP + (1.0 - (value - min) / (max - min)) * inner
}

fn polyline(
    xs: &[f64],
    values: impl Iterator<Item = f64>,
    min: f64,
    max: f64,
    color: &str,
) -> String {
    let points = xs
        .iter()
        .zip(values)
        .filter(|(_, v)| v.is_finite())
        .map(|(x, v)| format!("{:.2},{:.2}", x, scale(v, min, max)))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        r#"<polyline fill="none" stroke="{}" stroke-width="0.75" points="{}" />"#,
        color, points
    )
}

/// Portfolio value over time: raw stock value against stock plus
/// reinvested dividends.
pub fn portfolio_chart(rows: &[SeriesRow]) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="portfolio-chart" viewBox="0 0 {w} {h}"><style>text{{font-family:sans-serif;font-size:12px;fill:#333}}</style>"#,
        w = WIDTH,
        h = HEIGHT
    );

    let bottom = HEIGHT - PAD_BOTTOM;
    svg.push_str(&format!(
        r##"<line x1="{l}" y1="{b}" x2="{r}" y2="{b}" stroke="#000" /><line x1="{l}" y1="{t}" x2="{l}" y2="{b}" stroke="#000" />"##,
        l = PAD_LEFT,
        r = WIDTH - PAD_RIGHT,
        t = PAD_TOP,
        b = bottom
    ));
    svg.push_str(&format!(
        r#"<text x="{x}" y="{y}" text-anchor="middle">Date</text>"#,
        x = PAD_LEFT + (WIDTH - PAD_LEFT - PAD_RIGHT) / 2.0,
        y = HEIGHT - 8.0
    ));
    svg.push_str(&format!(
        r#"<text x="18" y="{y}" text-anchor="middle" transform="rotate(-90 18 {y})">Portfolio Value</text>"#,
        y = PAD_TOP + (bottom - PAD_TOP) / 2.0
    ));

    if let Some((min, max)) = extent(rows) {
        let xs = x_positions(rows.len());

        for value in [min, (min + max) / 2.0, max] {
            let y = scale(value, min, max);
            svg.push_str(&format!(
                r#"<text x="{x}" y="{y:.2}" text-anchor="end">{v:.2}</text>"#,
                x = PAD_LEFT - 6.0,
                y = y + 4.0,
                v = value
            ));
        }

        for idx in tick_indices(rows.len()) {
            let x = xs[idx];
            let label = rows[idx].timestamp.format(DATE_FORMAT).to_string();
            svg.push_str(&format!(
                r##"<line x1="{x:.2}" y1="{b}" x2="{x:.2}" y2="{b2}" stroke="#000" /><text class="tick" x="{x:.2}" y="{ty}" text-anchor="end" transform="rotate(-90 {x:.2} {ty})">{label}</text>"##,
                x = x,
                b = bottom,
                b2 = bottom + 4.0,
                ty = bottom + 8.0,
                label = escape(&label)
            ));
        }

        svg.push_str(&polyline(
            &xs,
            rows.iter().map(|r| r.stock_value),
            min,
            max,
            STOCK_COLOR,
        ));
        svg.push_str(&polyline(
            &xs,
            rows.iter().map(|r| r.value),
            min,
            max,
            TOTAL_COLOR,
        ));
    }

    // Legend.
    for (i, (label, color)) in [("stock", STOCK_COLOR), ("stock+dividend", TOTAL_COLOR)]
        .iter()
        .enumerate()
    {
        let y = PAD_TOP + 14.0 + i as f64 * 18.0;
        svg.push_str(&format!(
            r#"<line x1="{x1}" y1="{y}" x2="{x2}" y2="{y}" stroke="{c}" stroke-width="2" /><text x="{tx}" y="{ty}">{label}</text>"#,
            x1 = PAD_LEFT + 12.0,
            x2 = PAD_LEFT + 36.0,
            y = y,
            c = color,
            tx = PAD_LEFT + 42.0,
            ty = y + 4.0,
            label = label
        ));
    }

    svg.push_str("</svg>");
    svg
}
