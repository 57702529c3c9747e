//! ASCII plotting for terminal output.
//!
//! Fixed-size character grids, deterministic so they can be golden-tested.
//!
//! Plot elements:
//! - scatter: aligned days `o`, least squares trend line `-`
//! - timeline: faith score `f`, market value `m`, both on one cell `*`

use chrono::NaiveDate;

use crate::domain::AlignedRecord;
use crate::math::TrendLine;
use crate::report::fmt_usd;

/// Faith score (y) against same-day market value (x).
pub fn render_scatter(records: &[AlignedRecord], trend: Option<&TrendLine>, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let xs: Vec<f64> = records.iter().map(|r| r.market_value).collect();
    let ys: Vec<f64> = records.iter().map(|r| r.faith_score).collect();
    let Some((x_min, x_max)) = value_range(&xs) else {
        return "Plot: no aligned data\n".to_string();
    };
    let (y_min, y_max) = value_range(&ys).unwrap_or((0.0, 100.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Trend line first so points overlay it.
    if let Some(line) = trend {
        let samples: Vec<(f64, f64)> = (0..width)
            .map(|i| {
                let u = i as f64 / (width as f64 - 1.0);
                let x = x_min + u * (x_max - x_min);
                (x, line.predict(x))
            })
            .collect();
        draw_polyline(&mut grid, &samples, (x_min, x_max), (y_min, y_max), '-');
    }

    for (&x, &y) in xs.iter().zip(&ys) {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: market value=[{}, {}] | faith=[{y_min:.2}, {y_max:.2}]\n",
        fmt_usd(x_min),
        fmt_usd(x_max)
    ));
    push_grid(&mut out, grid);
    out
}

/// Both series over time, each scaled to its own range.
pub fn render_timeline(records: &[AlignedRecord], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (Some(first), Some(last)) = (
        records.iter().map(|r| r.date).min(),
        records.iter().map(|r| r.date).max(),
    ) else {
        return "Timeline: no aligned data\n".to_string();
    };
    let t_max = day_offset(first, last);

    let faith: Vec<f64> = records.iter().map(|r| r.faith_score).collect();
    let market: Vec<f64> = records.iter().map(|r| r.market_value).collect();
    let (f_lo, f_hi) = value_range(&faith).unwrap_or((0.0, 100.0));
    let (m_lo, m_hi) = value_range(&market).unwrap_or((0.0, 1.0));
    let (f_min, f_max) = pad_range(f_lo, f_hi, 0.05);
    let (m_min, m_max) = pad_range(m_lo, m_hi, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for r in records {
        let col = map_x(day_offset(first, r.date), 0.0, t_max, width);
        let market_row = map_y(r.market_value, m_min, m_max, height);
        grid[market_row][col] = 'm';
        let faith_row = map_y(r.faith_score, f_min, f_max, height);
        grid[faith_row][col] = if faith_row == market_row { '*' } else { 'f' };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Timeline: {first}..{last} | f faith=[{f_lo:.2}, {f_hi:.2}] | m market=[{}, {}]\n",
        fmt_usd(m_lo),
        fmt_usd(m_hi)
    ));
    push_grid(&mut out, grid);
    out
}

fn day_offset(first: NaiveDate, date: NaiveDate) -> f64 {
    (date - first).num_days() as f64
}

fn push_grid(out: &mut String, grid: Vec<Vec<char>>) {
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
}

/// Min/max of finite values; equal bounds are allowed.
fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    (min.is_finite() && max.is_finite()).then_some((min, max))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    if x_max <= x_min {
        return width / 2;
    }
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], points: &[(f64, f64)], x_range: (f64, f64), y_range: (f64, f64), ch: char) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in points {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let col = map_x(x, x_range.0, x_range.1, width);
        let row = map_y(y, y_range.0, y_range.1, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, ch),
            None => grid[row][col] = ch,
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
