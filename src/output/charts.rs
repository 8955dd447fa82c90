use std::fmt::Write as _;

/// Samples shown per chart; older history is cut off
pub const CHART_WIDTH: usize = 50;
pub const CHART_HEIGHT: usize = 12;

/// ASCII line chart of the last `CHART_WIDTH` values, newest on the right.
/// Returns an empty string when there is nothing to plot.
pub fn render_history(history: &[f64], decimals: usize) -> String {
    let start = history.len().saturating_sub(CHART_WIDTH);
    let series = &history[start..];
    if series.is_empty() {
        return String::new();
    }

    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let rows = CHART_HEIGHT;

    let row_of = |v: f64| -> usize {
        if span <= 0.0 {
            0
        } else {
            (((v - min) / span) * (rows - 1) as f64).round() as usize
        }
    };

    let mut grid = vec![vec![' '; series.len()]; rows];
    for (x, &value) in series.iter().enumerate() {
        let y = row_of(value);
        grid[y][x] = '*';
        if x > 0 {
            let prev = row_of(series[x - 1]);
            let (lo, hi) = if prev < y { (prev, y) } else { (y, prev) };
            for cell in grid.iter_mut().take(hi).skip(lo + 1) {
                cell[x] = '|';
            }
        }
    }

    let label_width = format!("{:.*}", decimals, max)
        .len()
        .max(format!("{:.*}", decimals, min).len());
    let mut out = String::new();
    for (y, row) in grid.iter().enumerate().rev() {
        let value = if rows > 1 {
            min + span * y as f64 / (rows - 1) as f64
        } else {
            min
        };
        let line: String = row.iter().collect();
        let _ = writeln!(
            out,
            "{:>width$.prec$} ┤{}",
            value,
            line.trim_end(),
            width = label_width,
            prec = decimals
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_renders_nothing() {
        assert_eq!(render_history(&[], 0), "");
    }

    #[test]
    fn test_chart_has_fixed_height_and_labels_extremes() {
        let history: Vec<f64> = (0..80).map(|i| 1500.0 + i as f64).collect();
        let chart = render_history(&history, 0);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines.len(), CHART_HEIGHT);
        // only the last 50 samples: 1530..=1579
        assert!(lines[0].starts_with("1579"));
        assert!(lines[CHART_HEIGHT - 1].starts_with("1530"));
        assert_eq!(chart.matches('*').count(), CHART_WIDTH);
    }

    #[test]
    fn test_flat_history() {
        let chart = render_history(&[25.0, 25.0, 25.0], 1);
        assert_eq!(chart.matches('*').count(), 3);
        assert!(chart.lines().last().unwrap().starts_with("25.0 ┤***"));
    }
}
