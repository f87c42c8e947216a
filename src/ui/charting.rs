/// Per-second WPM samples as chart points, 1-indexed on the time axis.
pub fn wpm_points(history: &[u32]) -> Vec<(f64, f64)> {
    history
        .iter()
        .enumerate()
        .map(|(i, wpm)| ((i + 1) as f64, *wpm as f64))
        .collect()
}

/// Compute X (seconds) and Y (WPM) bounds for the results chart.
pub fn compute_chart_params(history: &[u32]) -> (f64, f64) {
    let highest = history.iter().copied().max().unwrap_or(0) as f64;
    let duration = history.len().max(1) as f64;
    (duration, highest.max(1.0))
}

/// Format a simple numeric label consistently.
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_chart_params_empty() {
        let (x, y) = compute_chart_params(&[]);
        assert_eq!(x, 1.0);
        assert_eq!(y, 1.0);
    }

    #[test]
    fn test_compute_chart_params() {
        let (x, y) = compute_chart_params(&[10, 40, 25]);
        assert_eq!(x, 3.0);
        assert_eq!(y, 40.0);
    }

    #[test]
    fn test_wpm_points_are_one_indexed() {
        assert_eq!(wpm_points(&[30, 35]), vec![(1.0, 30.0), (2.0, 35.0)]);
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
