//! Derived metrics and display formatting for possibly missing values.

/// Period-over-period change in percent.
///
/// Absent when either side is missing or not finite, or when `previous` is zero.
pub fn percent_change(last: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let (last, previous) = (finite(last)?, finite(previous)?);
    if previous == 0.0 {
        return None;
    }
    Some((last - previous) / previous * 100.0)
}

/// Formats a value with two decimals, e.g. `$101.50` or `3.26%`. Missing or
/// non-finite values render as `N/A`.
pub fn format_value(value: Option<f64>, prefix: &str, as_percent: bool) -> String {
    match finite(value) {
        Some(v) => format!("{prefix}{v:.2}{}", if as_percent { "%" } else { "" }),
        None => "N/A".to_string(),
    }
}

/// Formats a change as `Δ +0.50%` / `Δ -1.20%`, or `Δ —` when absent.
pub fn format_change(change: Option<f64>) -> String {
    match finite(change) {
        // -0.0 would otherwise print with a minus sign
        Some(c) if c == 0.0 => "Δ +0.00%".to_string(),
        Some(c) => format!("Δ {c:+.2}%"),
        None => "Δ —".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn of(change: Option<f64>) -> Self {
        match finite(change) {
            Some(c) if c > 0.0 => Direction::Up,
            Some(c) if c < 0.0 => Direction::Down,
            _ => Direction::Flat,
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change() {
        let change = percent_change(Some(102.0), Some(100.0)).unwrap();
        assert!((change - 2.0).abs() < 1e-9);

        let change = percent_change(Some(3.9), Some(4.0)).unwrap();
        assert!((change + 2.5).abs() < 1e-9);

        assert_eq!(percent_change(Some(1.0), Some(0.0)), None);
        assert_eq!(percent_change(None, Some(1.0)), None);
        assert_eq!(percent_change(Some(1.0), None), None);
        assert_eq!(percent_change(Some(f64::NAN), Some(1.0)), None);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(None, "$", false), "N/A");
        assert_eq!(format_value(Some(101.5), "$", false), "$101.50");
        assert_eq!(format_value(Some(3.256), "", true), "3.26%");
        assert_eq!(format_value(Some(f64::NAN), "", true), "N/A");
        assert_eq!(format_value(Some(f64::INFINITY), "$", false), "N/A");
    }

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(Some(0.5)), "Δ +0.50%");
        assert_eq!(format_change(Some(-1.2)), "Δ -1.20%");
        assert_eq!(format_change(Some(0.0)), "Δ +0.00%");
        assert_eq!(format_change(Some(-0.0)), "Δ +0.00%");
        assert_eq!(format_change(None), "Δ —");
    }

    #[test]
    fn test_direction() {
        assert_eq!(Direction::of(Some(0.1)), Direction::Up);
        assert_eq!(Direction::of(Some(-0.1)), Direction::Down);
        assert_eq!(Direction::of(Some(0.0)), Direction::Flat);
        assert_eq!(Direction::of(None), Direction::Flat);
    }
}
