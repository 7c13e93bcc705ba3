/// Round to `decimals` places, the precision used for zone labels
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Label drawn on a highlighted zone: code on the first line, value below
pub fn zone_label(zone: &str, value: f64) -> String {
    format!("{}\n{:.1}", zone, round_to(value, 1))
}

/// Minimum and maximum of the present values, `None` when there are none
pub fn value_range<I: IntoIterator<Item = Option<f64>>>(values: I) -> Option<(f64, f64)> {
    values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345, 1), 12.3);
        assert_eq!(round_to(-0.06, 1), -0.1);
        assert_eq!(round_to(7.0, 0), 7.0);
    }

    #[test]
    fn test_zone_label() {
        assert_eq!(zone_label("NO1", 41.26), "NO1\n41.3");
        assert_eq!(zone_label("DE", 5.0), "DE\n5.0");
    }

    #[test]
    fn test_value_range() {
        assert_eq!(value_range(vec![Some(3.0), None, Some(-1.0)]), Some((-1.0, 3.0)));
        assert_eq!(value_range(vec![None, None]), None);
        assert_eq!(value_range(Vec::new()), None);
    }
}
