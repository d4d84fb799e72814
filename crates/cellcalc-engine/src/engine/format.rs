/// Format a committed cell value for display.
///
/// Integral values print without a fraction, everything else uses the
/// shortest decimal form that round-trips.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#OVERFLOW!".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else if n.abs() >= 1e15 || n.abs() < 1e-10 {
        format!("{:e}", n)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::format_number;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.3), "0.3");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(0.3333333333), "0.3333333333");
        assert_eq!(format_number(1e20), "1e20");
    }
}
