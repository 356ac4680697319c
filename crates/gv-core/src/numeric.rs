use crate::CoreError;

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero.
pub fn ensure_positive(v: f64, what: &'static str) -> Result<f64, CoreError> {
    ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CoreError::NonPositive { what, value: v })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(f64::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
        assert_eq!(ensure_finite(-3.5, "x"), Ok(-3.5));
    }

    #[test]
    fn ensure_positive_rejects_zero_and_negative() {
        assert!(ensure_positive(1e-9, "x").is_ok());
        assert_eq!(
            ensure_positive(0.0, "x"),
            Err(CoreError::NonPositive {
                what: "x",
                value: 0.0
            })
        );
        assert!(ensure_positive(-2.0, "x").is_err());
        assert!(matches!(
            ensure_positive(f64::INFINITY, "x"),
            Err(CoreError::NonFinite { .. })
        ));
    }
}
