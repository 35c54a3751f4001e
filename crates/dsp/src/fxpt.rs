// Copyright 2025-2026 CEMAXECUTER LLC

//! 64-bit fixed-point conversion for tracking-loop phase and frequency
//! accumulators.
//!
//! A value is stored as a signed 64-bit integer interpreted as
//! `value = raw / 2^frac_len`. With the default 32 fractional bits this
//! gives a range of about +/-2.1e9 with 2.3e-10 resolution, enough to hold
//! carrier phase in cycles without floating-point cancellation over long
//! integration intervals.
//!
//! Out-of-range inputs saturate to `i64::MIN`/`i64::MAX`; a two's-complement
//! wrap would silently corrupt accumulated phase. Rounding is to nearest,
//! half away from zero.

/// Fractional bit count used by the tracking loops unless stated otherwise.
pub const DEFAULT_FRAC_LEN: u32 = 32;

/// Convert a double to 64-bit fixed point with `frac_len` fractional bits.
///
/// Returns `round(value * 2^frac_len)`, saturated to the `i64` range.
pub fn double_to_fxpt64(value: f64, frac_len: u32) -> i64 {
    let scaled = value * (frac_len as f64).exp2();
    if scaled >= i64::MAX as f64 {
        i64::MAX
    } else if scaled <= i64::MIN as f64 {
        i64::MIN
    } else {
        scaled.round() as i64
    }
}

/// Convert a 64-bit fixed-point value with `frac_len` fractional bits back
/// to a double. Exact inverse of `double_to_fxpt64` up to the rounding the
/// forward conversion performed: a round trip differs from the original by
/// at most `2^-frac_len`.
pub fn fxpt64_to_double(raw: i64, frac_len: u32) -> f64 {
    raw as f64 / (frac_len as f64).exp2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_both_ways() {
        assert_eq!(double_to_fxpt64(0.0, DEFAULT_FRAC_LEN), 0);
        assert_eq!(fxpt64_to_double(0, DEFAULT_FRAC_LEN), 0.0);
    }

    #[test]
    fn test_known_values() {
        // 0.5 with 32 fractional bits is exactly 2^31
        assert_eq!(double_to_fxpt64(0.5, 32), 1i64 << 31);
        assert_eq!(double_to_fxpt64(-0.5, 32), -(1i64 << 31));
        assert_eq!(double_to_fxpt64(1.0, 32), 1i64 << 32);
        assert_eq!(fxpt64_to_double(1i64 << 32, 32), 1.0);
        // frac_len = 0 degenerates to plain integer rounding
        assert_eq!(double_to_fxpt64(7.0, 0), 7);
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!(double_to_fxpt64(2.5, 0), 3);
        assert_eq!(double_to_fxpt64(-2.5, 0), -3);
        assert_eq!(double_to_fxpt64(2.4, 0), 2);
        assert_eq!(double_to_fxpt64(-2.4, 0), -2);
    }

    #[test]
    fn test_round_trip_error_bound() {
        let values = [0.001234, -0.75, 3.14159265358979, -1234.56789, 0.1];
        for frac_len in [8u32, 16, 32, 48] {
            let tol = (-(frac_len as f64)).exp2();
            for &v in &values {
                let back = fxpt64_to_double(double_to_fxpt64(v, frac_len), frac_len);
                assert!(
                    (back - v).abs() <= tol,
                    "round trip of {} at frac_len {} off by {}",
                    v,
                    frac_len,
                    (back - v).abs()
                );
            }
        }
    }

    #[test]
    fn test_saturates_out_of_range() {
        // With 32 fractional bits anything at or beyond 2^31 saturates
        assert_eq!(double_to_fxpt64(1e12, 32), i64::MAX);
        assert_eq!(double_to_fxpt64(-1e12, 32), i64::MIN);
        // Saturated values still decode to finite doubles
        assert!(fxpt64_to_double(i64::MAX, 32).is_finite());
        assert!(fxpt64_to_double(i64::MIN, 32).is_finite());
    }

    #[test]
    fn test_in_range_near_limit_does_not_saturate() {
        // 2^30 with 32 fractional bits scales to 2^62, still in range
        let v = (30f64).exp2();
        let raw = double_to_fxpt64(v, 32);
        assert!(raw < i64::MAX);
        assert_eq!(fxpt64_to_double(raw, 32), v);
    }
}
