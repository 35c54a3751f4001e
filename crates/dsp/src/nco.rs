use crate::fxpt::{double_to_fxpt64, fxpt64_to_double, DEFAULT_FRAC_LEN};

/// Tracking-loop phase accumulator backed by 64-bit fixed point.
///
/// Carrier and code tracking integrate a small phase increment every loop
/// update; in plain doubles the increment is eventually lost against the
/// accumulated total. Holding the total as fixed point keeps the update
/// exact to `2^-frac_len` regardless of how large the total grows. Phase
/// wraps modulo `2^(64 - frac_len)` cycles.
pub struct PhaseAccumulator {
    phase: i64,
    frac_len: u32,
}

impl PhaseAccumulator {
    pub fn new(frac_len: u32) -> Self {
        Self { phase: 0, frac_len }
    }

    /// Advance by `cycles` (may be negative).
    pub fn advance(&mut self, cycles: f64) {
        self.phase = self
            .phase
            .wrapping_add(double_to_fxpt64(cycles, self.frac_len));
    }

    /// Accumulated phase in cycles.
    pub fn cycles(&self) -> f64 {
        fxpt64_to_double(self.phase, self.frac_len)
    }

    /// Raw fixed-point phase word.
    pub fn raw(&self) -> i64 {
        self.phase
    }

    pub fn set_cycles(&mut self, cycles: f64) {
        self.phase = double_to_fxpt64(cycles, self.frac_len);
    }

    pub fn frac_len(&self) -> u32 {
        self.frac_len
    }
}

impl Default for PhaseAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_FRAC_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_small_steps() {
        let mut acc = PhaseAccumulator::default();
        let step = 0.001;
        let n = 10_000;
        for _ in 0..n {
            acc.advance(step);
        }
        // Each step quantizes to within 2^-33, so the total error is bounded
        // by n * 2^-33
        let tol = n as f64 * (-(33f64)).exp2();
        assert!(
            (acc.cycles() - 10.0).abs() <= tol,
            "accumulated {} cycles, expected 10.0 +/- {}",
            acc.cycles(),
            tol
        );
    }

    #[test]
    fn test_negative_steps_cancel() {
        let mut acc = PhaseAccumulator::new(32);
        acc.advance(1.5);
        acc.advance(-1.5);
        assert_eq!(acc.raw(), 0);
        assert_eq!(acc.cycles(), 0.0);
    }

    #[test]
    fn test_set_and_read_back() {
        let mut acc = PhaseAccumulator::new(16);
        acc.set_cycles(42.25);
        // 42.25 is exactly representable with 16 fractional bits
        assert_eq!(acc.cycles(), 42.25);
    }
}
