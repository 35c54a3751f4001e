// Copyright 2025-2026 CEMAXECUTER LLC

/// Direct nearest-neighbor decimating resampler.
///
/// A 32-bit phase accumulator advances by `round(2^32 * rate_out / rate_in)`
/// per input item; the current input item is emitted exactly when the
/// accumulator wraps, so the emitted fraction of items converges to
/// `rate_out / rate_in`. Decimation only: `rate_out` must not exceed
/// `rate_in` (the accumulator can wrap at most once per input item).
///
/// The item type is left to the caller; the phase state is item-independent,
/// so the same kernel conditions complex-float and short streams.
pub struct DirectResampler {
    rate_in: f64,
    rate_out: f64,
    phase: u32,
    step: u32,
}

const TWO_POW_32: f64 = 4294967296.0;

impl DirectResampler {
    pub fn new(rate_in: f64, rate_out: f64) -> Self {
        let step = ((rate_out / rate_in) * TWO_POW_32).round().min(u32::MAX as f64) as u32;
        Self {
            rate_in,
            rate_out,
            phase: 0,
            step,
        }
    }

    /// Resample one block, appending emitted items to `output`.
    /// Phase state persists across calls, so a stream may be fed in blocks
    /// of any size.
    pub fn process<T: Copy>(&mut self, input: &[T], output: &mut Vec<T>) {
        for &item in input {
            let (next, wrapped) = self.phase.overflowing_add(self.step);
            self.phase = next;
            if wrapped {
                output.push(item);
            }
        }
    }

    pub fn rate_in(&self) -> f64 {
        self.rate_in
    }

    pub fn rate_out(&self) -> f64 {
        self.rate_out
    }

    /// Output/input item ratio this resampler converges to.
    pub fn ratio(&self) -> f64 {
        self.rate_out / self.rate_in
    }
}
