use ndarray::{ArrayView1, ArrayViewMut1};
use num_complex::Complex32;
use rustfft::{num_traits::Zero, Fft, FftPlanner};

/// Helper that wraps `rustfft` plans for analytic-signal evaluation.
///
/// Plans are built once per matrix and shared across worker threads; each
/// trace gets its own scratch buffer.
pub struct HilbertHelper {
    forward: std::sync::Arc<dyn Fft<f32>>,
    inverse: std::sync::Arc<dyn Fft<f32>>,
    len: usize,
}

impl HilbertHelper {
    /// `len` must be nonzero.
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        Self {
            forward,
            inverse,
            len,
        }
    }

    /// Writes the envelope of `trace` into `amplitude`.
    ///
    /// The trace is treated as one period of a periodic signal: the analytic
    /// signal is formed in the frequency domain (positive frequencies
    /// doubled, negative frequencies zeroed) and its magnitude is the
    /// instantaneous amplitude `sqrt(s[j]^2 + H(s)[j]^2)`.
    pub fn envelope_into(&self, trace: ArrayView1<f32>, mut amplitude: ArrayViewMut1<f32>) {
        let n = self.len;
        let mut spectrum: Vec<Complex32> =
            trace.iter().map(|&v| Complex32::new(v, 0.0)).collect();
        self.forward.process(&mut spectrum);

        // DC stays, and so does the Nyquist bin for even lengths.
        for k in 1..n {
            if k < (n + 1) / 2 {
                spectrum[k] = spectrum[k] * 2.0;
            } else if k > n / 2 {
                spectrum[k] = Complex32::zero();
            }
        }

        self.inverse.process(&mut spectrum);

        let scale = 1.0 / n as f32;
        for (j, value) in spectrum.iter().enumerate() {
            amplitude[j] = value.norm() * scale;
        }
    }
}
