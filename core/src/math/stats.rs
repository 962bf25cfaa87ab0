use ndarray::{ArrayView, Dimension};

pub struct StatsHelper;

impl StatsHelper {
    /// Sum of squared samples, accumulated in double precision.
    pub fn sum_squares<D: Dimension>(samples: ArrayView<f32, D>) -> f64 {
        samples.iter().map(|&v| f64::from(v) * f64::from(v)).sum()
    }

    pub fn rms<D: Dimension>(samples: ArrayView<f32, D>) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let len = samples.len() as f64;
        (Self::sum_squares(samples) / len).sqrt() as f32
    }

    /// Largest absolute sample value, 0 for an empty span.
    pub fn max_abs<D: Dimension>(samples: ArrayView<f32, D>) -> f32 {
        samples.fold(0.0f32, |acc, &v| acc.max(v.abs()))
    }
}
