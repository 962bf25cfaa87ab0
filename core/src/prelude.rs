use ndarray::{ArrayView2, ArrayViewMut2, ShapeBuilder};
use serde::{Deserialize, Serialize};

/// Bytes per stored sample.
pub const SAMPLE_SIZE: usize = std::mem::size_of::<f32>();

/// Shape and stride description of a 2D sample matrix.
///
/// A matrix is `traces` rows of `samples` single-precision values each,
/// stored in a caller-owned flat buffer. `stride_l` is the byte pitch
/// between consecutive traces, which permits views into a larger matrix
/// without copying; `stride_w` is the byte step between samples within a
/// trace and must equal the element size (traces are contiguous spans; the
/// parameter exists for interface symmetry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceLayout {
    pub traces: usize,
    pub samples: usize,
    pub stride_l: usize,
    pub stride_w: usize,
}

/// Common error type for kernel execution.
#[derive(thiserror::Error, Debug)]
pub enum KernelError {
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("out of bounds: {0}")]
    OutOfBounds(String),
}

pub type KernelResult<T> = Result<T, KernelError>;

impl TraceLayout {
    pub fn new(traces: usize, samples: usize, stride_l: usize, stride_w: usize) -> Self {
        Self {
            traces,
            samples,
            stride_l,
            stride_w,
        }
    }

    /// Layout for a densely packed matrix.
    pub fn contiguous(traces: usize, samples: usize) -> Self {
        Self::new(traces, samples, samples * SAMPLE_SIZE, SAMPLE_SIZE)
    }

    /// Checks the stride contract and returns the trace pitch in elements.
    pub fn validate(&self) -> KernelResult<usize> {
        if self.stride_w != SAMPLE_SIZE {
            return Err(KernelError::InvalidShape(format!(
                "sample stride must be {} bytes, got {}",
                SAMPLE_SIZE, self.stride_w
            )));
        }
        if self.stride_l % SAMPLE_SIZE != 0 {
            return Err(KernelError::InvalidShape(format!(
                "trace stride {} is not a multiple of {} bytes",
                self.stride_l, SAMPLE_SIZE
            )));
        }
        let pitch = self.stride_l / SAMPLE_SIZE;
        if self.traces > 0 && pitch < self.samples {
            return Err(KernelError::InvalidShape(format!(
                "trace stride {} bytes cannot hold {} samples",
                self.stride_l, self.samples
            )));
        }
        Ok(pitch)
    }

    /// Number of elements a flat buffer must hold for this layout.
    pub fn min_len(&self) -> usize {
        if self.traces == 0 || self.samples == 0 {
            0
        } else {
            (self.traces - 1) * (self.stride_l / SAMPLE_SIZE) + self.samples
        }
    }

    /// Stride-aware read view over a caller-owned buffer.
    pub fn view<'a>(&self, data: &'a [f32]) -> KernelResult<ArrayView2<'a, f32>> {
        let pitch = self.validate()?;
        let needed = self.min_len();
        if data.len() < needed {
            return Err(KernelError::OutOfBounds(format!(
                "buffer holds {} samples, layout needs {}",
                data.len(),
                needed
            )));
        }
        ArrayView2::from_shape(
            (self.traces, self.samples).strides((pitch, 1)),
            &data[..needed],
        )
        .map_err(|err| KernelError::InvalidShape(err.to_string()))
    }

    /// Stride-aware write view over a caller-owned buffer.
    pub fn view_mut<'a>(&self, data: &'a mut [f32]) -> KernelResult<ArrayViewMut2<'a, f32>> {
        let pitch = self.validate()?;
        let needed = self.min_len();
        if data.len() < needed {
            return Err(KernelError::OutOfBounds(format!(
                "buffer holds {} samples, layout needs {}",
                data.len(),
                needed
            )));
        }
        ArrayViewMut2::from_shape(
            (self.traces, self.samples).strides((pitch, 1)),
            &mut data[..needed],
        )
        .map_err(|err| KernelError::InvalidShape(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_layout_views_expected_shape() {
        let layout = TraceLayout::contiguous(3, 5);
        assert_eq!(layout.min_len(), 15);

        let data = vec![0.0f32; 15];
        let view = layout.view(&data).unwrap();
        assert_eq!(view.dim(), (3, 5));
    }

    #[test]
    fn padded_stride_addresses_rows_by_pitch() {
        let layout = TraceLayout::new(2, 3, 5 * SAMPLE_SIZE, SAMPLE_SIZE);
        assert_eq!(layout.min_len(), 8);

        let data: Vec<f32> = (0..8).map(|v| v as f32).collect();
        let view = layout.view(&data).unwrap();
        assert_eq!(view[[0, 2]], 2.0);
        assert_eq!(view[[1, 0]], 5.0);
    }

    #[test]
    fn bad_strides_are_rejected() {
        let data = vec![0.0f32; 16];

        let bad_w = TraceLayout::new(2, 4, 16, 8);
        assert!(matches!(
            bad_w.view(&data),
            Err(KernelError::InvalidShape(_))
        ));

        let ragged = TraceLayout::new(2, 4, 17, SAMPLE_SIZE);
        assert!(matches!(
            ragged.view(&data),
            Err(KernelError::InvalidShape(_))
        ));

        let overlapping = TraceLayout::new(2, 4, 2 * SAMPLE_SIZE, SAMPLE_SIZE);
        assert!(matches!(
            overlapping.view(&data),
            Err(KernelError::InvalidShape(_))
        ));
    }

    #[test]
    fn short_buffer_is_out_of_bounds() {
        let layout = TraceLayout::contiguous(4, 4);
        let data = vec![0.0f32; 15];
        assert!(matches!(
            layout.view(&data),
            Err(KernelError::OutOfBounds(_))
        ));
    }

    #[test]
    fn layout_round_trips_through_json() {
        let layout = TraceLayout::contiguous(7, 1201);
        let text = serde_json::to_string(&layout).unwrap();
        let back: TraceLayout = serde_json::from_str(&text).unwrap();
        assert_eq!(back, layout);
    }
}
