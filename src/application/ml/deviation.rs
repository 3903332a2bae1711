use super::window_assembler::{LABEL_DIM, Label};
use crate::domain::observation::RawActivity;
use ndarray::{Array1, Array2, Axis};

/// Lower bound for the per-dimension label standard deviation used as the
/// deviation scale. A perfectly constant history would otherwise divide by
/// zero; with this floor a one-count change scores 100.
pub const MIN_LABEL_STD_DEV: f64 = 0.01;

pub struct DeviationScorer;

impl DeviationScorer {
    /// Population standard deviation of the labels per dimension, floored at
    /// [`MIN_LABEL_STD_DEV`].
    pub fn label_scale(labels: &[Label]) -> [f64; LABEL_DIM] {
        if labels.is_empty() {
            return [MIN_LABEL_STD_DEV; LABEL_DIM];
        }

        let matrix = Array2::from_shape_fn((labels.len(), LABEL_DIM), |(r, c)| labels[r][c]);
        let std_dev: Array1<f64> = matrix.std_axis(Axis(0), 0.0);

        [
            std_dev[0].max(MIN_LABEL_STD_DEV),
            std_dev[1].max(MIN_LABEL_STD_DEV),
        ]
    }

    /// Largest per-dimension change between `previous` and `current`, in units
    /// of label variability. Always >= 0; exactly 0 when both pairs match.
    pub fn score(labels: &[Label], previous: RawActivity, current: RawActivity) -> f64 {
        let scale = Self::label_scale(labels);
        let previous = previous.as_pair();
        let current = current.as_pair();

        (0..LABEL_DIM)
            .map(|i| (previous[i] - current[i]).abs() / scale[i])
            .fold(0.0, f64::max)
    }
}
