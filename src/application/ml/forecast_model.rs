use super::window_assembler::{FEATURE_DIM, FeatureVector, LABEL_DIM, Label, TrainingSet};
use crate::domain::errors::ForecastError;
use ndarray::{Array1, Array2, Axis, Zip};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Widths of the ReLU hidden layers between the 7 inputs and the 2 outputs.
pub const HIDDEN_LAYERS: [usize; 4] = [128, 64, 32, 16];

/// Interface for the next-step activity regressor
pub trait ForecastModel {
    /// Train on the given rows. Rejects an empty set.
    fn fit(&mut self, set: &TrainingSet) -> Result<(), ForecastError>;

    /// Estimate the label for a single feature vector
    fn predict(&self, features: &FeatureVector) -> Result<Label, ForecastError>;

    /// Get model name/type
    fn name(&self) -> &str;
}

/// Training hyper-parameters. Defaults: 50 epochs, batch 64, Adam with lr 0.001.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    pub seed: Option<u64>,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 64,
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            seed: None,
        }
    }
}

impl ModelParameters {
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// Fully connected layer with its Adam moment estimates.
struct DenseLayer {
    weights: Array2<f64>,
    bias: Array1<f64>,
    relu: bool,
    m_weights: Array2<f64>,
    v_weights: Array2<f64>,
    m_bias: Array1<f64>,
    v_bias: Array1<f64>,
}

impl DenseLayer {
    /// Glorot-uniform weights, zero bias.
    fn new(fan_in: usize, fan_out: usize, relu: bool, rng: &mut StdRng) -> Self {
        let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
        let weights = Array2::from_shape_fn((fan_in, fan_out), |_| rng.random_range(-limit..limit));

        Self {
            weights,
            bias: Array1::zeros(fan_out),
            relu,
            m_weights: Array2::zeros((fan_in, fan_out)),
            v_weights: Array2::zeros((fan_in, fan_out)),
            m_bias: Array1::zeros(fan_out),
            v_bias: Array1::zeros(fan_out),
        }
    }

    /// Returns (pre-activation, activation).
    fn forward(&self, input: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
        let z = input.dot(&self.weights) + &self.bias;
        let a = if self.relu {
            z.mapv(|v| v.max(0.0))
        } else {
            z.clone()
        };
        (z, a)
    }
}

struct AdamStep {
    lr: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    bias_correction1: f64,
    bias_correction2: f64,
}

impl AdamStep {
    fn new(params: &ModelParameters, t: i32) -> Self {
        Self {
            lr: params.learning_rate,
            beta1: params.beta1,
            beta2: params.beta2,
            epsilon: params.epsilon,
            bias_correction1: 1.0 - params.beta1.powi(t),
            bias_correction2: 1.0 - params.beta2.powi(t),
        }
    }

    fn apply(&self, value: &mut f64, m: &mut f64, v: &mut f64, grad: f64) {
        *m = self.beta1 * *m + (1.0 - self.beta1) * grad;
        *v = self.beta2 * *v + (1.0 - self.beta2) * grad * grad;
        let m_hat = *m / self.bias_correction1;
        let v_hat = *v / self.bias_correction2;
        *value -= self.lr * m_hat / (v_hat.sqrt() + self.epsilon);
    }
}

/// Feed-forward regressor 7 → 128 → 64 → 32 → 16 → 2 trained with Adam on MSE.
pub struct MlpRegressor {
    layers: Vec<DenseLayer>,
    params: ModelParameters,
    rng: StdRng,
    step: i32,
}

impl MlpRegressor {
    pub fn new(params: ModelParameters) -> Self {
        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut widths = vec![FEATURE_DIM];
        widths.extend_from_slice(&HIDDEN_LAYERS);
        widths.push(LABEL_DIM);

        let last = widths.len() - 2;
        let layers = widths
            .windows(2)
            .enumerate()
            .map(|(i, pair)| DenseLayer::new(pair[0], pair[1], i < last, &mut rng))
            .collect();

        Self {
            layers,
            params,
            rng,
            step: 0,
        }
    }

    fn forward(&self, input: &Array2<f64>) -> Array2<f64> {
        self.layers
            .iter()
            .fold(input.clone(), |activation, layer| layer.forward(&activation).1)
    }

    /// One Adam update on a mini-batch. Returns the batch MSE before the update.
    fn train_batch(&mut self, x: &Array2<f64>, y: &Array2<f64>) -> f64 {
        let mut inputs = Vec::with_capacity(self.layers.len());
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        let mut activation = x.clone();
        for layer in &self.layers {
            let (z, a) = layer.forward(&activation);
            inputs.push(activation);
            pre_activations.push(z);
            activation = a;
        }

        let error = &activation - y;
        let loss = error.mapv(|e| e * e).mean().unwrap_or(0.0);

        // d(mean squared error)/d(output)
        let mut grad = error * (2.0 / y.len() as f64);

        self.step += 1;
        let adam = AdamStep::new(&self.params, self.step);

        for (idx, layer) in self.layers.iter_mut().enumerate().rev() {
            if layer.relu {
                let mask = pre_activations[idx].mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
                grad = grad * mask;
            }

            let grad_weights = inputs[idx].t().dot(&grad);
            let grad_bias = grad.sum_axis(Axis(0));
            let upstream = grad.dot(&layer.weights.t());

            Zip::from(&mut layer.weights)
                .and(&mut layer.m_weights)
                .and(&mut layer.v_weights)
                .and(&grad_weights)
                .for_each(|w, m, v, &g| adam.apply(w, m, v, g));
            Zip::from(&mut layer.bias)
                .and(&mut layer.m_bias)
                .and(&mut layer.v_bias)
                .and(&grad_bias)
                .for_each(|b, m, v, &g| adam.apply(b, m, v, g));

            grad = upstream;
        }

        loss
    }
}

impl ForecastModel for MlpRegressor {
    fn fit(&mut self, set: &TrainingSet) -> Result<(), ForecastError> {
        if set.features.len() != set.labels.len() {
            return Err(ForecastError::BatchMismatch {
                features: set.features.len(),
                labels: set.labels.len(),
            });
        }
        if set.is_empty() {
            return Err(ForecastError::EmptyTrainingSet);
        }

        let rows = set.len();
        let x = Array2::from_shape_fn((rows, FEATURE_DIM), |(r, c)| set.features[r][c]);
        let y = Array2::from_shape_fn((rows, LABEL_DIM), |(r, c)| set.labels[r][c]);
        let batch_size = self.params.batch_size.max(1);
        let mut order: Vec<usize> = (0..rows).collect();

        for epoch in 0..self.params.epochs {
            order.shuffle(&mut self.rng);

            let mut epoch_loss = 0.0;
            for batch in order.chunks(batch_size) {
                let bx = x.select(Axis(0), batch);
                let by = y.select(Axis(0), batch);
                epoch_loss += self.train_batch(&bx, &by) * batch.len() as f64;
            }

            if epoch % 10 == 0 || epoch + 1 == self.params.epochs {
                debug!(
                    "epoch {}/{}: loss={:.4}",
                    epoch + 1,
                    self.params.epochs,
                    epoch_loss / rows as f64
                );
            }
        }

        Ok(())
    }

    fn predict(&self, features: &FeatureVector) -> Result<Label, ForecastError> {
        let input = Array2::from_shape_fn((1, FEATURE_DIM), |(_, c)| features[c]);
        let output = self.forward(&input);
        let label = [output[[0, 0]], output[[0, 1]]];

        if label.iter().all(|v| v.is_finite()) {
            Ok(label)
        } else {
            Err(ForecastError::NonFiniteOutput)
        }
    }

    fn name(&self) -> &str {
        "Dense MLP (128-64-32-16)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(epochs: usize) -> MlpRegressor {
        MlpRegressor::new(
            ModelParameters::default()
                .with_epochs(epochs)
                .with_seed(Some(7)),
        )
    }

    fn linear_set(rows: usize) -> TrainingSet {
        let mut set = TrainingSet::default();
        for i in 0..rows {
            let a = (i % 10) as f64;
            let b = ((i * 3) % 7) as f64;
            set.features.push([a, b, a + 1.0, b + 1.0, 0.5, 0.5, 0.5]);
            set.labels.push([a + b, a - b]);
        }
        set
    }

    fn mse(model: &MlpRegressor, set: &TrainingSet) -> f64 {
        let total: f64 = set
            .features
            .iter()
            .zip(&set.labels)
            .map(|(f, l)| {
                let p = model.predict(f).unwrap();
                (p[0] - l[0]).powi(2) + (p[1] - l[1]).powi(2)
            })
            .sum();
        total / (2.0 * set.len() as f64)
    }

    #[test]
    fn test_layer_shapes() {
        let model = seeded(0);
        let shapes: Vec<_> = model.layers.iter().map(|l| l.weights.dim()).collect();
        assert_eq!(
            shapes,
            vec![(7, 128), (128, 64), (64, 32), (32, 16), (16, 2)]
        );
        let relu: Vec<_> = model.layers.iter().map(|l| l.relu).collect();
        assert_eq!(relu, vec![true, true, true, true, false]);
    }

    #[test]
    fn test_fit_rejects_empty_set() {
        let mut model = seeded(1);
        assert_eq!(
            model.fit(&TrainingSet::default()),
            Err(ForecastError::EmptyTrainingSet)
        );
    }

    #[test]
    fn test_fit_rejects_mismatched_rows() {
        let mut set = linear_set(4);
        set.labels.pop();
        let mut model = seeded(1);
        assert_eq!(
            model.fit(&set),
            Err(ForecastError::BatchMismatch {
                features: 4,
                labels: 3
            })
        );
    }

    #[test]
    fn test_training_reduces_error() {
        let set = linear_set(40);
        let mut model = seeded(200);
        let before = mse(&model, &set);

        model.fit(&set).unwrap();

        let after = mse(&model, &set);
        assert!(after < before, "before={before} after={after}");
    }

    #[test]
    fn test_same_seed_same_prediction() {
        let set = linear_set(10);
        let query = [1.0, 2.0, 3.0, 4.0, 20.0, 50.0, 5.0];

        let mut first = seeded(5);
        let mut second = seeded(5);
        first.fit(&set).unwrap();
        second.fit(&set).unwrap();

        assert_eq!(first.predict(&query), second.predict(&query));
    }

    #[test]
    fn test_single_row_fit_predicts_finite() {
        let mut set = TrainingSet::default();
        set.features.push([1.0, 1.0, 2.0, 2.0, 22.0, 52.0, 7.0]);
        set.labels.push([3.0, 3.0]);

        let mut model = MlpRegressor::new(ModelParameters::default().with_seed(Some(1)));
        model.fit(&set).unwrap();

        let prediction = model.predict(&[2.0, 2.0, 4.0, 4.0, 22.0, 52.0, 7.0]).unwrap();
        assert!(prediction.iter().all(|v| v.is_finite()));
    }
}
