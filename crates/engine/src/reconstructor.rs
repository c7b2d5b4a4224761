//! Profile Reconstructor - a tiny autoencoder over taste space
//!
//! A user's averaged answers rarely match any real drink. Fitting a small
//! encoder/decoder on the candidate ingredients and pushing the user's vector
//! through it pulls the profile toward tastes the ingredients can produce.
//!
//! ## Architecture
//! ```text
//! taste (5) --Dense+ReLU--> latent (3) --Dense+sigmoid--> taste (5)
//! ```
//! Trained self-supervised (target = input) on mean squared error with Adam,
//! mini-batches in catalog order, weights from a seeded Xavier-uniform draw.
//! The model is refit on every call; nothing is cached between requests.
//!
//! The output is a heuristic approximation. Every coordinate is in `[0, 1]`
//! because of the sigmoid, and training is deterministic for a given config.

use crate::error::{EngineError, Result};
use crate::traits::ProfileReconstructor;
use catalog::{TASTE_DIMS, TasteVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Hyperparameters for [`Autoencoder`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoencoderConfig {
    /// Width of the bottleneck layer
    pub latent_dim: usize,
    /// Passes over the ingredient set
    pub epochs: usize,
    /// Rows per Adam step
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Seed for weight initialisation
    pub seed: u64,
}

impl Default for AutoencoderConfig {
    fn default() -> Self {
        Self {
            latent_dim: 3,
            epochs: 500,
            batch_size: 4,
            learning_rate: 0.01,
            seed: 42,
        }
    }
}

impl AutoencoderConfig {
    /// Configure bottleneck width (default: 3, minimum 1)
    pub fn with_latent_dim(mut self, latent_dim: usize) -> Self {
        self.latent_dim = latent_dim.max(1);
        self
    }

    /// Configure number of epochs (default: 500)
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Configure mini-batch size (default: 4, minimum 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Configure Adam step size (default: 0.01)
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Configure the initialisation seed (default: 42)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

// =============================================================================
// Dense layer + Adam
// =============================================================================

/// Fully connected layer, weights stored row-major as `[outputs][inputs]`
#[derive(Debug, Clone, PartialEq)]
struct DenseLayer {
    inputs: usize,
    outputs: usize,
    weights: Vec<f64>,
    bias: Vec<f64>,
}

impl DenseLayer {
    /// Xavier/Glorot uniform weights, zero bias
    fn xavier_uniform(inputs: usize, outputs: usize, rng: &mut StdRng) -> Self {
        let limit = (6.0 / (inputs + outputs) as f64).sqrt();
        let weights = (0..inputs * outputs)
            .map(|_| rng.random_range(-limit..limit))
            .collect();
        Self {
            inputs,
            outputs,
            weights,
            bias: vec![0.0; outputs],
        }
    }

    fn forward(&self, x: &[f64], out: &mut [f64]) {
        for (o, slot) in out.iter_mut().enumerate() {
            let row = &self.weights[o * self.inputs..(o + 1) * self.inputs];
            *slot = self.bias[o] + row.iter().zip(x).map(|(w, xi)| w * xi).sum::<f64>();
        }
    }
}

/// Gradient buffers shaped like a [`DenseLayer`]
#[derive(Debug, Clone)]
struct LayerGrads {
    weights: Vec<f64>,
    bias: Vec<f64>,
}

impl LayerGrads {
    fn zeros_like(layer: &DenseLayer) -> Self {
        Self {
            weights: vec![0.0; layer.weights.len()],
            bias: vec![0.0; layer.bias.len()],
        }
    }

    fn reset(&mut self) {
        self.weights.iter_mut().for_each(|g| *g = 0.0);
        self.bias.iter_mut().for_each(|g| *g = 0.0);
    }

    /// Accumulate `delta ⊗ input` (weights) and `delta` (bias)
    fn accumulate(&mut self, delta: &[f64], input: &[f64]) {
        let inputs = input.len();
        for (o, d) in delta.iter().enumerate() {
            self.bias[o] += d;
            for (i, x) in input.iter().enumerate() {
                self.weights[o * inputs + i] += d * x;
            }
        }
    }
}

/// Adam moment estimates for one parameter tensor
///
/// m̂ = m / (1 - β₁ᵗ), v̂ = v / (1 - β₂ᵗ), param -= lr · m̂ / (√v̂ + ε)
#[derive(Debug, Clone)]
struct AdamState {
    m: Vec<f64>,
    v: Vec<f64>,
}

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const ADAM_EPS: f64 = 1e-8;

impl AdamState {
    fn new(len: usize) -> Self {
        Self {
            m: vec![0.0; len],
            v: vec![0.0; len],
        }
    }

    fn step(&mut self, params: &mut [f64], grads: &[f64], t: i32, lr: f64) {
        let bias_correction1 = 1.0 - BETA1.powi(t);
        let bias_correction2 = 1.0 - BETA2.powi(t);

        for i in 0..params.len() {
            let g = grads[i];
            self.m[i] = BETA1 * self.m[i] + (1.0 - BETA1) * g;
            self.v[i] = BETA2 * self.v[i] + (1.0 - BETA2) * g * g;

            let m_hat = self.m[i] / bias_correction1;
            let v_hat = self.v[i] / bias_correction2;
            params[i] -= lr * m_hat / (v_hat.sqrt() + ADAM_EPS);
        }
    }
}

/// Adam state for both tensors of a layer
#[derive(Debug, Clone)]
struct LayerOptimizer {
    weights: AdamState,
    bias: AdamState,
}

impl LayerOptimizer {
    fn new(layer: &DenseLayer) -> Self {
        Self {
            weights: AdamState::new(layer.weights.len()),
            bias: AdamState::new(layer.bias.len()),
        }
    }

    fn step(&mut self, layer: &mut DenseLayer, grads: &LayerGrads, t: i32, lr: f64) {
        self.weights.step(&mut layer.weights, &grads.weights, t, lr);
        self.bias.step(&mut layer.bias, &grads.bias, t, lr);
    }
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

// =============================================================================
// Autoencoder
// =============================================================================

/// Fits a [`FittedAutoencoder`] on a set of ingredient profiles
#[derive(Debug, Clone, Default)]
pub struct Autoencoder {
    config: AutoencoderConfig,
}

impl Autoencoder {
    /// Create an autoencoder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AutoencoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AutoencoderConfig {
        &self.config
    }

    /// Train on `profiles` (one row per ingredient, target = input)
    ///
    /// Fewer distinct rows than `latent_dim` is fine: the fit is degenerate
    /// but still yields a model of the usual shape.
    #[instrument(skip(self, profiles), fields(rows = profiles.len()))]
    pub fn fit(&self, profiles: &[TasteVector]) -> Result<FittedAutoencoder> {
        if profiles.is_empty() {
            return Err(EngineError::InsufficientData {
                reason: "cannot fit the reconstructor on zero ingredients".to_string(),
            });
        }
        if let Some(bad) = profiles.iter().find(|p| !p.is_finite()) {
            return Err(EngineError::InsufficientData {
                reason: format!("non-finite ingredient profile {:?}", bad.as_array()),
            });
        }

        let config = &self.config;
        let latent = config.latent_dim.max(1);
        let batch_size = config.batch_size.max(1);

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut model = FittedAutoencoder {
            encoder: DenseLayer::xavier_uniform(TASTE_DIMS, latent, &mut rng),
            decoder: DenseLayer::xavier_uniform(latent, TASTE_DIMS, &mut rng),
            training_loss: 0.0,
        };

        let mut encoder_grads = LayerGrads::zeros_like(&model.encoder);
        let mut decoder_grads = LayerGrads::zeros_like(&model.decoder);
        let mut encoder_opt = LayerOptimizer::new(&model.encoder);
        let mut decoder_opt = LayerOptimizer::new(&model.decoder);

        let mut pre_activation = vec![0.0; latent];
        let mut hidden = vec![0.0; latent];
        let mut hidden_delta = vec![0.0; latent];
        let mut logits = [0.0; TASTE_DIMS];
        let mut output_delta = [0.0; TASTE_DIMS];
        let mut step: i32 = 0;

        for _ in 0..config.epochs {
            for batch in profiles.chunks(batch_size) {
                encoder_grads.reset();
                decoder_grads.reset();
                // d(mean squared error)/d(output) = 2·err / (rows · dims)
                let scale = 2.0 / (batch.len() * TASTE_DIMS) as f64;

                for row in batch {
                    let x = row.as_array();

                    model.encoder.forward(x, &mut pre_activation);
                    for (h, z) in hidden.iter_mut().zip(&pre_activation) {
                        *h = z.max(0.0);
                    }
                    model.decoder.forward(&hidden, &mut logits);

                    for o in 0..TASTE_DIMS {
                        let y = sigmoid(logits[o]);
                        output_delta[o] = scale * (y - x[o]) * y * (1.0 - y);
                    }
                    decoder_grads.accumulate(&output_delta, &hidden);

                    for j in 0..latent {
                        if pre_activation[j] > 0.0 {
                            hidden_delta[j] = (0..TASTE_DIMS)
                                .map(|o| model.decoder.weights[o * latent + j] * output_delta[o])
                                .sum();
                        } else {
                            hidden_delta[j] = 0.0;
                        }
                    }
                    encoder_grads.accumulate(&hidden_delta, x);
                }

                step = step.saturating_add(1);
                encoder_opt.step(&mut model.encoder, &encoder_grads, step, config.learning_rate);
                decoder_opt.step(&mut model.decoder, &decoder_grads, step, config.learning_rate);
            }
        }

        model.training_loss = model.loss(profiles);
        debug!(
            "Fitted autoencoder: latent_dim={}, epochs={}, steps={}, loss={:.5}",
            latent, config.epochs, step, model.training_loss
        );
        Ok(model)
    }
}

impl ProfileReconstructor for Autoencoder {
    fn name(&self) -> &str {
        "Autoencoder"
    }

    fn reconstruct(
        &self,
        ingredient_profiles: &[TasteVector],
        query: &TasteVector,
    ) -> Result<TasteVector> {
        if !query.is_finite() {
            return Err(EngineError::InsufficientData {
                reason: format!("non-finite taste profile {:?}", query.as_array()),
            });
        }
        let model = self.fit(ingredient_profiles)?;
        Ok(model.reconstruct(query))
    }
}

/// Trained encoder/decoder pair
#[derive(Debug, Clone, PartialEq)]
pub struct FittedAutoencoder {
    encoder: DenseLayer,
    decoder: DenseLayer,
    training_loss: f64,
}

impl FittedAutoencoder {
    /// Push `query` through the encoder and decoder
    pub fn reconstruct(&self, query: &TasteVector) -> TasteVector {
        let mut hidden = vec![0.0; self.encoder.outputs];
        self.encoder.forward(query.as_array(), &mut hidden);
        for h in hidden.iter_mut() {
            *h = h.max(0.0);
        }

        let mut logits = [0.0; TASTE_DIMS];
        self.decoder.forward(&hidden, &mut logits);
        TasteVector::new(logits.map(sigmoid))
    }

    /// Mean squared reconstruction error over `profiles`
    pub fn loss(&self, profiles: &[TasteVector]) -> f64 {
        if profiles.is_empty() {
            return 0.0;
        }
        let total: f64 = profiles
            .iter()
            .map(|p| self.reconstruct(p).squared_distance(p))
            .sum();
        total / (profiles.len() * TASTE_DIMS) as f64
    }

    /// Loss on the training set right after fitting
    pub fn training_loss(&self) -> f64 {
        self.training_loss
    }

    pub fn latent_dim(&self) -> usize {
        self.encoder.outputs
    }
}
