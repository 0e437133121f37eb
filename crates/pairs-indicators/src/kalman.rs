//! Scalar Kalman filter for dynamic hedge ratio estimation.
//!
//! # Model
//!
//! ```text
//! state:        x[t] = F * x[t-1] + w,   w ~ N(0, Q)
//! observation:  z[t] = H * x[t]   + v,   v ~ N(0, R)
//! ```
//!
//! For hedge ratio tracking the observation is the price ratio
//! `z[t] = A[t] / (B[t] + epsilon)` and `F = H = 1`, so the state is a
//! random walk that follows the ratio with a lag controlled by `Q / R`.
//!
//! The filter itself holds no running state: [`KalmanFilter::step`] takes the
//! prior [`FilterState`] and returns the posterior, so a single update can be
//! tested without replaying a whole series.

use pairs_core::error::FilterError;
use pairs_core::types::PricePair;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::simd::ratio_simd;

/// Fixed coefficients of a filter instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParameters {
    /// State transition coefficient (F)
    pub transition_coeff: f64,
    /// Observation coefficient (H)
    pub observation_coeff: f64,
    /// Process noise variance (Q); how fast the hedge ratio may drift
    pub process_noise: f64,
    /// Measurement noise variance (R); higher values smooth the estimate
    pub measurement_noise: f64,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            transition_coeff: 1.0,
            observation_coeff: 1.0,
            process_noise: 1e-5,
            measurement_noise: 1e-2,
        }
    }
}

impl FilterParameters {
    /// Validate the parameters.
    pub fn validate(&self) -> Result<(), FilterError> {
        let coeffs = [
            ("transition_coeff", self.transition_coeff),
            ("observation_coeff", self.observation_coeff),
            ("process_noise", self.process_noise),
            ("measurement_noise", self.measurement_noise),
        ];
        for (name, value) in coeffs {
            if !value.is_finite() {
                return Err(FilterError::InvalidParameter(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        if self.process_noise <= 0.0 {
            return Err(FilterError::InvalidParameter(format!(
                "process_noise must be positive, got {}",
                self.process_noise
            )));
        }
        if self.measurement_noise <= 0.0 {
            return Err(FilterError::InvalidParameter(format!(
                "measurement_noise must be positive, got {}",
                self.measurement_noise
            )));
        }
        Ok(())
    }
}

/// Estimate and its error covariance after an update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// State estimate (x)
    pub estimate: f64,
    /// Estimate error covariance (P)
    pub covariance: f64,
}

impl FilterState {
    pub fn new(estimate: f64, covariance: f64) -> Self {
        Self {
            estimate,
            covariance,
        }
    }
}

/// Result of one predict-correct cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KalmanUpdate {
    /// Posterior state
    pub state: FilterState,
    /// Kalman gain used for the correction
    pub gain: f64,
}

/// Scalar Kalman filter.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    params: FilterParameters,
    prior: FilterState,
}

impl KalmanFilter {
    /// Create a filter with validated parameters and priors.
    pub fn new(
        params: FilterParameters,
        initial_estimate: f64,
        initial_covariance: f64,
    ) -> Result<Self, FilterError> {
        params.validate()?;
        if !initial_estimate.is_finite() {
            return Err(FilterError::InvalidParameter(format!(
                "initial_estimate must be finite, got {}",
                initial_estimate
            )));
        }
        if !initial_covariance.is_finite() || initial_covariance < 0.0 {
            return Err(FilterError::InvalidParameter(format!(
                "initial_covariance must be finite and non-negative, got {}",
                initial_covariance
            )));
        }
        Ok(Self {
            params,
            prior: FilterState::new(initial_estimate, initial_covariance),
        })
    }

    /// Starting state of an estimation pass.
    pub fn initialize(&self) -> FilterState {
        self.prior
    }

    /// Perform a single predict-update step for observation `z`.
    pub fn step(&self, state: FilterState, z: f64) -> Result<KalmanUpdate, FilterError> {
        let FilterParameters {
            transition_coeff: f,
            observation_coeff: h,
            process_noise: q,
            measurement_noise: r,
        } = self.params;

        // Predict
        let x_pred = f * state.estimate;
        let p_pred = f * state.covariance * f + q;

        // Gain
        let denominator = h * p_pred * h + r;
        if denominator == 0.0 || !denominator.is_finite() {
            return Err(FilterError::DegenerateGain { denominator });
        }
        let gain = p_pred * h / denominator;

        // Correct
        let estimate = x_pred + gain * (z - h * x_pred);
        let covariance = (1.0 - gain * h) * p_pred;

        Ok(KalmanUpdate {
            state: FilterState::new(estimate, covariance),
            gain,
        })
    }

    /// Run the filter over a whole observation sequence.
    ///
    /// Element `t` of the output is the posterior after observation `t`.
    pub fn filter(&self, observations: &[f64]) -> Result<Vec<FilterState>, FilterError> {
        let mut states = Vec::with_capacity(observations.len());
        let mut state = self.initialize();
        for &z in observations {
            state = self.step(state, z)?.state;
            states.push(state);
        }
        Ok(states)
    }
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self {
            params: FilterParameters::default(),
            prior: FilterState::new(0.0, 1.0),
        }
    }
}

/// Hedge ratio estimator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HedgeRatioConfig {
    /// Filter coefficients
    #[serde(flatten)]
    pub filter: FilterParameters,
    /// Prior hedge ratio
    pub initial_estimate: f64,
    /// Prior covariance
    pub initial_covariance: f64,
    /// Added to the leg B price before dividing; a numerical safeguard for
    /// near-zero prices, not a model parameter
    pub epsilon: f64,
}

impl Default for HedgeRatioConfig {
    fn default() -> Self {
        Self {
            filter: FilterParameters::default(),
            initial_estimate: 1.0,
            initial_covariance: 1.0,
            epsilon: 1e-8,
        }
    }
}

/// Estimates a running hedge ratio from a pair of price series.
#[derive(Debug, Clone)]
pub struct HedgeRatioEstimator {
    filter: KalmanFilter,
    epsilon: f64,
}

impl HedgeRatioEstimator {
    /// Create an estimator from its configuration.
    pub fn new(config: HedgeRatioConfig) -> Result<Self, FilterError> {
        if !config.epsilon.is_finite() || config.epsilon < 0.0 {
            return Err(FilterError::InvalidParameter(format!(
                "epsilon must be finite and non-negative, got {}",
                config.epsilon
            )));
        }
        let filter = KalmanFilter::new(
            config.filter,
            config.initial_estimate,
            config.initial_covariance,
        )?;
        Ok(Self {
            filter,
            epsilon: config.epsilon,
        })
    }

    /// Hedge ratio at every observation, same length and order as the input.
    pub fn estimate(&self, pairs: &[PricePair]) -> Result<Vec<f64>, FilterError> {
        let observations: Vec<f64> = pairs.iter().map(|p| p.ratio(self.epsilon)).collect();
        self.run(&observations)
    }

    /// Same as [`estimate`](Self::estimate) over two price slices.
    pub fn estimate_prices(&self, prices_a: &[f64], prices_b: &[f64]) -> Result<Vec<f64>, FilterError> {
        if prices_a.len() != prices_b.len() {
            return Err(FilterError::LengthMismatch {
                left: prices_a.len(),
                right: prices_b.len(),
            });
        }
        self.run(&ratio_simd(prices_a, prices_b, self.epsilon))
    }

    fn run(&self, observations: &[f64]) -> Result<Vec<f64>, FilterError> {
        let ratios: Vec<f64> = self
            .filter
            .filter(observations)?
            .into_iter()
            .map(|s| s.estimate)
            .collect();

        if let Some(last) = ratios.last() {
            debug!(
                observations = ratios.len(),
                final_hedge_ratio = last,
                "Hedge ratio estimation complete"
            );
        }
        Ok(ratios)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_filter() -> KalmanFilter {
        KalmanFilter::new(FilterParameters::default(), 0.0, 1.0).unwrap()
    }

    #[test]
    fn test_single_step_matches_hand_calculation() {
        let filter = default_filter();
        let update = filter.step(filter.initialize(), 2.0).unwrap();

        let p_pred = 1.0 + 1e-5;
        let gain = p_pred / (p_pred + 1e-2);
        assert!((update.gain - gain).abs() < 1e-12);
        assert!((update.state.estimate - gain * 2.0).abs() < 1e-12);
        assert!((update.state.covariance - (1.0 - gain) * p_pred).abs() < 1e-12);
    }

    #[test]
    fn test_constant_stream_converges_monotonically() {
        let filter = default_filter();
        let c = 3.5;
        let states = filter.filter(&vec![c; 500]).unwrap();

        let mut prev = filter.initialize();
        for state in &states {
            assert!(state.estimate >= prev.estimate);
            assert!(state.estimate <= c);
            assert!(state.covariance <= prev.covariance + 1e-15);
            prev = *state;
        }
        assert!((states.last().unwrap().estimate - c).abs() < 1e-2);
    }

    #[test]
    fn test_estimate_is_causal() {
        let filter = default_filter();
        let base: Vec<f64> = (0..50).map(|i| 1.0 + (i as f64 * 0.3).sin()).collect();
        let mut altered = base.clone();
        for z in altered.iter_mut().skip(30) {
            *z *= -7.0;
        }

        let a = filter.filter(&base).unwrap();
        let b = filter.filter(&altered).unwrap();
        assert_eq!(a[..30], b[..30]);
        assert_ne!(a[30..], b[30..]);
    }

    #[test]
    fn test_invalid_noise_rejected() {
        let params = FilterParameters {
            process_noise: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            KalmanFilter::new(params, 0.0, 1.0),
            Err(FilterError::InvalidParameter(_))
        ));

        let params = FilterParameters {
            measurement_noise: -1e-3,
            ..Default::default()
        };
        assert!(KalmanFilter::new(params, 0.0, 1.0).is_err());

        let params = FilterParameters {
            transition_coeff: f64::NAN,
            ..Default::default()
        };
        assert!(KalmanFilter::new(params, 0.0, 1.0).is_err());
        assert!(KalmanFilter::new(FilterParameters::default(), 0.0, -1.0).is_err());
    }

    #[test]
    fn test_zero_denominator_reported() {
        // Bypass validation to reach the degenerate case
        let filter = KalmanFilter {
            params: FilterParameters {
                transition_coeff: 1.0,
                observation_coeff: 1.0,
                process_noise: 1e-5,
                measurement_noise: -1e-5,
            },
            prior: FilterState::new(0.0, 0.0),
        };
        let err = filter.step(filter.initialize(), 1.0).unwrap_err();
        assert_eq!(err, FilterError::DegenerateGain { denominator: 0.0 });
    }

    #[test]
    fn test_overflowing_covariance_reported() {
        let params = FilterParameters {
            transition_coeff: 1e200,
            ..Default::default()
        };
        let filter = KalmanFilter::new(params, 0.0, 1.0).unwrap();
        let err = filter.step(filter.initialize(), 1.0).unwrap_err();
        assert!(matches!(
            err,
            FilterError::DegenerateGain { denominator } if denominator.is_infinite()
        ));
    }

    #[test]
    fn test_hedge_ratio_tracks_price_ratio() {
        let estimator = HedgeRatioEstimator::new(HedgeRatioConfig::default()).unwrap();
        let pairs: Vec<PricePair> = (0..400)
            .map(|i| {
                let b = 100.0 + (i as f64 * 0.05).sin();
                PricePair::new(i, 1.8 * b, b)
            })
            .collect();

        let ratios = estimator.estimate(&pairs).unwrap();
        assert_eq!(ratios.len(), pairs.len());
        assert!((ratios.last().unwrap() - 1.8).abs() < 0.01);
    }

    #[test]
    fn test_estimate_prices_length_mismatch() {
        let estimator = HedgeRatioEstimator::new(HedgeRatioConfig::default()).unwrap();
        let err = estimator
            .estimate_prices(&[1.0, 2.0], &[1.0])
            .unwrap_err();
        assert_eq!(err, FilterError::LengthMismatch { left: 2, right: 1 });
    }

    #[test]
    fn test_slice_and_pair_drivers_agree() {
        let estimator = HedgeRatioEstimator::new(HedgeRatioConfig::default()).unwrap();
        let a: Vec<f64> = (0..37).map(|i| 120.0 + i as f64).collect();
        let b: Vec<f64> = (0..37).map(|i| 60.0 + (i as f64).sqrt()).collect();
        let pairs: Vec<PricePair> = a
            .iter()
            .zip(&b)
            .enumerate()
            .map(|(i, (&x, &y))| PricePair::new(i as i64, x, y))
            .collect();

        let from_pairs = estimator.estimate(&pairs).unwrap();
        let from_slices = estimator.estimate_prices(&a, &b).unwrap();
        for (x, y) in from_pairs.iter().zip(&from_slices) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        let estimator = HedgeRatioEstimator::new(HedgeRatioConfig::default()).unwrap();
        assert!(estimator.estimate(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_negative_epsilon_rejected() {
        let config = HedgeRatioConfig {
            epsilon: -1.0,
            ..Default::default()
        };
        assert!(HedgeRatioEstimator::new(config).is_err());
    }
}
