use crate::config::KalmanConfig;
use crate::num::{Number, Vector3};

/// Constant-value scalar Kalman filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarKalman {
    pub estimate: Number,
    pub variance: Number,
}

impl ScalarKalman {
    #[inline]
    pub fn new(measurement: Number) -> Self {
        Self {
            estimate: measurement,
            variance: 1.0,
        }
    }

    #[inline]
    pub fn update(&mut self, measurement: Number, process_noise: Number, measurement_noise: Number) -> Number {
        // predict
        let predicted = self.variance + process_noise;
        // correct
        let gain = predicted / (predicted + measurement_noise);
        self.estimate += gain * (measurement - self.estimate);
        self.variance = (1.0 - gain) * predicted;
        self.estimate
    }
}

/// Independent scalar filters on x, y and z.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionKalman {
    config: KalmanConfig,
    axes: Option<[ScalarKalman; 3]>,
}

impl PositionKalman {
    pub fn new(config: KalmanConfig) -> Self {
        Self { config, axes: None }
    }

    /// The first measurement seeds the filters and passes through unchanged.
    pub fn filter(&mut self, measurement: &Vector3) -> Vector3 {
        let config = self.config;
        match self.axes.as_mut() {
            None => {
                self.axes = Some([
                    ScalarKalman::new(measurement.x),
                    ScalarKalman::new(measurement.y),
                    ScalarKalman::new(measurement.z),
                ]);
                *measurement
            }
            Some(axes) => Vector3::from_fn(|i, _| {
                axes[i].update(measurement[i], config.process_noise, config.measurement_noise)
            }),
        }
    }

    #[inline]
    pub fn axes(&self) -> Option<&[ScalarKalman; 3]> {
        self.axes.as_ref()
    }

    pub fn reset(&mut self) {
        self.axes = None;
    }
}
