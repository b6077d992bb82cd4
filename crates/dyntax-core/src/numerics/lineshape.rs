//! Gaussian peak used to broaden discrete transitions.
//!
//! `height * exp(-2 * ((x - centre) / breadth)^2)`. The breadth must be
//! positive; a zero breadth divides by zero and is rejected upstream by
//! [`crate::common::SynthesisConfig::validate`]. Non-finite inputs propagate
//! as NaN.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianLineShape {
    pub centre: f64,
    pub height: f64,
    pub breadth: f64,
}

impl GaussianLineShape {
    pub const fn new(centre: f64, height: f64, breadth: f64) -> Self {
        Self {
            centre,
            height,
            breadth,
        }
    }

    pub fn value(&self, x: f64) -> f64 {
        gaussian_at(x, self.centre, self.height, self.breadth)
    }

    pub fn values(&self, xs: &[f64]) -> Vec<f64> {
        gaussian(xs, self.centre, self.height, self.breadth)
    }
}

pub fn gaussian_at(x: f64, centre: f64, height: f64, breadth: f64) -> f64 {
    let reduced = (x - centre) / breadth;
    height * (-2.0 * reduced * reduced).exp()
}

pub fn gaussian(xs: &[f64], centre: f64, height: f64, breadth: f64) -> Vec<f64> {
    xs.iter()
        .map(|&x| gaussian_at(x, centre, height, breadth))
        .collect()
}
