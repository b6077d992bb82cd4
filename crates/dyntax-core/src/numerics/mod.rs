pub mod lineshape;

pub use lineshape::{gaussian, gaussian_at, GaussianLineShape};

/// Element-wise comparison under an absolute tolerance.
pub trait ApproxEq<Rhs: ?Sized = Self> {
    fn approx_eq(&self, other: &Rhs, tolerance: f64) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &f64, tolerance: f64) -> bool {
        (self - other).abs() <= tolerance
    }
}

impl<T: ApproxEq> ApproxEq for [T] {
    fn approx_eq(&self, other: &[T], tolerance: f64) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|(lhs, rhs)| lhs.approx_eq(rhs, tolerance))
    }
}

impl<T: ApproxEq> ApproxEq for Vec<T> {
    fn approx_eq(&self, other: &Vec<T>, tolerance: f64) -> bool {
        self.as_slice().approx_eq(other.as_slice(), tolerance)
    }
}

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

pub fn stable_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;

    for &value in values {
        kahan_add(&mut sum, &mut correction, value);
    }

    sum
}

/// Mean and population standard deviation; `None` for an empty slice.
pub fn mean_and_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }

    let count = values.len() as f64;
    let mean = stable_sum(values) / count;

    let mut sum = 0.0;
    let mut correction = 0.0;
    for &value in values {
        let deviation = value - mean;
        kahan_add(&mut sum, &mut correction, deviation * deviation);
    }

    Some((mean, (sum / count).sqrt()))
}

/// `count` evenly spaced points over `[start, stop]`, both ends included.
///
/// A single point lands on `start`; zero points yield an empty vector.
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            (0..count)
                .map(|index| {
                    if index == count - 1 {
                        stop
                    } else {
                        start + step * index as f64
                    }
                })
                .collect()
        }
    }
}
