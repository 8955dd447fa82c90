//! Standard normal helpers shared by TrueSkill and the matchup search

use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::{PI, SQRT_2};

pub fn pdf(x: f64) -> f64 {
    (-x * x / 2.0).exp() / (2.0 * PI).sqrt()
}

pub fn cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Inverse of `cdf` for `p` in (0, 1)
pub fn ppf(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdf_known_values() {
        assert!((cdf(0.0) - 0.5).abs() < 1e-12);
        assert!((cdf(1.96) - 0.975).abs() < 1e-4);
        assert!((cdf(-1.0) + cdf(1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ppf_inverts_cdf() {
        for x in [-2.5, -0.3, 0.0, 0.7, 1.8] {
            assert!((ppf(cdf(x)) - x).abs() < 1e-8, "x = {x}");
        }
    }

    #[test]
    fn test_pdf_peak() {
        assert!((pdf(0.0) - 0.398_942_280_4).abs() < 1e-9);
        assert_eq!(pdf(1.3), pdf(-1.3));
    }
}
