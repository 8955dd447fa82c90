use std::f64::consts::PI;

use super::types::{Glicko2Rating, RatingModel};
use crate::config::settings::Glicko2Settings;
use crate::errors::DomainError;

/// Ratio between the display scale and the internal Glicko-2 scale
const SCALE: f64 = 173.7178;
const MAX_ITERATIONS: usize = 10_000;

pub const WIN: f64 = 1.0;
pub const LOSS: f64 = 0.0;

/// Glicko-2 rating system (Glickman), one rating period per game
#[derive(Debug, Clone)]
pub struct Glicko2 {
    mu: f64,
    phi: f64,
    sigma: f64,
    tau: f64,
    epsilon: f64,
}

impl Glicko2 {
    pub fn new(settings: &Glicko2Settings) -> Self {
        Self {
            mu: settings.mu,
            phi: settings.phi,
            sigma: settings.sigma,
            tau: settings.tau,
            epsilon: settings.epsilon,
        }
    }

    /// The prior every new player starts from
    pub fn default_rating(&self) -> Glicko2Rating {
        Glicko2Rating::new(self.mu, self.phi, self.sigma)
    }

    /// Rates one player against a series of `(score, opponent)` results
    pub fn rate(
        &self,
        rating: &Glicko2Rating,
        series: &[(f64, Glicko2Rating)],
    ) -> Result<Glicko2Rating, DomainError> {
        rating.validate()?;
        let rating = self.scale_down(rating);

        if series.is_empty() {
            let phi_star = (rating.phi.powi(2) + rating.sigma.powi(2)).sqrt();
            return Ok(self.scale_up(&Glicko2Rating::new(rating.mu, phi_star, rating.sigma)));
        }

        let mut variance_inv = 0.0;
        let mut difference = 0.0;
        for (actual_score, other) in series {
            other.validate()?;
            let other = self.scale_down(other);
            let impact = reduce_impact(other.phi);
            let expected = expect_score(rating.mu, other.mu, impact);
            variance_inv += impact.powi(2) * expected * (1.0 - expected);
            difference += impact * (actual_score - expected);
        }

        difference /= variance_inv;
        let variance = 1.0 / variance_inv;

        let sigma = self.determine_sigma(&rating, difference, variance)?;
        let phi_star = (rating.phi.powi(2) + sigma.powi(2)).sqrt();
        let phi = 1.0 / (1.0 / phi_star.powi(2) + 1.0 / variance).sqrt();
        let mu = rating.mu + phi.powi(2) * (difference / variance);

        Ok(self.scale_up(&Glicko2Rating::new(mu, phi, sigma)))
    }

    /// Both players' next ratings, each computed from the pre-game pair
    pub fn rate_1vs1(
        &self,
        winner: &Glicko2Rating,
        loser: &Glicko2Rating,
    ) -> Result<(Glicko2Rating, Glicko2Rating), DomainError> {
        let new_winner = self.rate(winner, &[(WIN, *loser)])?;
        let new_loser = self.rate(loser, &[(LOSS, *winner)])?;
        Ok((new_winner, new_loser))
    }

    /// Probability that `a` wins one game against `b`
    pub fn expect(&self, a: &Glicko2Rating, b: &Glicko2Rating) -> f64 {
        let a = self.scale_down(a);
        let b = self.scale_down(b);
        expect_score(a.mu, b.mu, reduce_impact(b.phi))
    }

    /// Directional expectations averaged into one per-game probability for `a`
    pub fn game_probability(&self, a: &Glicko2Rating, b: &Glicko2Rating) -> f64 {
        (self.expect(a, b) + (1.0 - self.expect(b, a))) / 2.0
    }

    /// 1.0 for a coin flip, approaching 0.0 as one side dominates
    pub fn quality_1vs1(&self, a: &Glicko2Rating, b: &Glicko2Rating) -> f64 {
        let a = self.scale_down(a);
        let b = self.scale_down(b);
        let expected_a = expect_score(a.mu, b.mu, reduce_impact(a.phi));
        let expected_b = expect_score(b.mu, a.mu, reduce_impact(b.phi));
        let expected = (expected_a + (1.0 - expected_b)) / 2.0;
        2.0 * (0.5 - (0.5 - expected).abs())
    }

    fn scale_down(&self, rating: &Glicko2Rating) -> Glicko2Rating {
        Glicko2Rating::new((rating.mu - self.mu) / SCALE, rating.phi / SCALE, rating.sigma)
    }

    fn scale_up(&self, rating: &Glicko2Rating) -> Glicko2Rating {
        Glicko2Rating::new(rating.mu * SCALE + self.mu, rating.phi * SCALE, rating.sigma)
    }

    /// New volatility via the Illinois variant of regula falsi
    fn determine_sigma(
        &self,
        rating: &Glicko2Rating,
        difference: f64,
        variance: f64,
    ) -> Result<f64, DomainError> {
        let phi_sq = rating.phi.powi(2);
        let difference_sq = difference.powi(2);
        let alpha = rating.sigma.powi(2).ln();
        let tau_sq = self.tau.powi(2);

        let f = |x: f64| {
            let tmp = phi_sq + variance + x.exp();
            let a = x.exp() * (difference_sq - tmp) / (2.0 * tmp.powi(2));
            let b = (x - alpha) / tau_sq;
            a - b
        };

        let mut a = alpha;
        let mut b = if difference_sq > phi_sq + variance {
            (difference_sq - phi_sq - variance).ln()
        } else {
            let mut k = 1.0;
            while f(alpha - k * self.tau) < 0.0 {
                k += 1.0;
                if k as usize > MAX_ITERATIONS {
                    return Err(DomainError::VolatilityDiverged { iterations: MAX_ITERATIONS });
                }
            }
            alpha - k * self.tau
        };

        let mut f_a = f(a);
        let mut f_b = f(b);
        let mut iterations = 0;
        while (b - a).abs() > self.epsilon {
            iterations += 1;
            if iterations > MAX_ITERATIONS {
                return Err(DomainError::VolatilityDiverged { iterations });
            }

            let c = a + (a - b) * f_a / (f_b - f_a);
            let f_c = f(c);
            if f_c * f_b < 0.0 {
                a = b;
                f_a = f_b;
            } else {
                f_a /= 2.0;
            }
            b = c;
            f_b = f_c;
        }

        Ok((a / 2.0).exp())
    }
}

impl Default for Glicko2 {
    fn default() -> Self {
        Self::new(&Glicko2Settings::default())
    }
}

impl RatingModel for Glicko2 {
    type Side = Glicko2Rating;

    fn expected_outcome(&self, a: &Glicko2Rating, b: &Glicko2Rating) -> f64 {
        self.expect(a, b)
    }

    fn update(
        &self,
        winner: &Glicko2Rating,
        loser: &Glicko2Rating,
    ) -> Result<(Glicko2Rating, Glicko2Rating), DomainError> {
        self.rate_1vs1(winner, loser)
    }

    fn quality(&self, a: &Glicko2Rating, b: &Glicko2Rating) -> f64 {
        self.quality_1vs1(a, b)
    }
}

/// g(phi): shrinks the weight of a result against an uncertain opponent
fn reduce_impact(phi: f64) -> f64 {
    1.0 / (1.0 + (3.0 * phi.powi(2)) / PI.powi(2)).sqrt()
}

fn expect_score(mu: f64, other_mu: f64, impact: f64) -> f64 {
    1.0 / (1.0 + (-impact * (mu - other_mu)).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glickman_paper_example() {
        // Glickman's worked example: 1500/200/0.06 against three opponents, tau 0.5
        let settings = Glicko2Settings {
            tau: 0.5,
            ..Glicko2Settings::default()
        };
        let glicko = Glicko2::new(&settings);
        let player = Glicko2Rating::new(1500.0, 200.0, 0.06);
        let series = [
            (WIN, Glicko2Rating::new(1400.0, 30.0, 0.06)),
            (LOSS, Glicko2Rating::new(1550.0, 100.0, 0.06)),
            (LOSS, Glicko2Rating::new(1700.0, 300.0, 0.06)),
        ];

        let rated = glicko.rate(&player, &series).unwrap();
        assert!((rated.mu - 1464.06).abs() < 0.1, "mu = {}", rated.mu);
        assert!((rated.phi - 151.52).abs() < 0.1, "phi = {}", rated.phi);
        assert!((rated.sigma - 0.05999).abs() < 1e-4, "sigma = {}", rated.sigma);
    }

    #[test]
    fn test_win_raises_and_loss_lowers() {
        let glicko = Glicko2::default();
        let a = glicko.default_rating();
        let b = Glicko2Rating::new(1620.0, 120.0, 0.06);

        let (a_won, b_lost) = glicko.rate_1vs1(&a, &b).unwrap();
        assert!(a_won.mu > a.mu);
        assert!(b_lost.mu < b.mu);
        assert!(a_won.phi < a.phi);

        let (b_won, a_lost) = glicko.rate_1vs1(&b, &a).unwrap();
        assert!(b_won.mu > b.mu);
        assert!(a_lost.mu < a.mu);
    }

    #[test]
    fn test_update_is_two_sided_from_pre_game_state() {
        let glicko = Glicko2::default();
        let a = Glicko2Rating::new(1550.0, 90.0, 0.06);
        let b = Glicko2Rating::new(1480.0, 140.0, 0.06);

        let (new_a, new_b) = glicko.update(&a, &b).unwrap();
        // b's update must see a's pre-game rating, not new_a
        let b_only = glicko.rate(&b, &[(LOSS, a)]).unwrap();
        assert_eq!(new_b, b_only);
        assert_eq!(new_a, glicko.rate(&a, &[(WIN, b)]).unwrap());
    }

    #[test]
    fn test_quality_is_symmetric_and_peaks_at_equal_ratings() {
        let glicko = Glicko2::default();
        let a = Glicko2Rating::new(1700.0, 80.0, 0.06);
        let b = Glicko2Rating::new(1450.0, 200.0, 0.06);

        assert!((glicko.quality(&a, &b) - glicko.quality(&b, &a)).abs() < 1e-12);
        assert!((glicko.quality(&a, &a) - 1.0).abs() < 1e-12);
        assert!(glicko.quality(&a, &b) < 1.0);
        assert!(glicko.quality(&a, &b) > 0.0);
    }

    #[test]
    fn test_game_probability_is_complementary() {
        let glicko = Glicko2::default();
        let a = Glicko2Rating::new(1650.0, 70.0, 0.06);
        let b = Glicko2Rating::new(1500.0, 250.0, 0.06);
        let p_ab = glicko.game_probability(&a, &b);
        let p_ba = glicko.game_probability(&b, &a);
        assert!(p_ab > 0.5);
        assert!((p_ab + p_ba - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_deviation_is_rejected() {
        let glicko = Glicko2::default();
        let bad = Glicko2Rating::new(1500.0, -1.0, 0.06);
        let err = glicko.rate_1vs1(&bad, &glicko.default_rating()).unwrap_err();
        assert!(matches!(err, DomainError::NonPositive { parameter: "phi", .. }));
    }
}
