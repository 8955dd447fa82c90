use super::gaussian::{cdf, pdf, ppf};
use super::types::{RatingModel, Team, TrueSkillRating};
use crate::config::settings::TrueSkillSettings;
use crate::errors::DomainError;

const TEAM_SIZE: usize = 2;
const PLAYERS_PER_GAME: usize = 2 * TEAM_SIZE;

/// How a two-team game ended, from the first team's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamOutcome {
    FirstWins,
    Drawn,
}

/// TrueSkill for exactly two teams of two. With a single comparison factor the
/// message passing schedule converges in one sweep, so the update is closed form.
#[derive(Debug, Clone)]
pub struct TrueSkill {
    mu: f64,
    sigma: f64,
    beta: f64,
    tau: f64,
    draw_probability: f64,
}

impl TrueSkill {
    pub fn new(settings: &TrueSkillSettings) -> Self {
        Self {
            mu: settings.mu,
            sigma: settings.sigma,
            beta: settings.beta,
            tau: settings.tau,
            draw_probability: settings.draw_probability,
        }
    }

    pub fn default_rating(&self) -> TrueSkillRating {
        TrueSkillRating::new(self.mu, self.sigma)
    }

    /// Rates `first` against `second`; for a win, `first` is the winning team
    pub fn rate(
        &self,
        first: &Team,
        second: &Team,
        outcome: TeamOutcome,
    ) -> Result<(Team, Team), DomainError> {
        validate_team(first)?;
        validate_team(second)?;
        if !(0.0..1.0).contains(&self.draw_probability) {
            return Err(DomainError::ProbabilityOutOfRange {
                function: "TrueSkill draw probability",
                value: self.draw_probability,
            });
        }

        let first_var = self.dynamic_variances(first);
        let second_var = self.dynamic_variances(second);

        let c_sq = first_var.iter().chain(second_var.iter()).sum::<f64>()
            + PLAYERS_PER_GAME as f64 * self.beta.powi(2);
        let c = c_sq.sqrt();

        let diff = (team_mu(first) - team_mu(second)) / c;
        let margin = self.draw_margin() / c;

        let (v, w) = match outcome {
            TeamOutcome::FirstWins => (v_win(diff, margin), w_win(diff, margin)),
            TeamOutcome::Drawn => (v_draw(diff, margin)?, w_draw(diff, margin)?),
        };

        let update = |team: &Team, variances: &[f64; TEAM_SIZE], sign: f64| -> Team {
            let mut next = *team;
            for (rating, &var) in next.iter_mut().zip(variances.iter()) {
                rating.mu += sign * var / c * v;
                rating.sigma = (var * (1.0 - var / c_sq * w).max(0.0)).sqrt();
            }
            next
        };

        Ok((update(first, &first_var, 1.0), update(second, &second_var, -1.0)))
    }

    /// Draw likelihood of the pairing; independent of which side is listed first
    pub fn quality(&self, a: &Team, b: &Team) -> f64 {
        let beta_sq = PLAYERS_PER_GAME as f64 * self.beta.powi(2);
        let denom = beta_sq + sum_variance(a, b);
        let delta = team_mu(a) - team_mu(b);
        (-delta.powi(2) / (2.0 * denom)).exp() * (beta_sq / denom).sqrt()
    }

    /// Probability that team `a` beats team `b`
    pub fn win_probability(&self, a: &Team, b: &Team) -> f64 {
        let delta = team_mu(a) - team_mu(b);
        let denom = (PLAYERS_PER_GAME as f64 * self.beta.powi(2) + sum_variance(a, b)).sqrt();
        cdf(delta / denom)
    }

    fn dynamic_variances(&self, team: &Team) -> [f64; TEAM_SIZE] {
        [
            team[0].sigma.powi(2) + self.tau.powi(2),
            team[1].sigma.powi(2) + self.tau.powi(2),
        ]
    }

    fn draw_margin(&self) -> f64 {
        ppf((self.draw_probability + 1.0) / 2.0) * (PLAYERS_PER_GAME as f64).sqrt() * self.beta
    }
}

impl Default for TrueSkill {
    fn default() -> Self {
        Self::new(&TrueSkillSettings::default())
    }
}

impl RatingModel for TrueSkill {
    type Side = Team;

    fn expected_outcome(&self, a: &Team, b: &Team) -> f64 {
        self.win_probability(a, b)
    }

    fn update(&self, winner: &Team, loser: &Team) -> Result<(Team, Team), DomainError> {
        self.rate(winner, loser, TeamOutcome::FirstWins)
    }

    fn quality(&self, a: &Team, b: &Team) -> f64 {
        TrueSkill::quality(self, a, b)
    }
}

fn validate_team(team: &Team) -> Result<(), DomainError> {
    team.iter().try_for_each(TrueSkillRating::validate)
}

fn team_mu(team: &Team) -> f64 {
    team.iter().map(|r| r.mu).sum()
}

fn sum_variance(a: &Team, b: &Team) -> f64 {
    a.iter().chain(b.iter()).map(|r| r.sigma.powi(2)).sum()
}

fn v_win(diff: f64, margin: f64) -> f64 {
    let x = diff - margin;
    let denom = cdf(x);
    if denom > 0.0 { pdf(x) / denom } else { -x }
}

fn w_win(diff: f64, margin: f64) -> f64 {
    let x = diff - margin;
    let v = v_win(diff, margin);
    (v * (v + x)).clamp(0.0, 1.0)
}

fn v_draw(diff: f64, margin: f64) -> Result<f64, DomainError> {
    let abs_diff = diff.abs();
    let a = margin - abs_diff;
    let b = -margin - abs_diff;
    let denom = cdf(a) - cdf(b);
    let value = if denom > 0.0 { (pdf(b) - pdf(a)) / denom } else { a };
    if !value.is_finite() {
        return Err(DomainError::NonFinite {
            model: "TrueSkill",
            parameter: "draw update",
            value,
        });
    }
    Ok(if diff < 0.0 { -value } else { value })
}

fn w_draw(diff: f64, margin: f64) -> Result<f64, DomainError> {
    let abs_diff = diff.abs();
    let a = margin - abs_diff;
    let b = -margin - abs_diff;
    let denom = cdf(a) - cdf(b);
    if denom <= 0.0 {
        // a draw is impossible without a positive draw margin
        return Err(DomainError::NonPositive {
            model: "TrueSkill",
            parameter: "draw margin",
            value: margin,
        });
    }
    let v = v_draw(abs_diff, margin)?;
    Ok(v.powi(2) + (a * pdf(a) - b * pdf(b)) / denom)
}
