use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Glicko-2 state on the display scale (mu around 1500, phi in rating points)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glicko2Rating {
    pub mu: f64,
    pub phi: f64,
    pub sigma: f64,
}

impl Glicko2Rating {
    pub fn new(mu: f64, phi: f64, sigma: f64) -> Self {
        Self { mu, phi, sigma }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        require_finite("Glicko-2", "mu", self.mu)?;
        require_positive("Glicko-2", "phi", self.phi)?;
        require_positive("Glicko-2", "sigma", self.sigma)
    }
}

/// One player's Gaussian skill estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrueSkillRating {
    pub mu: f64,
    pub sigma: f64,
}

impl TrueSkillRating {
    pub fn new(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        require_finite("TrueSkill", "mu", self.mu)?;
        require_positive("TrueSkill", "sigma", self.sigma)
    }
}

/// A doubles side: two independent estimates
pub type Team = [TrueSkillRating; 2];

/// Either model's state, for code that handles both modes uniformly
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatingState {
    Pairwise(Glicko2Rating),
    Team(TrueSkillRating),
}

impl RatingState {
    pub fn mu(&self) -> f64 {
        match self {
            RatingState::Pairwise(r) => r.mu,
            RatingState::Team(r) => r.mu,
        }
    }

    /// phi for Glicko-2, sigma for TrueSkill
    pub fn uncertainty(&self) -> f64 {
        match self {
            RatingState::Pairwise(r) => r.phi,
            RatingState::Team(r) => r.sigma,
        }
    }

    /// Glicko-2 volatility; TrueSkill has none
    pub fn volatility(&self) -> Option<f64> {
        match self {
            RatingState::Pairwise(r) => Some(r.sigma),
            RatingState::Team(_) => None,
        }
    }
}

impl From<Glicko2Rating> for RatingState {
    fn from(r: Glicko2Rating) -> Self {
        RatingState::Pairwise(r)
    }
}

impl From<TrueSkillRating> for RatingState {
    fn from(r: TrueSkillRating) -> Self {
        RatingState::Team(r)
    }
}

/// What both rating models can do with two opposing sides
pub trait RatingModel {
    /// A single rating for one-on-one play, a team for two-on-two
    type Side: Clone;

    /// Probability that `a` beats `b`
    fn expected_outcome(&self, a: &Self::Side, b: &Self::Side) -> f64;

    /// Both sides' next state after `winner` beats `loser`, computed from the same
    /// pre-game states. Never apply this as two one-sided updates.
    fn update(
        &self,
        winner: &Self::Side,
        loser: &Self::Side,
    ) -> Result<(Self::Side, Self::Side), DomainError>;

    /// Symmetric closeness score in [0, 1]
    fn quality(&self, a: &Self::Side, b: &Self::Side) -> f64;
}

fn require_finite(
    model: &'static str,
    parameter: &'static str,
    value: f64,
) -> Result<(), DomainError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DomainError::NonFinite { model, parameter, value })
    }
}

fn require_positive(
    model: &'static str,
    parameter: &'static str,
    value: f64,
) -> Result<(), DomainError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DomainError::NonPositive { model, parameter, value })
    }
}
