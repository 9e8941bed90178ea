//! Pure scoring functions used to rank loot targets and objectives.
//!
//! - [`score_target`] trades value against distance: `value / d²`, with the
//!   distance floored at [`MIN_DISTANCE`] so targets underfoot do not blow
//!   the priority up.
//! - [`weighted_pick`] draws one candidate with probability skewed toward a
//!   higher value per inventory cell. The draw is a weighted random key
//!   (`u^(1/w)`) rather than a strict maximum, so bots vary their picks.
//! - [`graded_search`] walks distance tiers from the farthest to the closest
//!   and returns the first tier's hit. The closest tier always starts within
//!   [`GUARANTEED_REACH_DISTANCE`] so a fallback exists.

use rand::Rng;
use serde::Deserialize;

use crate::error::BrainError;

/// Distances below this are treated as this for scoring.
pub const MIN_DISTANCE: f64 = 0.5;

/// The closest fallback tier must start at or below this distance.
pub const GUARANTEED_REACH_DISTANCE: f64 = 10.0;

/// Priority of a target worth `value` at `distance`.
///
/// Non-decreasing in value, non-increasing in distance. A zero (or
/// negative) value yields zero priority regardless of distance.
pub fn score_target(value: f64, distance: f64) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    let d = distance.max(MIN_DISTANCE);
    value / (d * d)
}

/// Price divided by the number of inventory cells; 0 for a zero-area item.
pub fn price_per_slot(price: f64, width: u32, height: u32) -> f64 {
    let area = width.saturating_mul(height);
    if area == 0 {
        return 0.0;
    }
    price / f64::from(area)
}

/// Draw one candidate, biased toward higher `weight_of` values.
///
/// Each candidate gets the key `u^(1/w)` for a uniform `u` when its weight
/// `w` is positive, or plain `u` otherwise; the largest key wins. Returns the
/// index and the candidate, or `None` for an empty slice. Candidates are not
/// mutated; only the RNG state advances.
pub fn weighted_pick<'a, T, R>(
    candidates: &'a [T],
    weight_of: impl Fn(&T) -> f64,
    rng: &mut R,
) -> Option<(usize, &'a T)>
where
    R: Rng + ?Sized,
{
    let mut best: Option<(usize, &'a T, f64)> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let u: f64 = rng.random();
        let weight = weight_of(candidate);
        let key = if weight > 0.0 { u.powf(1.0 / weight) } else { u };

        match best {
            Some((_, _, best_key)) if key <= best_key => {}
            _ => best = Some((index, candidate, key)),
        }
    }

    best.map(|(index, candidate, _)| (index, candidate))
}

/// One band of a graded search, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DistanceTier {
    /// Nearest distance covered by the tier.
    pub min: f64,
    /// Farthest distance covered by the tier.
    pub max: f64,
}

impl DistanceTier {
    /// Create a tier covering `[min, max]`.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `distance` falls inside the tier.
    pub fn contains(&self, distance: f64) -> bool {
        self.min <= distance && distance <= self.max
    }
}

/// An ordered, validated list of tiers: farthest first, closest last.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<DistanceTier>")]
pub struct DistanceTiers(Vec<DistanceTier>);

impl DistanceTiers {
    /// Validate and wrap a tier list.
    ///
    /// # Errors
    ///
    /// Returns [`BrainError::InvalidTiers`] if the list is empty, a tier is
    /// inverted or negative, the tiers are not ordered farthest first, or the
    /// closest tier starts beyond [`GUARANTEED_REACH_DISTANCE`].
    pub fn new(tiers: Vec<DistanceTier>) -> Result<Self, BrainError> {
        let Some(closest) = tiers.last() else {
            return Err(BrainError::InvalidTiers {
                reason: "at least one tier is required".to_owned(),
            });
        };

        if closest.min > GUARANTEED_REACH_DISTANCE {
            return Err(BrainError::InvalidTiers {
                reason: format!(
                    "closest tier starts at {} but must start within {GUARANTEED_REACH_DISTANCE}",
                    closest.min
                ),
            });
        }

        for tier in &tiers {
            if tier.min < 0.0 || tier.min > tier.max {
                return Err(BrainError::InvalidTiers {
                    reason: format!("tier [{}, {}] is inverted or negative", tier.min, tier.max),
                });
            }
        }

        let out_of_order = tiers
            .iter()
            .zip(tiers.iter().skip(1))
            .find(|(farther, nearer)| nearer.max > farther.max);
        if let Some((_, nearer)) = out_of_order {
            return Err(BrainError::InvalidTiers {
                reason: format!(
                    "tier [{}, {}] is farther than the tier before it",
                    nearer.min, nearer.max
                ),
            });
        }

        Ok(Self(tiers))
    }

    /// Wrap tiers that are valid by construction.
    pub(crate) const fn from_validated(tiers: Vec<DistanceTier>) -> Self {
        Self(tiers)
    }

    /// The tiers, farthest first.
    pub fn tiers(&self) -> &[DistanceTier] {
        &self.0
    }
}

impl TryFrom<Vec<DistanceTier>> for DistanceTiers {
    type Error = BrainError;

    fn try_from(tiers: Vec<DistanceTier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

/// Probe each tier in order and return the first hit.
pub fn graded_search<T>(
    tiers: &DistanceTiers,
    mut probe: impl FnMut(&DistanceTier) -> Option<T>,
) -> Option<T> {
    tiers.tiers().iter().find_map(|tier| probe(tier))
}
