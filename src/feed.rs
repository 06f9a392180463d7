/// Feed ration estimation.
///
/// Daily ration follows the standard grow-out rule: average body weight for
/// the stage times population gives total biomass, and the stage's feed
/// fraction of body weight gives the daily mass, split evenly across the
/// day's feeding sessions.

use crate::model::EvalError;
use crate::stages::{LifeStage, StageProfile};

/// Feeder auger run time per session, bounded by the hardware.
pub const MIN_FEED_DURATION_SECS: u32 = 1;
pub const MAX_FEED_DURATION_SECS: u32 = 30;

/// Estimated feed mass for one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedEstimate {
    pub total_grams: f64,
    pub per_session_grams: f64,
}

/// Computes the daily feed mass for a pond population.
///
/// `sessions_per_day` must be at least 1; zero sessions is a contract
/// violation rather than an infinite per-session ration.
pub fn estimate_feed_mass(
    population: u32,
    profile: &StageProfile,
    sessions_per_day: u32,
) -> Result<FeedEstimate, EvalError> {
    if sessions_per_day == 0 {
        return Err(EvalError::InvalidArgument(
            "feeding sessions per day must be at least 1".to_string(),
        ));
    }

    let avg_body_weight_g = (profile.min_weight_g + profile.max_weight_g) / 2.0;
    let total_body_weight_g = avg_body_weight_g * f64::from(population);
    let total_grams = total_body_weight_g * profile.feed_fraction_bw;

    Ok(FeedEstimate {
        total_grams,
        per_session_grams: total_grams / f64::from(sessions_per_day),
    })
}

/// Convenience wrapper using the stage's recommended session count.
pub fn estimate_with_recommended(
    population: u32,
    profile: &StageProfile,
) -> Result<FeedEstimate, EvalError> {
    estimate_feed_mass(population, profile, profile.recommended_sessions)
}

// ---------------------------------------------------------------------------
// Manual feed command
// ---------------------------------------------------------------------------

/// Payload for the dashboard's "Feed Now" trigger, consumed by the device
/// firmware. The firmware runs the auger for `duration_secs` and the adapter
/// clears `active` afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCommand {
    pub active: bool,
    pub life_stage: LifeStage,
    pub population: u32,
    pub duration_secs: u32,
}

/// Builds a validated manual-feed command.
pub fn feed_command(
    life_stage: LifeStage,
    population: u32,
    duration_secs: u32,
) -> Result<FeedCommand, EvalError> {
    if !(MIN_FEED_DURATION_SECS..=MAX_FEED_DURATION_SECS).contains(&duration_secs) {
        return Err(EvalError::InvalidArgument(format!(
            "feed duration {}s outside {}..={}s",
            duration_secs, MIN_FEED_DURATION_SECS, MAX_FEED_DURATION_SECS
        )));
    }
    Ok(FeedCommand {
        active: true,
        life_stage,
        population,
        duration_secs,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
