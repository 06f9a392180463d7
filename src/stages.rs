/// Life-stage registry for the bangus pond monitoring service.
///
/// Defines the canonical growth stages of farmed milkfish along with their
/// feeding recommendations. This is the single source of truth for stage ids
/// and feed parameters — all other modules should reference stages from here
/// rather than hardcoding values.
///
/// Reference data only; nothing here is mutated at runtime.

// ---------------------------------------------------------------------------
// Stage identity
// ---------------------------------------------------------------------------

/// A milkfish growth stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifeStage {
    Fingerling,
    Juvenile,
    Adult,
    Broodstock,
}

impl LifeStage {
    /// Stage id as stored in the backend's fish-data payload.
    pub fn id(&self) -> &'static str {
        match self {
            LifeStage::Fingerling => "fingerling",
            LifeStage::Juvenile => "juvenile",
            LifeStage::Adult => "adult",
            LifeStage::Broodstock => "broodstock",
        }
    }

    /// Parses a stored stage id. Returns `None` for unknown ids.
    pub fn from_id(id: &str) -> Option<LifeStage> {
        STAGE_REGISTRY
            .iter()
            .map(|p| p.stage)
            .find(|s| s.id() == id)
    }
}

impl std::fmt::Display for LifeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Stage assumed for a pond whose operator has not picked one yet.
pub const DEFAULT_STAGE: LifeStage = LifeStage::Fingerling;

// ---------------------------------------------------------------------------
// Stage profiles
// ---------------------------------------------------------------------------

/// Feeding parameters for a single growth stage.
pub struct StageProfile {
    pub stage: LifeStage,
    /// Human-readable name with the typical age window.
    pub label: &'static str,
    /// Body-weight range in grams for fish in this stage.
    pub min_weight_g: f64,
    pub max_weight_g: f64,
    /// Daily feed ration as a fraction of total body weight.
    pub feed_fraction_bw: f64,
    /// Recommended feeding sessions per day. Also the cap on how many
    /// automated schedules may exist while the pond is in this stage.
    pub recommended_sessions: u32,
}

/// All milkfish growth stages, ordered from youngest to oldest.
///
/// Weight ranges and rations follow standard brackish-water grow-out
/// practice: small fish eat a larger fraction of their body weight,
/// spread over more sessions.
pub static STAGE_REGISTRY: &[StageProfile] = &[
    StageProfile {
        stage: LifeStage::Fingerling,
        label: "Fingerling (1-3 months)",
        min_weight_g: 5.0,
        max_weight_g: 70.0,
        feed_fraction_bw: 0.10,
        recommended_sessions: 4,
    },
    StageProfile {
        stage: LifeStage::Juvenile,
        label: "Juvenile (3-5 months)",
        min_weight_g: 70.0,
        max_weight_g: 250.0,
        feed_fraction_bw: 0.06,
        recommended_sessions: 3,
    },
    StageProfile {
        stage: LifeStage::Adult,
        label: "Adult (5+ months)",
        min_weight_g: 250.0,
        max_weight_g: 500.0,
        feed_fraction_bw: 0.04,
        recommended_sessions: 2,
    },
    StageProfile {
        stage: LifeStage::Broodstock,
        label: "Broodstock (breeding)",
        min_weight_g: 500.0,
        max_weight_g: 2000.0,
        feed_fraction_bw: 0.025,
        recommended_sessions: 2,
    },
];

/// Looks up the profile for a stage. Every `LifeStage` variant has exactly
/// one registry entry, enforced by test.
pub fn profile_for(stage: LifeStage) -> &'static StageProfile {
    STAGE_REGISTRY
        .iter()
        .find(|p| p.stage == stage)
        .unwrap_or(&STAGE_REGISTRY[0])
}

/// Looks up a profile by stored stage id. Returns `None` if not found.
pub fn find_profile(id: &str) -> Option<&'static StageProfile> {
    STAGE_REGISTRY.iter().find(|p| p.stage.id() == id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
