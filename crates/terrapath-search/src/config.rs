//! Search configuration.

/// How speed multipliers above 1 are reconciled with the octile heuristic.
///
/// The heuristic assumes an orthogonal step never costs less than 1, which
/// only holds while every multiplier is at most 1.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SpeedPolicy {
    /// Treat multipliers above 1 as exactly 1.
    #[default]
    Clamp,
    /// Keep multipliers as given and divide the heuristic by the fastest
    /// multiplier in the field.
    ScaleHeuristic,
}

/// Settings for one search episode.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Multiplier handling, see [`SpeedPolicy`].
    pub speed_policy: SpeedPolicy,
    /// Publish a [`SearchSnapshot`](crate::SearchSnapshot) every N
    /// iterations (0 = never).
    pub snapshot_every: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            speed_policy: SpeedPolicy::Clamp,
            snapshot_every: 0,
        }
    }
}

impl SearchConfig {
    /// Builder-style setter for [`speed_policy`](Self::speed_policy).
    pub fn with_speed_policy(mut self, policy: SpeedPolicy) -> Self {
        self.speed_policy = policy;
        self
    }

    /// Builder-style setter for [`snapshot_every`](Self::snapshot_every).
    pub fn with_snapshot_every(mut self, every: u32) -> Self {
        self.snapshot_every = every;
        self
    }
}
