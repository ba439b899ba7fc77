//! Combat rules - damage application and death detection
//!
//! Damage and the death threshold are fixed policy constants, not
//! per-instance configuration.

/// Health assigned at spawn and respawn
pub const MAX_HEALTH: i32 = 100;

/// Health removed per registered hit
pub const DAMAGE_PER_HIT: i32 = 5;

/// Apply damage to health, returns (new_health, is_lethal).
/// Health is floored at 0, never negative.
pub fn absorb(current_health: i32, damage: i32) -> (i32, bool) {
    let new_health = (current_health - damage).max(0);
    (new_health, new_health <= 0)
}

/// Result of applying damage to a registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Target survived with the given health
    Absorbed { health: i32 },
    /// This hit brought the target to exactly 0
    Lethal,
    /// Target was already at 0; death fires once per life, so nothing happens
    AlreadyDead,
    /// Target is not in the registry
    Unknown,
}

/// Outcome of a shoot event as seen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Non-lethal hit, target now at `health`
    Hit { health: i32 },
    /// Lethal hit
    Killed,
    /// Shooter or target unknown, or target already dead
    Ignored,
}
