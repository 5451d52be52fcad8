//! Engine configuration and the hard bounds that protect tick latency.
//!
//! Every search the engine runs is bounded, and the bounds come from here.
//! Hosts may fix a ceiling outright or leave it on [`Limit::Auto`] to have
//! it derived from world size, clamped between compile-time floors and
//! hard caps that no configuration can exceed.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::world::World;

/// Distinct keys a single search state may accumulate.
pub const KEY_RING_CAP: usize = 5;

/// Floor and hard cap for the deep-search iteration ceiling.
pub const SEARCH_CAP_FLOOR: u32 = 1_000;
pub const SEARCH_CAP_HARD: u32 = 50_000;

/// Floor and hard cap for the zone-path length ceiling, counted in zones
/// with source and target included.
pub const ZONE_SPAN_FLOOR: u32 = 4;
pub const ZONE_SPAN_HARD: u32 = 100;

/// Rooms the key-relevance walk may visit before giving up.
pub const KEY_SCOPE_ROOM_CAP: usize = 1_000;

/// A ceiling that is either fixed by the host or derived from world size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limit {
    /// Derive from the current world size at query time.
    Auto,
    /// Use this value, clamped to the hard cap.
    Fixed(u32),
}

/// Tunable knobs for the pathfinding service.
///
/// `Default` matches production; tests shrink the tables to force the
/// bounded-growth paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Let the cheap routers plan through closed and locked doors, for hosts
    /// whose agents open doors as they walk.
    pub track_through_doors: bool,
    /// Deep-search iteration ceiling.
    pub search_cap: Limit,
    /// Zone-path length ceiling.
    pub zone_span: Limit,
    /// Visited-state table capacity for one deep search.
    pub visited_cap: usize,
    /// Answer-cache slot count. The table never grows past this.
    pub cache_slots: usize,
    /// Answer-cache entry lifetime, in scheduling ticks.
    pub cache_ttl: u64,
    /// Autonomous escalation runs on one throttled call in this many.
    pub escalation_period: u32,
    /// Tracking proficiency below which the command fumbles.
    pub novice_skill: u32,
    /// Tracking proficiency from which advanced tracking and surveying
    /// unlock.
    pub expert_skill: u32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            track_through_doors: false,
            search_cap: Limit::Auto,
            zone_span: Limit::Auto,
            visited_cap: 1_000,
            cache_slots: 64,
            cache_ttl: 30,
            escalation_period: 20,
            novice_skill: 15,
            expert_skill: 70,
        }
    }
}

impl NavConfig {
    /// Validate host-supplied values. Zero-sized tables and periods make
    /// the policies meaningless, so they are rejected outright instead of
    /// silently patched.
    pub fn validate(&self) -> Result<()> {
        if self.cache_slots == 0 {
            return Err(Error::InvalidConfig {
                reason: "cache_slots must be at least 1".into(),
            });
        }
        if self.cache_ttl == 0 {
            return Err(Error::InvalidConfig {
                reason: "cache_ttl must be at least 1 tick".into(),
            });
        }
        if self.visited_cap == 0 {
            return Err(Error::InvalidConfig {
                reason: "visited_cap must be at least 1".into(),
            });
        }
        if self.escalation_period == 0 {
            return Err(Error::InvalidConfig {
                reason: "escalation_period must be at least 1".into(),
            });
        }
        if self.novice_skill > self.expert_skill {
            return Err(Error::InvalidConfig {
                reason: "novice_skill cannot exceed expert_skill".into(),
            });
        }
        Ok(())
    }

    /// Iteration ceiling for one deep search. Computed once per query so a
    /// world growing mid-search cannot move the goalposts.
    pub fn search_ceiling(&self, world: &World) -> u32 {
        match self.search_cap {
            Limit::Fixed(n) => n.max(1).min(SEARCH_CAP_HARD),
            Limit::Auto => {
                let derived = (world.room_count() as u32).saturating_mul(4);
                derived.clamp(SEARCH_CAP_FLOOR, SEARCH_CAP_HARD)
            }
        }
    }

    /// Zone-path length ceiling. A path of two means directly adjacent
    /// zones, so fixed values below that are meaningless and get raised.
    pub fn zone_ceiling(&self, world: &World) -> u32 {
        match self.zone_span {
            Limit::Fixed(n) => n.clamp(2, ZONE_SPAN_HARD),
            Limit::Auto => (world.zone_count() as u32).clamp(ZONE_SPAN_FLOOR, ZONE_SPAN_HARD),
        }
    }
}
