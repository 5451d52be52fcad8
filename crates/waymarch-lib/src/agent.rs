//! Collaborator contracts: the agent being guided and the environment it
//! moves through.
//!
//! The engine reads agents and environments through traits so a host can
//! plug in its own character and weather systems without copying state into
//! the router. Both traits are consulted synchronously during planning and
//! must be cheap.

use crate::world::{KeyId, Room};

/// Broad scheduling class of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    /// Player-directed. Spends real movement points, so planning refuses
    /// steps the agent could not afford to walk.
    Player,
    /// AI-driven. Exempt from movement-budget checks during planning.
    Autonomous,
}

/// Read-only view of an agent consulted during planning.
///
/// Key possession is a live predicate into the host's inventory: the routers
/// never copy or mutate an inventory. A pickup planned by the deep search is
/// hypothetical, and the key may be gone by the time the agent actually
/// walks; hosts re-plan every tick rather than trusting a stale plan.
pub trait Agent {
    fn kind(&self) -> AgentKind;

    /// Movement points currently available. May be negative for exhausted
    /// agents; only [`AgentKind::Player`] planning looks at it.
    fn moves(&self) -> i32;

    /// Experience level. Scales the detour-cost ceiling of the deep search.
    fn level(&self) -> u32;

    /// Whether the agent carries or wears the given key.
    fn has_key(&self, key: KeyId) -> bool;

    /// Tracking proficiency on a 0 to 100 scale. Gates the player commands.
    fn tracking(&self) -> u32 {
        0
    }

    /// Stamina attribute. Read by host environment models, not by the core.
    fn vigor(&self) -> u32 {
        0
    }
}

/// Environmental cost shaping, e.g. weather over outdoor rooms.
pub trait Environment {
    /// Multiplicative factor applied to the terrain base cost of `room` for
    /// this agent. `1.0` leaves the terrain cost untouched; the final cost
    /// is floored at 1 no matter how small the factor.
    fn modifier(&self, agent: &dyn Agent, room: &Room) -> f32;
}

/// Neutral conditions: every room costs exactly its terrain base.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearSkies;

impl Environment for ClearSkies {
    fn modifier(&self, _agent: &dyn Agent, _room: &Room) -> f32 {
        1.0
    }
}
