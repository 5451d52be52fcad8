//! Waymarch library entry points.
//!
//! This crate answers one question for game hosts: which exit should an
//! agent take right now to get from one room to another. It holds the world
//! model, the first-step routers, the key-aware deep search, zone-level
//! reconnaissance, the bounded answer cache, and the [`Pathfinder`] service
//! that dispatches between them. Hosts should only depend on the types
//! exported here instead of reimplementing behavior.

#![deny(warnings)]

pub mod agent;
pub mod cache;
pub mod config;
pub mod cost;
pub mod dispatch;
pub mod error;
pub mod output;
pub mod route;
pub mod search;
pub mod world;
pub mod zone;

#[cfg(test)]
mod test_helpers;

pub use agent::{Agent, AgentKind, ClearSkies, Environment};
pub use cache::{PathCache, Priority};
pub use config::{Limit, NavConfig, KEY_RING_CAP};
pub use cost::move_cost;
pub use dispatch::{GuidedStep, Pathfinder, Telemetry};
pub use error::{Error, Result};
pub use output::{SurveyMode, SurveyReport, TrackReport};
pub use route::{find_blocking_key, first_step, first_step_with_cost, NextStep};
pub use search::{plan_track, KeyRing, TrackPlan};
pub use world::{
    Direction, Door, DoorState, Exit, KeyId, Room, RoomFlags, RoomId, Sector, World, Zone, ZoneId,
};
pub use zone::{zone_route, KeyScope, ZoneSurvey};
