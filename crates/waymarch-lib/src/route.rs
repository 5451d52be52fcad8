//! First-step routers over the room graph.
//!
//! Both routers answer "which way from here" rather than returning a whole
//! path: callers re-query every tick, so only the first hop matters. The
//! breadth-first frontier carries that first hop forward on every entry
//! instead of keeping parent records and walking them back afterwards.

use std::collections::{HashSet, VecDeque};

use tracing::warn;

use crate::agent::{Agent, Environment};
use crate::config::NavConfig;
use crate::cost::move_cost;
use crate::world::{Direction, Exit, KeyId, Room, RoomId, World};

/// Routing verdict handed to every caller.
///
/// Failure is a value, not an error, so callers can branch and degrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Take this exit first.
    Toward(Direction),
    /// Source and target are the same room.
    AlreadyThere,
    /// No viable route under the current constraints.
    NoPath,
    /// Source or target is not part of the world, which is a caller bug.
    InvalidQuery,
}

impl NextStep {
    /// Direction payload of `Toward`, if that is what this is.
    pub fn direction(self) -> Option<Direction> {
        match self {
            NextStep::Toward(dir) => Some(dir),
            _ => None,
        }
    }
}

/// Room behind `exit` when the cheap routers may walk it.
///
/// Dangling exits never pass. Rooms flagged no-track swallow trails. A
/// closed door blocks, locked or not, unless the config lets planning assume
/// agents open doors as they walk.
pub(crate) fn viable_exit<'w>(world: &'w World, config: &NavConfig, exit: &Exit) -> Option<&'w Room> {
    let room = world.room(exit.to)?;
    if room.flags.no_track {
        return None;
    }
    if exit.is_closed() && !config.track_through_doors {
        return None;
    }
    Some(room)
}

/// Unweighted breadth-first router: the first step from `src` toward `dst`.
///
/// Among viable routes the answer lies on one with the fewest rooms; edge
/// ties resolve in [`Direction::ALL`] order. The search runs on internal
/// state alone, so concurrent queries never see each other's marks.
pub fn first_step(world: &World, config: &NavConfig, src: RoomId, dst: RoomId) -> NextStep {
    let Some(origin) = world.room(src) else {
        warn!("routing query from unknown room {} toward {}", src, dst);
        return NextStep::InvalidQuery;
    };
    if world.room(dst).is_none() {
        warn!("routing query from {} toward unknown room {}", src, dst);
        return NextStep::InvalidQuery;
    }
    if src == dst {
        return NextStep::AlreadyThere;
    }

    let mut visited: HashSet<RoomId> = HashSet::with_capacity(64);
    let mut frontier: VecDeque<(RoomId, Direction)> = VecDeque::with_capacity(64);
    visited.insert(src);

    for dir in Direction::ALL {
        let Some(exit) = origin.exit(dir) else { continue };
        let Some(room) = viable_exit(world, config, exit) else {
            continue;
        };
        if !visited.insert(room.id) {
            continue;
        }
        if room.id == dst {
            return NextStep::Toward(dir);
        }
        frontier.push_back((room.id, dir));
    }

    while let Some((here, first)) = frontier.pop_front() {
        let Some(room) = world.room(here) else { continue };
        for dir in Direction::ALL {
            let Some(exit) = room.exit(dir) else { continue };
            let Some(next) = viable_exit(world, config, exit) else {
                continue;
            };
            if !visited.insert(next.id) {
                continue;
            }
            if next.id == dst {
                return NextStep::Toward(first);
            }
            frontier.push_back((next.id, first));
        }
    }

    NextStep::NoPath
}

/// Cost-reporting variant of [`first_step`].
///
/// The route is still chosen by room count; the reported cost is the
/// movement cost of entering the target room only, not a sum along the
/// route. Downstream movement-point warnings are tuned against exactly that
/// number, so the simplification is part of the contract.
pub fn first_step_with_cost(
    world: &World,
    config: &NavConfig,
    env: &dyn Environment,
    agent: &dyn Agent,
    src: RoomId,
    dst: RoomId,
) -> (NextStep, u32) {
    let step = first_step(world, config, src, dst);
    let cost = match step {
        NextStep::Toward(_) => move_cost(world, env, agent, dst),
        _ => 0,
    };
    (step, cost)
}

/// Key of the nearest lock standing between `src` and `dst` that `agent`
/// cannot open, or `None` when no such lock is in the way.
///
/// Immediate exits of `src` are checked first regardless of bearing; an
/// agent stuck at a locked door wants that key named even when the door is
/// off the straight line. The sweep that follows walks the [`first_step`]
/// viability rules, except that meeting a locked exit without its key
/// answers the question instead of skipping the edge.
pub fn find_blocking_key(
    world: &World,
    config: &NavConfig,
    agent: &dyn Agent,
    src: RoomId,
    dst: RoomId,
) -> Option<KeyId> {
    let origin = world.room(src)?;
    for dir in Direction::ALL {
        let Some(exit) = origin.exit(dir) else { continue };
        if let Some(key) = exit.lock_key() {
            if !agent.has_key(key) {
                return Some(key);
            }
        }
    }
    if src == dst {
        return None;
    }

    let mut visited: HashSet<RoomId> = HashSet::with_capacity(64);
    let mut frontier: VecDeque<RoomId> = VecDeque::with_capacity(64);
    visited.insert(src);
    frontier.push_back(src);

    while let Some(here) = frontier.pop_front() {
        if here == dst {
            return None;
        }
        let Some(room) = world.room(here) else { continue };
        for dir in Direction::ALL {
            let Some(exit) = room.exit(dir) else { continue };
            if let Some(key) = exit.lock_key() {
                if !agent.has_key(key) {
                    return Some(key);
                }
            }
            let Some(next) = viable_exit(world, config, exit) else {
                continue;
            };
            if visited.insert(next.id) {
                frontier.push_back(next.id);
            }
        }
    }

    None
}
