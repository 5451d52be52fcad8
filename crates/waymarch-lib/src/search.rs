//! Key-aware state-space router.
//!
//! States pair a room with the set of keys hypothetically collected on the
//! way there, so a locked door can justify a detour to fetch its key first.
//! Expansion is breadth-first over states: the first state to reach the
//! target has the minimum room count among those explored. Cost prunes, it
//! does not rank. Three ceilings cut the search off before it can eat a
//! scheduling tick: the iteration ceiling, the visited-table capacity and a
//! level-scaled cost ceiling.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};

use crate::agent::{Agent, AgentKind, Environment};
use crate::config::{NavConfig, KEY_RING_CAP};
use crate::cost::move_cost;
use crate::route::{first_step_with_cost, NextStep};
use crate::world::{Direction, Exit, KeyId, RoomId, World};
use crate::zone::{self, KeyScope};

/// Detour cost budget granted per agent level to one deep search.
pub const COST_CEILING_PER_LEVEL: u32 = 10;

/// Bounded, order-insensitive set of keys a search state has picked up.
///
/// The slots stay sorted with zero padding past `len`, so the derived
/// equality and hash treat `{a, b}` and `{b, a}` as the same ring and the
/// visited table deduplicates detour orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyRing {
    slots: [KeyId; KEY_RING_CAP],
    len: u8,
}

impl KeyRing {
    pub fn contains(&self, key: KeyId) -> bool {
        self.slots[..self.len as usize].contains(&key)
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert preserving sorted order. Returns false when the ring is full
    /// or already holds the key.
    pub fn insert(&mut self, key: KeyId) -> bool {
        if self.contains(key) || self.len as usize == KEY_RING_CAP {
            return false;
        }
        let mut at = self.len as usize;
        self.slots[at] = key;
        while at > 0 && self.slots[at - 1] > self.slots[at] {
            self.slots.swap(at - 1, at);
            at -= 1;
        }
        self.len += 1;
        true
    }
}

/// One expansion state. Ephemeral; no state outlives its query.
#[derive(Debug, Clone, Copy)]
struct PathState {
    room: RoomId,
    moves_left: i32,
    ring: KeyRing,
    cost: u32,
    first: Option<Direction>,
}

/// Answer of one deep-search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackPlan {
    pub step: NextStep,
    /// Accumulated movement cost along the found route.
    pub cost: u32,
    /// Movement points needed to walk the route. Mirrors `cost`.
    pub moves_needed: u32,
    /// Advisory diagnostics for narrative output. A failed search explains
    /// here whether the ground was exhausted or a ceiling cut it short;
    /// functional callers must branch on `step` alone.
    pub notes: String,
}

impl TrackPlan {
    fn reached(first: Direction, cost: u32) -> Self {
        Self {
            step: NextStep::Toward(first),
            cost,
            moves_needed: cost,
            notes: String::new(),
        }
    }

    fn failed(step: NextStep, notes: impl Into<String>) -> Self {
        Self {
            step,
            cost: 0,
            moves_needed: 0,
            notes: notes.into(),
        }
    }
}

/// Plan the next step from `src` toward `dst`, allowing for keys that could
/// be collected along the way.
///
/// Consults the zone survey first: bordering zones fall back to the cheap
/// router, and an existing zone corridor scopes which keys are worth
/// picking up. Player agents never expand a step they could not afford with
/// their current movement points; autonomous agents are exempt. Pickups are
/// hypothetical throughout, see [`Agent`] on staleness.
pub fn plan_track(
    world: &World,
    config: &NavConfig,
    env: &dyn Environment,
    agent: &dyn Agent,
    src: RoomId,
    dst: RoomId,
) -> TrackPlan {
    if world.room(src).is_none() || world.room(dst).is_none() {
        warn!("deep search between unknown rooms {} and {}", src, dst);
        return TrackPlan::failed(NextStep::InvalidQuery, "");
    }
    if src == dst {
        return TrackPlan::failed(NextStep::AlreadyThere, "");
    }

    let recon = zone::survey(world, config, agent, src, dst);
    if recon.direct_shortcut() {
        let (step, cost) = first_step_with_cost(world, config, env, agent, src, dst);
        return TrackPlan {
            step,
            cost,
            moves_needed: cost,
            notes: "the zones border each other; took the direct line".into(),
        };
    }
    let scope = recon.scope.as_ref();

    let ceiling = config.search_ceiling(world);
    let cost_ceiling = agent.level().max(1).saturating_mul(COST_CEILING_PER_LEVEL);
    debug!(
        "deep search {} -> {}: ceiling {}, visited cap {}, cost ceiling {}",
        src, dst, ceiling, config.visited_cap, cost_ceiling
    );

    let mut visited: HashSet<(RoomId, KeyRing)> = HashSet::with_capacity(config.visited_cap.min(1_024));
    let mut frontier: VecDeque<PathState> = VecDeque::with_capacity(64);

    let mut start = PathState {
        room: src,
        moves_left: agent.moves(),
        ring: KeyRing::default(),
        cost: 0,
        first: None,
    };
    // A key lying at the feet of the agent counts as collectible too.
    collect_keys(world, agent, scope, src, &mut start.ring);
    frontier.push_back(start);

    let mut iterations: u32 = 0;
    while let Some(state) = frontier.pop_front() {
        iterations += 1;
        if iterations > ceiling {
            debug!("deep search {} -> {} gave up at the iteration ceiling", src, dst);
            return TrackPlan::failed(
                NextStep::NoPath,
                format!("the trail ran too long to follow; gave up after {ceiling} strides"),
            );
        }

        if state.room == dst {
            let first = state
                .first
                .expect("a target state past the triviality check has a first hop");
            return TrackPlan::reached(first, state.cost);
        }

        if visited.contains(&(state.room, state.ring)) {
            continue;
        }
        if visited.len() >= config.visited_cap {
            debug!("deep search {} -> {} overflowed the visited table", src, dst);
            return TrackPlan::failed(
                NextStep::NoPath,
                "the ground is too trampled to read; gave up before exhausting it",
            );
        }
        visited.insert((state.room, state.ring));

        let Some(room) = world.room(state.room) else {
            continue;
        };
        for dir in Direction::ALL {
            let Some(exit) = room.exit(dir) else { continue };
            let Some(next) = world.room(exit.to) else { continue };
            if next.flags.no_track {
                continue;
            }
            if !door_passable(exit, agent, &state.ring) {
                continue;
            }

            let step_cost = move_cost(world, env, agent, next.id);
            if agent.kind() == AgentKind::Player && (state.moves_left as i64) < i64::from(step_cost)
            {
                continue;
            }
            let total = state.cost.saturating_add(step_cost);
            if total > cost_ceiling {
                continue;
            }

            let mut successor = PathState {
                room: next.id,
                moves_left: state.moves_left.saturating_sub_unsigned(step_cost),
                ring: state.ring,
                cost: total,
                first: state.first.or(Some(dir)),
            };
            collect_keys(world, agent, scope, next.id, &mut successor.ring);
            frontier.push_back(successor);
        }
    }

    TrackPlan::failed(NextStep::NoPath, "no trail reaches the target")
}

/// Door rule for the deep search: open or merely closed passes, locked
/// demands the key either in hand or already collected by this state. A
/// locked door with no key item in existence never passes.
fn door_passable(exit: &Exit, agent: &dyn Agent, ring: &KeyRing) -> bool {
    match &exit.door {
        Some(door) if door.is_locked() => match door.key {
            Some(key) => agent.has_key(key) || ring.contains(key),
            None => false,
        },
        _ => true,
    }
}

/// Hypothetically pick up the relevant keys lying in `room`, ring capacity
/// willing. Never mutates the world; a planned pickup is not an executed
/// one.
fn collect_keys(
    world: &World,
    agent: &dyn Agent,
    scope: Option<&KeyScope>,
    room: RoomId,
    ring: &mut KeyRing,
) {
    let Some(room) = world.room(room) else { return };
    for &key in &room.keys_present {
        if agent.has_key(key) || ring.contains(key) {
            continue;
        }
        if scope.is_none_or(|s| s.allows_pickup(key)) {
            ring.insert(key);
        }
    }
}
