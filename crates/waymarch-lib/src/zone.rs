//! Coarse zone-level routing and key-relevance scoping.
//!
//! Zones cluster rooms. Adjacency between zones is derived on the fly by
//! scanning exits that cross zone boundaries, never stored, so it can never
//! fall out of date with the room graph. The zone path feeds the deep
//! search twice over:
//!
//! - directly adjacent source and target zones short-circuit back to the
//!   cheap router
//! - the rooms along the zone corridor decide which keys are worth
//!   collecting at all

use std::collections::{HashMap, HashSet, VecDeque};

use crate::agent::Agent;
use crate::config::{NavConfig, KEY_RING_CAP, KEY_SCOPE_ROOM_CAP};
use crate::world::{Direction, KeyId, RoomId, World, ZoneId};

/// Ordered zone path from the source zone to the target zone, both
/// inclusive, or `None` when no path exists within the span ceiling.
///
/// Breadth-first over derived adjacency: zone A borders zone B when any
/// room of A has an exit landing in a room of B. Zones closed to traffic
/// neither start, finish nor relay a path. Door states are ignored at this
/// level; a corridor through a locked door is still a corridor.
pub fn zone_route(
    world: &World,
    config: &NavConfig,
    from: ZoneId,
    to: ZoneId,
) -> Option<Vec<ZoneId>> {
    if world.zone(from).is_none_or(|z| z.closed) || world.zone(to).is_none_or(|z| z.closed) {
        return None;
    }
    if from == to {
        return Some(vec![from]);
    }

    let ceiling = config.zone_ceiling(world) as usize;

    // The parents map doubles as the visited set.
    let mut parents: HashMap<ZoneId, ZoneId> = HashMap::new();
    let mut frontier: VecDeque<(ZoneId, usize)> = VecDeque::new();
    parents.insert(from, from);
    frontier.push_back((from, 1));

    while let Some((zone, depth)) = frontier.pop_front() {
        if depth >= ceiling {
            continue;
        }
        for next in zone_neighbors(world, zone) {
            if parents.contains_key(&next) {
                continue;
            }
            parents.insert(next, zone);
            if next == to {
                return Some(reconstruct_zone_path(&parents, from, to));
            }
            frontier.push_back((next, depth + 1));
        }
    }

    None
}

/// Zones reachable from `zone` through a single boundary-crossing exit,
/// closed zones excluded.
fn zone_neighbors(world: &World, zone: ZoneId) -> Vec<ZoneId> {
    let mut seen: HashSet<ZoneId> = HashSet::new();
    let mut neighbors = Vec::new();
    for room in world.rooms_in_zone(zone) {
        for dir in Direction::ALL {
            let Some(exit) = room.exit(dir) else { continue };
            let Some(next) = world.room(exit.to) else { continue };
            if next.zone == zone || !seen.insert(next.zone) {
                continue;
            }
            if world.zone(next.zone).is_none_or(|z| z.closed) {
                continue;
            }
            neighbors.push(next.zone);
        }
    }
    neighbors
}

fn reconstruct_zone_path(parents: &HashMap<ZoneId, ZoneId>, from: ZoneId, to: ZoneId) -> Vec<ZoneId> {
    let mut path = vec![to];
    let mut current = to;
    while current != from {
        match parents.get(&current) {
            Some(&parent) => {
                path.push(parent);
                current = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Keys the deep search may treat as collectible for one query, plus the
/// census of key items along the zone corridor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyScope {
    /// Keys of locked exits between source and target that the agent does
    /// not hold, capped at the ring capacity.
    pub required: Vec<KeyId>,
    /// Key items physically present in the corridor zones.
    pub census: usize,
}

impl KeyScope {
    /// Whether a key item found lying in a room may enter a search state.
    /// An empty corridor census means no pickup can possibly help.
    pub fn allows_pickup(&self, key: KeyId) -> bool {
        self.census > 0 && self.required.contains(&key)
    }
}

/// Zone-level reconnaissance for one query.
#[derive(Debug, Clone, Default)]
pub struct ZoneSurvey {
    /// Coarse path, when one exists within the span ceiling.
    pub zone_path: Option<Vec<ZoneId>>,
    /// Key scope bounded by the corridor. `None` when no zone path exists
    /// to bound it, in which case every key stays fair game.
    pub scope: Option<KeyScope>,
}

impl ZoneSurvey {
    /// Source and target zones are distinct and border each other, so the
    /// cheap router will do.
    pub fn direct_shortcut(&self) -> bool {
        matches!(&self.zone_path, Some(path) if path.len() == 2)
    }
}

/// Build the reconnaissance used by the deep search and the survey command.
pub fn survey(
    world: &World,
    config: &NavConfig,
    agent: &dyn Agent,
    src: RoomId,
    dst: RoomId,
) -> ZoneSurvey {
    let (Some(src_zone), Some(dst_zone)) = (world.zone_of(src), world.zone_of(dst)) else {
        return ZoneSurvey::default();
    };
    let zone_path = zone_route(world, config, src_zone, dst_zone);
    let scope = zone_path.as_ref().map(|path| KeyScope {
        required: missing_keys(world, agent, src, dst),
        census: key_census(world, path),
    });
    ZoneSurvey { zone_path, scope }
}

/// Count key items lying in the rooms of the given zones.
fn key_census(world: &World, zones: &[ZoneId]) -> usize {
    zones
        .iter()
        .map(|&zone| {
            world
                .rooms_in_zone(zone)
                .map(|room| room.keys_present.len())
                .sum::<usize>()
        })
        .sum()
}

/// Sweep outward from `src` recording the keys of locked exits the agent
/// cannot open. Door states are otherwise ignored so the sweep sees locks
/// behind other locks. Stops at the ring capacity worth of keys, at the
/// room cap, or on reaching `dst`.
fn missing_keys(world: &World, agent: &dyn Agent, src: RoomId, dst: RoomId) -> Vec<KeyId> {
    let mut required: Vec<KeyId> = Vec::new();
    let mut visited: HashSet<RoomId> = HashSet::with_capacity(128);
    let mut frontier: VecDeque<RoomId> = VecDeque::with_capacity(128);
    visited.insert(src);
    frontier.push_back(src);

    while let Some(here) = frontier.pop_front() {
        if here == dst {
            break;
        }
        let Some(room) = world.room(here) else { continue };
        for dir in Direction::ALL {
            let Some(exit) = room.exit(dir) else { continue };
            if let Some(key) = exit.lock_key() {
                if !agent.has_key(key) && !required.contains(&key) && required.len() < KEY_RING_CAP
                {
                    required.push(key);
                }
            }
            let Some(next) = world.room(exit.to) else { continue };
            if next.flags.no_track || visited.contains(&next.id) {
                continue;
            }
            if visited.len() >= KEY_SCOPE_ROOM_CAP {
                return required;
            }
            visited.insert(next.id);
            frontier.push_back(next.id);
        }
    }

    required
}
