//! World model the routers read.
//!
//! The engine never owns the world. Rooms, exits, zones and the key items
//! lying around in them belong to the host simulation; [`World`] is the
//! in-memory view the host keeps current and the routers consult. Everything
//! here is identifier-keyed:
//!
//! - [`RoomId`] / [`ZoneId`] / [`KeyId`] are plain numeric aliases
//! - a room carries one exit slot per [`Direction`]
//! - an exit optionally carries a [`Door`], and a locked door optionally
//!   names the [`KeyId`] that operates it
//!
//! Assembly helpers return [`Error`] values for wiring mistakes instead of
//! panicking, so a host can load worlds defensively.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// Numeric identifier of a room.
pub type RoomId = u32;

/// Numeric identifier of a zone.
pub type ZoneId = u16;

/// Opaque identifier of a key item that operates a lock.
pub type KeyId = u32;

/// Compass of traversal directions, one exit slot per room and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl Direction {
    /// Every direction, in exit-slot order.
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    /// Exit-slot index of this direction.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The direction an agent arrives from after walking this one.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Lowercase name used in narrative output.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terrain class of a room, fixing its base traversal cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sector {
    Inside,
    City,
    Field,
    Forest,
    Hills,
    Desert,
    Swamp,
    Mountains,
}

impl Sector {
    /// Base movement cost of stepping into a room of this terrain, before
    /// environmental modifiers.
    pub fn base_cost(self) -> u32 {
        match self {
            Sector::Inside | Sector::City => 1,
            Sector::Field => 2,
            Sector::Forest => 3,
            Sector::Hills | Sector::Desert => 4,
            Sector::Swamp => 5,
            Sector::Mountains => 6,
        }
    }
}

/// Open/closed/locked state of a door. `Locked` implies closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Open,
    Closed,
    Locked,
}

/// Door attached to an exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Door {
    pub state: DoorState,
    /// Key that operates the lock, when one exists at all.
    pub key: Option<KeyId>,
    /// The lock cannot be forced or picked. Advisory for hosts; planning
    /// always demands the key for a locked door regardless.
    pub pickproof: bool,
}

impl Door {
    /// Door in the given state with no lock.
    pub fn plain(state: DoorState) -> Self {
        Self {
            state,
            key: None,
            pickproof: false,
        }
    }

    /// Locked door operated by `key`.
    pub fn locked(key: KeyId) -> Self {
        Self {
            state: DoorState::Locked,
            key: Some(key),
            pickproof: false,
        }
    }

    /// Anything other than `Open` blocks passage until opened.
    pub fn is_closed(self) -> bool {
        !matches!(self.state, DoorState::Open)
    }

    pub fn is_locked(self) -> bool {
        matches!(self.state, DoorState::Locked)
    }
}

/// Directed connection from one room to another.
///
/// Exits are one-way at this level; a two-way passage is two exits that
/// happen to mirror each other, and their doors may disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    pub to: RoomId,
    pub door: Option<Door>,
}

impl Exit {
    /// Plain doorless passage.
    pub fn open(to: RoomId) -> Self {
        Self { to, door: None }
    }

    /// Passage with a door.
    pub fn with_door(to: RoomId, door: Door) -> Self {
        Self {
            to,
            door: Some(door),
        }
    }

    /// Whether a door currently blocks this exit.
    pub fn is_closed(&self) -> bool {
        self.door.is_some_and(Door::is_closed)
    }

    /// Key demanded to pass while the door stays locked, if any.
    pub fn lock_key(&self) -> Option<KeyId> {
        match self.door {
            Some(door) if door.is_locked() => door.key,
            _ => None,
        }
    }
}

/// Per-room behavior flags read by the routers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoomFlags {
    /// Trails never lead through this room.
    pub no_track: bool,
    /// Environmentally dangerous. Advisory input for host cost modifiers;
    /// the routers themselves ignore it.
    pub hazardous: bool,
}

/// An atomic place in the navigable graph.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub sector: Sector,
    pub zone: ZoneId,
    pub flags: RoomFlags,
    /// One slot per compass direction, [`Direction::index`]-ordered.
    pub exits: [Option<Exit>; 6],
    /// Key items observable in the room, on the ground or carried by its
    /// resident occupants. Maintained by the host, read during planning.
    pub keys_present: Vec<KeyId>,
}

impl Room {
    pub fn new(id: RoomId, name: impl Into<String>, sector: Sector, zone: ZoneId) -> Self {
        Self {
            id,
            name: name.into(),
            sector,
            zone,
            flags: RoomFlags::default(),
            exits: [None; 6],
            keys_present: Vec::new(),
        }
    }

    /// The exit leaving this room in `dir`, when one exists.
    pub fn exit(&self, dir: Direction) -> Option<&Exit> {
        self.exits[dir.index()].as_ref()
    }
}

/// A contiguous cluster of rooms used for coarse route estimation.
#[derive(Debug, Clone)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    /// Closed to traffic: the zone router refuses to route into or out of it.
    pub closed: bool,
}

impl Zone {
    pub fn new(id: ZoneId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            closed: false,
        }
    }
}

/// In-memory world graph: rooms and zones keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct World {
    rooms: HashMap<RoomId, Room>,
    zones: HashMap<ZoneId, Zone>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone, replacing any previous definition with the same id.
    pub fn add_zone(&mut self, zone: Zone) {
        self.zones.insert(zone.id, zone);
    }

    /// Register a room. The owning zone must already exist and the id must
    /// be unused.
    pub fn add_room(&mut self, room: Room) -> Result<()> {
        if !self.zones.contains_key(&room.zone) {
            return Err(Error::UnknownZone { zone: room.zone });
        }
        if self.rooms.contains_key(&room.id) {
            return Err(Error::DuplicateRoom { room: room.id });
        }
        self.rooms.insert(room.id, room);
        Ok(())
    }

    /// Record a key item lying in a room.
    pub fn place_key(&mut self, room: RoomId, key: KeyId) -> Result<()> {
        let target = self.rooms.get_mut(&room).ok_or(Error::UnknownRoom { room })?;
        target.keys_present.push(key);
        Ok(())
    }

    /// Remove one instance of a key item from a room, e.g. after a pickup.
    pub fn remove_key(&mut self, room: RoomId, key: KeyId) -> Result<()> {
        let target = self.rooms.get_mut(&room).ok_or(Error::UnknownRoom { room })?;
        if let Some(at) = target.keys_present.iter().position(|&k| k == key) {
            target.keys_present.swap_remove(at);
        }
        Ok(())
    }

    /// Flip the door state on an exit, e.g. after an agent opens or locks it.
    /// Only this side of the passage changes; a mirrored exit has its own door.
    pub fn set_door_state(&mut self, room: RoomId, dir: Direction, state: DoorState) -> Result<()> {
        let target = self.rooms.get_mut(&room).ok_or(Error::UnknownRoom { room })?;
        match target.exits[dir.index()].as_mut().and_then(|e| e.door.as_mut()) {
            Some(door) => {
                door.state = state;
                Ok(())
            }
            None => Err(Error::NoDoor { room, dir }),
        }
    }

    /// Wire a one-way exit between two existing rooms.
    pub fn link(&mut self, from: RoomId, dir: Direction, exit: Exit) -> Result<()> {
        if !self.rooms.contains_key(&exit.to) {
            return Err(Error::UnknownRoom { room: exit.to });
        }
        let origin = self
            .rooms
            .get_mut(&from)
            .ok_or(Error::UnknownRoom { room: from })?;
        origin.exits[dir.index()] = Some(exit);
        Ok(())
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    /// Zone owning a room, when the room exists.
    pub fn zone_of(&self, room: RoomId) -> Option<ZoneId> {
        self.rooms.get(&room).map(|r| r.zone)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Iterate the rooms belonging to a zone.
    pub fn rooms_in_zone(&self, zone: ZoneId) -> impl Iterator<Item = &Room> {
        self.rooms.values().filter(move |r| r.zone == zone)
    }

    /// Iterate every room, in no particular order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }
}
