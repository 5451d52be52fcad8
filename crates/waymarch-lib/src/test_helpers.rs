// Test-only helpers for `waymarch-lib` tests
#![allow(dead_code)]

use crate::agent::{Agent, AgentKind};
use crate::world::{
    Direction, Door, DoorState, Exit, KeyId, Room, RoomId, Sector, World, Zone, ZoneId,
};

/// Builder to assemble small test worlds without repeating wiring.
///
/// Zone 0 always exists and rooms default into it. Wiring mistakes panic in
/// the test that made them.
pub struct WorldBuilder {
    world: World,
}

impl WorldBuilder {
    #[must_use]
    pub fn new() -> Self {
        let mut world = World::new();
        world.add_zone(Zone::new(0, "Zone 0"));
        Self { world }
    }

    pub fn zone(mut self, id: ZoneId, name: &str) -> Self {
        self.world.add_zone(Zone::new(id, name));
        self
    }

    pub fn closed_zone(mut self, id: ZoneId, name: &str) -> Self {
        let mut zone = Zone::new(id, name);
        zone.closed = true;
        self.world.add_zone(zone);
        self
    }

    /// Room in zone 0.
    pub fn room(self, id: RoomId, sector: Sector) -> Self {
        self.room_in(id, 0, sector)
    }

    pub fn room_in(mut self, id: RoomId, zone: ZoneId, sector: Sector) -> Self {
        self.world
            .add_room(Room::new(id, format!("room {id}"), sector, zone))
            .unwrap();
        self
    }

    /// Room in zone 0 that trails may never lead through.
    pub fn no_track_room(mut self, id: RoomId, sector: Sector) -> Self {
        let mut room = Room::new(id, format!("room {id}"), sector, 0);
        room.flags.no_track = true;
        self.world.add_room(room).unwrap();
        self
    }

    /// One-way open exit.
    pub fn link(mut self, from: RoomId, dir: Direction, to: RoomId) -> Self {
        self.world.link(from, dir, Exit::open(to)).unwrap();
        self
    }

    /// Mirrored open exits in `dir` and its opposite.
    pub fn link_both(mut self, a: RoomId, dir: Direction, b: RoomId) -> Self {
        self.world.link(a, dir, Exit::open(b)).unwrap();
        self.world.link(b, dir.opposite(), Exit::open(a)).unwrap();
        self
    }

    /// One-way exit with a door.
    pub fn door(mut self, from: RoomId, dir: Direction, to: RoomId, door: Door) -> Self {
        self.world.link(from, dir, Exit::with_door(to, door)).unwrap();
        self
    }

    /// One-way exit with a locked door wanting `key`.
    pub fn locked(self, from: RoomId, dir: Direction, to: RoomId, key: KeyId) -> Self {
        self.door(from, dir, to, Door::locked(key))
    }

    /// One-way exit with a closed but unlocked door.
    pub fn closed_door(self, from: RoomId, dir: Direction, to: RoomId) -> Self {
        self.door(from, dir, to, Door::plain(DoorState::Closed))
    }

    pub fn key(mut self, room: RoomId, key: KeyId) -> Self {
        self.world.place_key(room, key).unwrap();
        self
    }

    pub fn build(self) -> World {
        self.world
    }
}

impl Default for WorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain agent with field-level control over everything planning reads.
#[derive(Debug, Clone)]
pub struct TestAgent {
    pub kind: AgentKind,
    pub moves: i32,
    pub level: u32,
    pub keys: Vec<KeyId>,
    pub tracking: u32,
}

impl TestAgent {
    #[must_use]
    pub fn player() -> Self {
        Self {
            kind: AgentKind::Player,
            moves: 1_000,
            level: 30,
            keys: Vec::new(),
            tracking: 50,
        }
    }

    #[must_use]
    pub fn npc() -> Self {
        Self {
            kind: AgentKind::Autonomous,
            moves: 0,
            level: 30,
            keys: Vec::new(),
            tracking: 0,
        }
    }

    pub fn with_moves(mut self, moves: i32) -> Self {
        self.moves = moves;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_keys(mut self, keys: &[KeyId]) -> Self {
        self.keys = keys.to_vec();
        self
    }

    pub fn with_tracking(mut self, tracking: u32) -> Self {
        self.tracking = tracking;
        self
    }
}

impl Agent for TestAgent {
    fn kind(&self) -> AgentKind {
        self.kind
    }

    fn moves(&self) -> i32 {
        self.moves
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn has_key(&self, key: KeyId) -> bool {
        self.keys.contains(&key)
    }

    fn tracking(&self) -> u32 {
        self.tracking
    }
}
