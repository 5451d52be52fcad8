//! Movement cost: terrain base shaped by the environment.

use crate::agent::{Agent, Environment};
use crate::world::{RoomId, World};

/// Movement cost of `agent` stepping into `room`.
///
/// The terrain base cost is scaled by the environment modifier, rounded to
/// the nearest point and floored at 1 so every step costs something. Rooms
/// outside the world cost the floor; the routers reject dangling exits
/// before cost ever matters.
pub fn move_cost(world: &World, env: &dyn Environment, agent: &dyn Agent, room: RoomId) -> u32 {
    let Some(room) = world.room(room) else {
        return 1;
    };
    let scaled = room.sector.base_cost() as f32 * env.modifier(agent, room);
    scaled.round().max(1.0) as u32
}
