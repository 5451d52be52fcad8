use thiserror::Error;

use crate::world::{Direction, RoomId, ZoneId};

/// Convenient result alias for the waymarch library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error.
///
/// Routing failure is not an error: the routers answer with [`NextStep`]
/// sentinels so callers can degrade. This type covers the seams where a host
/// can actually wire things up wrong, namely world assembly, service
/// construction and the player commands.
///
/// [`NextStep`]: crate::route::NextStep
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a configuration value fails validation at service
    /// construction time.
    #[error("configuration rejected: {reason}")]
    InvalidConfig { reason: String },

    /// Raised when a command names a room that is not part of the world.
    #[error("unknown room {room}")]
    UnknownRoom { room: RoomId },

    /// Raised when a room is registered under a zone the world has never seen.
    #[error("unknown zone {zone}")]
    UnknownZone { zone: ZoneId },

    /// Raised when two rooms are registered under the same identifier.
    #[error("duplicate room {room}")]
    DuplicateRoom { room: RoomId },

    /// Raised when a door operation targets an exit that has no door.
    #[error("no door on the {dir} exit of room {room}")]
    NoDoor { room: RoomId, dir: Direction },
}
