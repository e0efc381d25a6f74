#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Islander engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Compass directions available to the player and to world-graph edges.
///
/// The coordinate convention follows the simulation's map orientation: the y
/// axis grows toward the north and the x axis grows toward the east.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing y.
    North,
    /// Movement toward decreasing y.
    South,
    /// Movement toward increasing x.
    East,
    /// Movement toward decreasing x.
    West,
    /// Diagonal movement toward increasing x and y.
    Northeast,
    /// Diagonal movement toward decreasing x and increasing y.
    Northwest,
    /// Diagonal movement toward increasing x and decreasing y.
    Southeast,
    /// Diagonal movement toward decreasing x and y.
    Southwest,
}

impl Direction {
    /// Returns the direction pointing the opposite way.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
            Self::Northeast => Self::Southwest,
            Self::Northwest => Self::Southeast,
            Self::Southeast => Self::Northwest,
            Self::Southwest => Self::Northeast,
        }
    }
}

/// Location of a single grid cell expressed as non-negative x and y offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinates {
    x: u32,
    y: u32,
}

impl Coordinates {
    /// Creates a new coordinate pair.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Horizontal offset of the cell, growing eastward.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Vertical offset of the cell, growing northward.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: Coordinates) -> u64 {
        u64::from(self.x.abs_diff(other.x)) + u64::from(self.y.abs_diff(other.y))
    }

    /// Translates the coordinates one step in the provided direction.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant;
    /// negative coordinates are unrepresentable rather than validated.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Coordinates> {
        let Coordinates { x, y } = self;
        let moved = match direction {
            Direction::North => Coordinates::new(x, y.checked_add(1)?),
            Direction::South => Coordinates::new(x, y.checked_sub(1)?),
            Direction::East => Coordinates::new(x.checked_add(1)?, y),
            Direction::West => Coordinates::new(x.checked_sub(1)?, y),
            Direction::Northeast => Coordinates::new(x.checked_add(1)?, y.checked_add(1)?),
            Direction::Northwest => Coordinates::new(x.checked_sub(1)?, y.checked_add(1)?),
            Direction::Southeast => Coordinates::new(x.checked_add(1)?, y.checked_sub(1)?),
            Direction::Southwest => Coordinates::new(x.checked_sub(1)?, y.checked_sub(1)?),
        };
        Some(moved)
    }

    /// Returns the compass direction pointing from `self` toward `destination`.
    ///
    /// Returns `None` when the two coordinates are equal. Diagonal directions
    /// are preferred whenever both axes differ, matching the world graph's
    /// eight-way connectivity.
    #[must_use]
    pub fn direction_to(self, destination: Coordinates) -> Option<Direction> {
        let east = destination.x > self.x;
        let west = destination.x < self.x;
        let north = destination.y > self.y;
        let south = destination.y < self.y;

        match (east, west, north, south) {
            (true, _, true, _) => Some(Direction::Northeast),
            (true, _, _, true) => Some(Direction::Southeast),
            (true, _, _, _) => Some(Direction::East),
            (_, true, true, _) => Some(Direction::Northwest),
            (_, true, _, true) => Some(Direction::Southwest),
            (_, true, _, _) => Some(Direction::West),
            (_, _, true, _) => Some(Direction::North),
            (_, _, _, true) => Some(Direction::South),
            _ => None,
        }
    }
}

/// Extent of the world grid measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Creates a new dimensions descriptor.
    ///
    /// # Errors
    ///
    /// Fails when either extent is zero; an empty world is a construction
    /// error, not a runtime state.
    pub fn new(width: u32, height: u32) -> Result<Self, DimensionsError> {
        if width == 0 {
            return Err(DimensionsError::ZeroWidth);
        }
        if height == 0 {
            return Err(DimensionsError::ZeroHeight);
        }
        Ok(Self { width, height })
    }

    /// Number of cell columns spanned by the world.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cell rows spanned by the world.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the provided coordinates fall inside the grid.
    #[must_use]
    pub const fn contains(&self, coordinates: Coordinates) -> bool {
        coordinates.x() < self.width && coordinates.y() < self.height
    }

    /// Reports whether adopting these dimensions shrinks either axis
    /// relative to `previous`.
    #[must_use]
    pub const fn shrinks_from(&self, previous: Dimensions) -> bool {
        previous.width > self.width || previous.height > self.height
    }
}

/// Errors produced when constructing [`Dimensions`].
#[derive(Debug, PartialEq, Eq)]
pub enum DimensionsError {
    /// The requested width was zero.
    ZeroWidth,
    /// The requested height was zero.
    ZeroHeight,
}

impl fmt::Display for DimensionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroWidth => write!(f, "world width must be positive and non-zero"),
            Self::ZeroHeight => write!(f, "world height must be positive and non-zero"),
        }
    }
}

impl std::error::Error for DimensionsError {}

/// Items that can be placed into the world and carried by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Item {
    /// Mining tool the player must carry before raising or razing walls.
    Pickaxe,
}

/// Snapshot of the player's position and facing within the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    position: Coordinates,
    facing: Direction,
}

impl Player {
    /// Creates a new player snapshot.
    #[must_use]
    pub const fn new(position: Coordinates, facing: Direction) -> Self {
        Self { position, facing }
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub const fn position(&self) -> Coordinates {
        self.position
    }

    /// Direction the player is currently facing.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Cell the player is looking at, if one exists in that direction.
    #[must_use]
    pub fn looking_at(&self) -> Option<Coordinates> {
        self.position.step(self.facing)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Resizes the world grid to the provided dimensions.
    Resize {
        /// Extent the world should adopt.
        dimensions: Dimensions,
    },
    /// Places the player into the world for the first time.
    SpawnPlayer {
        /// Cell the player should initially occupy.
        location: Coordinates,
    },
    /// Requests that the player advance one step in the given direction.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Rotates the player in place without moving.
    TurnPlayer {
        /// Direction the player should face.
        direction: Direction,
    },
    /// Raises a wall at the provided location.
    BuildWall {
        /// Cell the wall should occupy.
        location: Coordinates,
    },
    /// Razes the wall at the provided location.
    DestroyWall {
        /// Cell currently occupied by the wall.
        location: Coordinates,
    },
    /// Spawns an item into the world at the provided location.
    PlaceItem {
        /// Item to place.
        item: Item,
        /// Cell the item should occupy.
        location: Coordinates,
    },
    /// Removes an item from the world at the provided location.
    RemoveItem {
        /// Item expected at the location.
        item: Item,
        /// Cell currently holding the item.
        location: Coordinates,
    },
    /// Transfers the item under the player into the player's inventory.
    PickUpItem {
        /// Item expected at the player's position.
        item: Item,
    },
    /// Drops a carried item onto the player's current cell.
    DropItem {
        /// Item to drop from the inventory.
        item: Item,
    },
    /// Marks a navigation destination for the player.
    SetDestination {
        /// Cell the player should travel toward.
        location: Coordinates,
    },
    /// Clears any previously marked navigation destination.
    ClearDestination,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the world grid adopted new dimensions.
    WorldResized {
        /// Extent the world now spans.
        dimensions: Dimensions,
    },
    /// Confirms that the player moved or turned.
    PlayerMoved {
        /// Snapshot of the player after the change.
        player: Player,
    },
    /// Confirms that a wall was raised.
    WallBuilt {
        /// Cell the wall now occupies.
        location: Coordinates,
    },
    /// Confirms that a wall was razed.
    WallDestroyed {
        /// Cell the wall previously occupied.
        location: Coordinates,
    },
    /// Confirms that an item appeared in the world.
    ItemPlaced {
        /// Item that was placed.
        item: Item,
        /// Cell the item occupies.
        location: Coordinates,
    },
    /// Confirms that an item left the world.
    ItemRemoved {
        /// Item that was removed.
        item: Item,
        /// Cell the item previously occupied.
        location: Coordinates,
    },
    /// Confirms that the player took an item into the inventory.
    ItemPickedUp {
        /// Item now carried by the player.
        item: Item,
    },
    /// Confirms that the player dropped a carried item.
    ItemDropped {
        /// Item no longer carried by the player.
        item: Item,
    },
    /// Announces a new navigation destination for the player.
    DestinationUpdated {
        /// Cell the player should travel toward.
        location: Coordinates,
    },
    /// Announces that the navigation destination was cleared.
    DestinationCleared,
    /// Reports that a command was refused by the world.
    CommandRejected {
        /// Command that failed validation.
        command: Command,
        /// Specific reason the command was refused.
        reason: RejectionReason,
    },
}

/// Reasons the world may refuse a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The world has not been sized yet.
    WorldNotSized,
    /// The referenced location falls outside the world bounds.
    OutOfBounds,
    /// The player has not been spawned yet.
    PlayerNotSpawned,
    /// The player has already been spawned.
    PlayerAlreadySpawned,
    /// A wall occupies the referenced location.
    BlockedByWall,
    /// An item occupies the referenced location.
    BlockedByItem,
    /// The player occupies the referenced location.
    BlockedByPlayer,
    /// The attempted step leaves the world or enters a wall.
    IllegalMove,
    /// The referenced location holds a different item than expected.
    WrongItem,
    /// The expected item is absent from the referenced location.
    MissingItem,
}
