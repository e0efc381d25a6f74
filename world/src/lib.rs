#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Islander.
//!
//! The world is mutated exclusively through [`apply`], which validates a
//! [`Command`] against the current state and either broadcasts the resulting
//! facts or a `CommandRejected` event. Systems never mutate the world
//! directly; they consume the event stream and respond with new command
//! batches.

use std::collections::{HashMap, HashSet};

use islander_core::{
    Command, Coordinates, Dimensions, Direction, Event, Item, Player, RejectionReason,
};

mod grapher;
mod mapper;

pub use grapher::{Grapher, NoRoute};
pub use mapper::{Holder, Mapper};

/// Represents the authoritative Islander world state.
#[derive(Debug, Default)]
pub struct World {
    dimensions: Option<Dimensions>,
    player: Option<Player>,
    walls: HashSet<Coordinates>,
    items: HashMap<Coordinates, Item>,
    inventory: HashSet<Item>,
    destination: Option<Coordinates>,
}

impl World {
    /// Creates a new, unsized world awaiting its first `Resize` command.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn reject(command: Command, reason: RejectionReason, out_events: &mut Vec<Event>) {
        out_events.push(Event::CommandRejected { command, reason });
    }

    fn resize(&mut self, dimensions: Dimensions, out_events: &mut Vec<Event>) {
        if self.dimensions == Some(dimensions) {
            return;
        }

        let shrinking = self
            .dimensions
            .is_some_and(|current| dimensions.shrinks_from(current));

        if shrinking {
            if let Some(player) = self.player {
                let clamped = Coordinates::new(
                    player.position().x().min(dimensions.width() - 1),
                    player.position().y().min(dimensions.height() - 1),
                );
                if clamped != player.position() {
                    let moved = Player::new(clamped, player.facing());
                    self.player = Some(moved);
                    out_events.push(Event::PlayerMoved { player: moved });
                }
            }

            let mut razed: Vec<Coordinates> = self
                .walls
                .iter()
                .copied()
                .filter(|wall| !dimensions.contains(*wall))
                .collect();
            razed.sort();
            for wall in razed {
                let _ = self.walls.remove(&wall);
                out_events.push(Event::WallDestroyed { location: wall });
            }

            let mut stranded: Vec<(Coordinates, Item)> = self
                .items
                .iter()
                .map(|(location, item)| (*location, *item))
                .filter(|(location, _)| !dimensions.contains(*location))
                .collect();
            stranded.sort();
            for (location, item) in stranded {
                let _ = self.items.remove(&location);
                out_events.push(Event::ItemRemoved { item, location });
            }
        }

        self.dimensions = Some(dimensions);
        out_events.push(Event::WorldResized { dimensions });
    }

    fn spawn_player(&mut self, location: Coordinates, out_events: &mut Vec<Event>) {
        let command = Command::SpawnPlayer { location };
        if self.player.is_some() {
            return Self::reject(command, RejectionReason::PlayerAlreadySpawned, out_events);
        }
        let Some(dimensions) = self.dimensions else {
            return Self::reject(command, RejectionReason::WorldNotSized, out_events);
        };
        if !dimensions.contains(location) {
            return Self::reject(command, RejectionReason::OutOfBounds, out_events);
        }
        if self.walls.contains(&location) {
            return Self::reject(command, RejectionReason::BlockedByWall, out_events);
        }

        let player = Player::new(location, Direction::North);
        self.player = Some(player);
        out_events.push(Event::PlayerMoved { player });
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let command = Command::MovePlayer { direction };
        let Some(player) = self.player else {
            return Self::reject(command, RejectionReason::PlayerNotSpawned, out_events);
        };
        let Some(dimensions) = self.dimensions else {
            return Self::reject(command, RejectionReason::WorldNotSized, out_events);
        };

        let legal = player
            .position()
            .step(direction)
            .filter(|target| dimensions.contains(*target))
            .filter(|target| !self.walls.contains(target));
        let Some(target) = legal else {
            return Self::reject(command, RejectionReason::IllegalMove, out_events);
        };

        let moved = Player::new(target, direction);
        self.player = Some(moved);
        out_events.push(Event::PlayerMoved { player: moved });
    }

    fn turn_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let command = Command::TurnPlayer { direction };
        let Some(player) = self.player else {
            return Self::reject(command, RejectionReason::PlayerNotSpawned, out_events);
        };
        if player.facing() == direction {
            return;
        }

        let turned = Player::new(player.position(), direction);
        self.player = Some(turned);
        out_events.push(Event::PlayerMoved { player: turned });
    }

    fn build_wall(&mut self, location: Coordinates, out_events: &mut Vec<Event>) {
        let command = Command::BuildWall { location };
        let Some(dimensions) = self.dimensions else {
            return Self::reject(command, RejectionReason::WorldNotSized, out_events);
        };
        if !dimensions.contains(location) {
            return Self::reject(command, RejectionReason::OutOfBounds, out_events);
        }
        if self.player.map(|player| player.position()) == Some(location) {
            return Self::reject(command, RejectionReason::BlockedByPlayer, out_events);
        }
        if self.items.contains_key(&location) {
            return Self::reject(command, RejectionReason::BlockedByItem, out_events);
        }
        if self.walls.contains(&location) {
            return;
        }

        let _ = self.walls.insert(location);
        out_events.push(Event::WallBuilt { location });
    }

    fn destroy_wall(&mut self, location: Coordinates, out_events: &mut Vec<Event>) {
        let command = Command::DestroyWall { location };
        let Some(dimensions) = self.dimensions else {
            return Self::reject(command, RejectionReason::WorldNotSized, out_events);
        };
        if !dimensions.contains(location) {
            return Self::reject(command, RejectionReason::OutOfBounds, out_events);
        }
        if !self.walls.contains(&location) {
            return;
        }

        let _ = self.walls.remove(&location);
        out_events.push(Event::WallDestroyed { location });
    }

    fn place_item(&mut self, item: Item, location: Coordinates, out_events: &mut Vec<Event>) {
        let command = Command::PlaceItem { item, location };
        let Some(dimensions) = self.dimensions else {
            return Self::reject(command, RejectionReason::WorldNotSized, out_events);
        };
        if !dimensions.contains(location) {
            return Self::reject(command, RejectionReason::OutOfBounds, out_events);
        }
        if self.walls.contains(&location) {
            return Self::reject(command, RejectionReason::BlockedByWall, out_events);
        }
        match self.items.get(&location) {
            Some(present) if *present == item => return,
            Some(_) => {
                return Self::reject(command, RejectionReason::BlockedByItem, out_events);
            }
            None => {}
        }

        let _ = self.items.insert(location, item);
        out_events.push(Event::ItemPlaced { item, location });
    }

    fn remove_item(&mut self, item: Item, location: Coordinates, out_events: &mut Vec<Event>) {
        let command = Command::RemoveItem { item, location };
        let Some(dimensions) = self.dimensions else {
            return Self::reject(command, RejectionReason::WorldNotSized, out_events);
        };
        if !dimensions.contains(location) {
            return Self::reject(command, RejectionReason::OutOfBounds, out_events);
        }
        match self.items.get(&location) {
            None => return,
            Some(present) if *present != item => {
                return Self::reject(command, RejectionReason::WrongItem, out_events);
            }
            Some(_) => {}
        }

        let _ = self.items.remove(&location);
        out_events.push(Event::ItemRemoved { item, location });
    }

    fn pick_up_item(&mut self, item: Item, out_events: &mut Vec<Event>) {
        let command = Command::PickUpItem { item };
        let Some(player) = self.player else {
            return Self::reject(command, RejectionReason::PlayerNotSpawned, out_events);
        };
        if self.inventory.contains(&item) {
            return;
        }
        let location = player.position();
        match self.items.get(&location) {
            None => {
                return Self::reject(command, RejectionReason::MissingItem, out_events);
            }
            Some(present) if *present != item => {
                return Self::reject(command, RejectionReason::WrongItem, out_events);
            }
            Some(_) => {}
        }

        let _ = self.items.remove(&location);
        let _ = self.inventory.insert(item);
        out_events.push(Event::ItemPickedUp { item });
        out_events.push(Event::ItemRemoved { item, location });
    }

    fn drop_item(&mut self, item: Item, out_events: &mut Vec<Event>) {
        let command = Command::DropItem { item };
        let Some(player) = self.player else {
            return Self::reject(command, RejectionReason::PlayerNotSpawned, out_events);
        };
        if !self.inventory.contains(&item) {
            return;
        }
        let location = player.position();
        if self.items.contains_key(&location) {
            return Self::reject(command, RejectionReason::BlockedByItem, out_events);
        }

        let _ = self.inventory.remove(&item);
        let _ = self.items.insert(location, item);
        out_events.push(Event::ItemDropped { item });
        out_events.push(Event::ItemPlaced { item, location });
    }

    fn set_destination(&mut self, location: Coordinates, out_events: &mut Vec<Event>) {
        let command = Command::SetDestination { location };
        let Some(dimensions) = self.dimensions else {
            return Self::reject(command, RejectionReason::WorldNotSized, out_events);
        };
        if !dimensions.contains(location) {
            return Self::reject(command, RejectionReason::OutOfBounds, out_events);
        }
        if self.destination == Some(location) {
            return;
        }

        self.destination = Some(location);
        out_events.push(Event::DestinationUpdated { location });
    }

    fn clear_destination(&mut self, out_events: &mut Vec<Event>) {
        if self.destination.is_none() {
            return;
        }

        self.destination = None;
        out_events.push(Event::DestinationCleared);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Every accepted mutation is announced through `out_events`; refusals are
/// announced as `CommandRejected` events rather than panics so that callers
/// observe a single, uniform fact stream.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => out_events.push(Event::TimeAdvanced { dt }),
        Command::Resize { dimensions } => world.resize(dimensions, out_events),
        Command::SpawnPlayer { location } => world.spawn_player(location, out_events),
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::TurnPlayer { direction } => world.turn_player(direction, out_events),
        Command::BuildWall { location } => world.build_wall(location, out_events),
        Command::DestroyWall { location } => world.destroy_wall(location, out_events),
        Command::PlaceItem { item, location } => world.place_item(item, location, out_events),
        Command::RemoveItem { item, location } => world.remove_item(item, location, out_events),
        Command::PickUpItem { item } => world.pick_up_item(item, out_events),
        Command::DropItem { item } => world.drop_item(item, out_events),
        Command::SetDestination { location } => world.set_destination(location, out_events),
        Command::ClearDestination => world.clear_destination(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use islander_core::{Coordinates, Dimensions, Item, Player};

    /// Current extent of the world, if it has been sized.
    #[must_use]
    pub fn dimensions(world: &World) -> Option<Dimensions> {
        world.dimensions
    }

    /// Snapshot of the player, if one has been spawned.
    #[must_use]
    pub fn player(world: &World) -> Option<Player> {
        world.player
    }

    /// Walls currently standing, in deterministic coordinate order.
    #[must_use]
    pub fn walls(world: &World) -> Vec<Coordinates> {
        let mut walls: Vec<Coordinates> = world.walls.iter().copied().collect();
        walls.sort();
        walls
    }

    /// Reports whether a wall stands at the provided location.
    #[must_use]
    pub fn is_wall_at(world: &World, location: Coordinates) -> bool {
        world.walls.contains(&location)
    }

    /// Item resting at the provided location, if any.
    #[must_use]
    pub fn item_at(world: &World, location: Coordinates) -> Option<Item> {
        world.items.get(&location).copied()
    }

    /// Items currently placed in the world, in deterministic location order.
    #[must_use]
    pub fn items(world: &World) -> Vec<(Coordinates, Item)> {
        let mut items: Vec<(Coordinates, Item)> = world
            .items
            .iter()
            .map(|(location, item)| (*location, *item))
            .collect();
        items.sort();
        items
    }

    /// Reports whether the player currently carries the provided item.
    #[must_use]
    pub fn carries(world: &World, item: Item) -> bool {
        world.inventory.contains(&item)
    }

    /// Current navigation destination, if one is marked.
    #[must_use]
    pub fn destination(world: &World) -> Option<Coordinates> {
        world.destination
    }
}
