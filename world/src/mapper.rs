//! Read-model projections fed by the world's event stream.

use std::collections::{HashMap, HashSet};

use islander_core::{Coordinates, Event, Item};

/// Tracks the last announced player location and item placements.
///
/// The projection answers the planner's precondition lookups without
/// touching the authoritative world state.
#[derive(Debug, Default)]
pub struct Mapper {
    player: Option<Coordinates>,
    items: HashMap<Item, Coordinates>,
}

impl Mapper {
    /// Creates an empty projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds world events into the projection.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::PlayerMoved { player } => {
                    self.player = Some(player.position());
                }
                Event::ItemPlaced { item, location } => {
                    let _ = self.items.insert(*item, *location);
                }
                Event::ItemRemoved { item, .. } => {
                    let _ = self.items.remove(item);
                }
                _ => {}
            }
        }
    }

    /// Last known player location, if the player has been seen at all.
    #[must_use]
    pub fn player_location(&self) -> Option<Coordinates> {
        self.player
    }

    /// Current location of the provided item, if it rests in the world.
    #[must_use]
    pub fn item_location(&self, item: Item) -> Option<Coordinates> {
        self.items.get(&item).copied()
    }
}

/// Tracks the player's inventory from pick-up and drop events.
#[derive(Debug, Default)]
pub struct Holder {
    inventory: HashSet<Item>,
}

impl Holder {
    /// Creates an empty inventory projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds world events into the projection.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::ItemPickedUp { item } => {
                    let _ = self.inventory.insert(*item);
                }
                Event::ItemDropped { item } => {
                    let _ = self.inventory.remove(item);
                }
                _ => {}
            }
        }
    }

    /// Reports whether the player currently carries the provided item.
    #[must_use]
    pub fn has(&self, item: Item) -> bool {
        self.inventory.contains(&item)
    }
}

#[cfg(test)]
mod tests {
    use super::{Holder, Mapper};
    use islander_core::{Coordinates, Direction, Event, Item, Player};

    #[test]
    fn mapper_follows_player_and_items() {
        let mut mapper = Mapper::new();
        assert_eq!(mapper.player_location(), None);

        mapper.observe(&[
            Event::PlayerMoved {
                player: Player::new(Coordinates::new(1, 2), Direction::East),
            },
            Event::ItemPlaced {
                item: Item::Pickaxe,
                location: Coordinates::new(4, 4),
            },
        ]);
        assert_eq!(mapper.player_location(), Some(Coordinates::new(1, 2)));
        assert_eq!(mapper.item_location(Item::Pickaxe), Some(Coordinates::new(4, 4)));

        mapper.observe(&[Event::ItemRemoved {
            item: Item::Pickaxe,
            location: Coordinates::new(4, 4),
        }]);
        assert_eq!(mapper.item_location(Item::Pickaxe), None);
    }

    #[test]
    fn holder_tracks_pickups_and_drops() {
        let mut holder = Holder::new();
        assert!(!holder.has(Item::Pickaxe));

        holder.observe(&[Event::ItemPickedUp { item: Item::Pickaxe }]);
        assert!(holder.has(Item::Pickaxe));

        holder.observe(&[Event::ItemDropped { item: Item::Pickaxe }]);
        assert!(!holder.has(Item::Pickaxe));
    }
}
