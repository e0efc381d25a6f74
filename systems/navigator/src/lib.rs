#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Path-following system that walks the player toward marked destinations.
//!
//! The navigator consumes world events and emits movement commands, one step
//! per simulation tick. Routes come from the shared [`Grapher`] cache and
//! are recomputed whenever the world's geometry changes underneath an
//! active route, so a wall raised across the path never strands the player.

use std::collections::VecDeque;

use islander_core::{Command, Coordinates, Direction, Event, Player};
use islander_world::Grapher;

/// Pure system that reacts to world events and emits movement commands.
#[derive(Debug, Default)]
pub struct Navigator {
    player: Option<Player>,
    destination: Option<Coordinates>,
    route: VecDeque<Direction>,
}

impl Navigator {
    /// Creates an idle navigator with no queued route.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and emits the commands they warrant.
    ///
    /// One `MovePlayer` step is emitted per observed tick while a route is
    /// queued; exhausting the route, or discovering that the destination is
    /// unreachable, surrenders it with a `ClearDestination` command so the
    /// world's destination state never dangles.
    pub fn handle(&mut self, events: &[Event], grapher: &mut Grapher, out: &mut Vec<Command>) {
        let mut replan = false;
        let mut ticks = 0_usize;

        for event in events {
            match event {
                Event::PlayerMoved { player } => self.player = Some(*player),
                Event::DestinationUpdated { location } => {
                    self.destination = Some(*location);
                    replan = true;
                }
                Event::DestinationCleared => {
                    self.destination = None;
                    self.route.clear();
                }
                Event::WorldResized { .. }
                | Event::WallBuilt { .. }
                | Event::WallDestroyed { .. } => {
                    if self.destination.is_some() {
                        replan = true;
                    }
                }
                Event::TimeAdvanced { .. } => ticks += 1,
                Event::CommandRejected {
                    command: Command::MovePlayer { .. },
                    ..
                } => {
                    if self.destination.is_some() {
                        replan = true;
                    }
                }
                _ => {}
            }
        }

        if replan {
            self.replan(grapher, out);
        }

        for _ in 0..ticks {
            if self.destination.is_none() {
                break;
            }
            let Some(direction) = self.route.pop_front() else {
                break;
            };
            out.push(Command::MovePlayer { direction });
            if self.route.is_empty() {
                self.destination = None;
                out.push(Command::ClearDestination);
            }
        }
    }

    fn replan(&mut self, grapher: &mut Grapher, out: &mut Vec<Command>) {
        self.route.clear();
        let (Some(player), Some(destination)) = (self.player, self.destination) else {
            // Nothing to walk until the player has spawned.
            return;
        };

        match grapher.find_path_between(player.position(), destination) {
            Ok(route) if route.is_empty() => {
                // Already standing on the destination.
                self.destination = None;
                out.push(Command::ClearDestination);
            }
            Ok(route) => self.route = route.into(),
            Err(_) => {
                // Unreachable right now; surrender the destination instead
                // of leaving it dangling in the world state.
                self.destination = None;
                out.push(Command::ClearDestination);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Navigator;
    use islander_core::{Command, Coordinates, Dimensions, Direction, Event, Player};
    use islander_world::Grapher;
    use std::time::Duration;

    fn resized(width: u32, height: u32) -> Event {
        Event::WorldResized {
            dimensions: Dimensions::new(width, height).expect("positive extents"),
        }
    }

    fn player_at(x: u32, y: u32) -> Event {
        Event::PlayerMoved {
            player: Player::new(Coordinates::new(x, y), Direction::North),
        }
    }

    fn tick() -> Event {
        Event::TimeAdvanced {
            dt: Duration::from_secs(1),
        }
    }

    #[test]
    fn steps_are_paced_by_ticks() {
        let mut grapher = Grapher::new();
        let mut navigator = Navigator::new();
        let mut commands = Vec::new();

        let setup = [
            resized(3, 3),
            player_at(0, 0),
            Event::DestinationUpdated {
                location: Coordinates::new(2, 2),
            },
        ];
        grapher.observe(&setup);
        navigator.handle(&setup, &mut grapher, &mut commands);
        assert!(
            commands.is_empty(),
            "no step may be emitted before a tick boundary",
        );

        navigator.handle(&[tick()], &mut grapher, &mut commands);
        assert_eq!(
            commands,
            vec![Command::MovePlayer {
                direction: Direction::Northeast,
            }],
        );

        commands.clear();
        navigator.handle(&[player_at(1, 1), tick()], &mut grapher, &mut commands);
        assert_eq!(
            commands,
            vec![
                Command::MovePlayer {
                    direction: Direction::Northeast,
                },
                Command::ClearDestination,
            ],
            "exhausting the route must surrender the destination",
        );
    }

    #[test]
    fn unreachable_destinations_are_surrendered_immediately() {
        let mut grapher = Grapher::new();
        let mut navigator = Navigator::new();
        let mut commands = Vec::new();

        let setup = [
            resized(3, 3),
            Event::WallBuilt {
                location: Coordinates::new(2, 2),
            },
            player_at(0, 0),
            Event::DestinationUpdated {
                location: Coordinates::new(2, 2),
            },
        ];
        grapher.observe(&setup);
        navigator.handle(&setup, &mut grapher, &mut commands);

        assert_eq!(commands, vec![Command::ClearDestination]);
    }

    #[test]
    fn arriving_destination_updates_resolve_without_steps() {
        let mut grapher = Grapher::new();
        let mut navigator = Navigator::new();
        let mut commands = Vec::new();

        let setup = [
            resized(3, 3),
            player_at(1, 1),
            Event::DestinationUpdated {
                location: Coordinates::new(1, 1),
            },
        ];
        grapher.observe(&setup);
        navigator.handle(&setup, &mut grapher, &mut commands);

        assert_eq!(commands, vec![Command::ClearDestination]);
    }

    #[test]
    fn geometry_changes_replan_the_active_route() {
        let mut grapher = Grapher::new();
        let mut navigator = Navigator::new();
        let mut commands = Vec::new();

        let setup = [
            resized(3, 3),
            player_at(0, 0),
            Event::DestinationUpdated {
                location: Coordinates::new(2, 2),
            },
        ];
        grapher.observe(&setup);
        navigator.handle(&setup, &mut grapher, &mut commands);

        // A wall lands on the diagonal the route would have taken.
        let wall = Event::WallBuilt {
            location: Coordinates::new(1, 1),
        };
        grapher.observe(std::slice::from_ref(&wall));
        navigator.handle(&[wall, tick()], &mut grapher, &mut commands);

        let Some(Command::MovePlayer { direction }) = commands.first() else {
            panic!("expected a detour step, got {commands:?}");
        };
        let next = Coordinates::new(0, 0)
            .step(*direction)
            .expect("step stays inside the quadrant");
        assert_ne!(
            next,
            Coordinates::new(1, 1),
            "the replanned route must avoid the new wall",
        );
    }

    #[test]
    fn rejected_moves_trigger_a_replan() {
        let mut grapher = Grapher::new();
        let mut navigator = Navigator::new();
        let mut commands = Vec::new();

        let setup = [
            resized(3, 3),
            player_at(0, 0),
            Event::DestinationUpdated {
                location: Coordinates::new(2, 0),
            },
        ];
        grapher.observe(&setup);
        navigator.handle(&setup, &mut grapher, &mut commands);
        navigator.handle(&[tick()], &mut grapher, &mut commands);
        commands.clear();

        // The world refused the step; the navigator recomputes from its
        // last confirmed position instead of walking the stale route.
        let rejection = Event::CommandRejected {
            command: Command::MovePlayer {
                direction: Direction::East,
            },
            reason: islander_core::RejectionReason::IllegalMove,
        };
        navigator.handle(&[rejection, tick()], &mut grapher, &mut commands);

        assert_eq!(
            commands,
            vec![Command::MovePlayer {
                direction: Direction::East,
            }],
            "replanning from (0, 0) restarts the eastward route",
        );
    }
}
