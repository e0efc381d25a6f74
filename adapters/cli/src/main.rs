#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a scripted Islander scenario headlessly.
//!
//! The driver wires the authoritative world, the traversal cache, the
//! read-model projections, the navigator and the planner into a single
//! command/event loop, then asks the planner to arrange for a wall at the
//! requested location and executes the resulting plan step by step.

use std::collections::VecDeque;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use islander_core::{Command, Coordinates, Dimensions, Event, Item};
use islander_system_navigator::Navigator;
use islander_system_planner::{ActionKind, Goal, Planner, PlannerContext};
use islander_world::{apply, query, Grapher, Holder, Mapper, World};

/// Headless Islander scenario driver.
#[derive(Debug, Parser)]
#[command(name = "islander")]
struct Args {
    /// Width of the world grid in cells.
    #[arg(long, default_value_t = 8)]
    width: u32,

    /// Height of the world grid in cells.
    #[arg(long, default_value_t = 8)]
    height: u32,

    /// X coordinate of the wall the planner should arrange to build.
    #[arg(long, default_value_t = 5)]
    wall_x: u32,

    /// Y coordinate of the wall the planner should arrange to build.
    #[arg(long, default_value_t = 5)]
    wall_y: u32,
}

/// Minimal engine loop: commands in, events out, systems in between.
struct Engine {
    world: World,
    grapher: Grapher,
    mapper: Mapper,
    holder: Holder,
    navigator: Navigator,
}

impl Engine {
    fn new() -> Self {
        Self {
            world: World::new(),
            grapher: Grapher::new(),
            mapper: Mapper::new(),
            holder: Holder::new(),
            navigator: Navigator::new(),
        }
    }

    /// Applies the commands in order, feeding every resulting event batch to
    /// the projections and the navigator until the command queue drains.
    fn submit(&mut self, commands: impl IntoIterator<Item = Command>) {
        let mut queue: VecDeque<Command> = commands.into_iter().collect();
        while let Some(command) = queue.pop_front() {
            let mut events = Vec::new();
            apply(&mut self.world, command, &mut events);
            for event in &events {
                announce(event);
            }

            self.grapher.observe(&events);
            self.mapper.observe(&events);
            self.holder.observe(&events);

            let mut follow_ups = Vec::new();
            self.navigator
                .handle(&events, &mut self.grapher, &mut follow_ups);
            queue.extend(follow_ups);
        }
    }

    /// Ticks the simulation until the active destination resolves.
    fn walk_to(&mut self, destination: Coordinates) -> Result<()> {
        self.submit([Command::SetDestination {
            location: destination,
        }]);

        let mut remaining = 4 * (self.cell_count() + 1);
        while query::destination(&self.world).is_some() {
            if remaining == 0 {
                bail!(
                    "player failed to reach ({}, {}) within the allotted ticks",
                    destination.x(),
                    destination.y()
                );
            }
            remaining -= 1;
            self.submit([Command::Tick {
                dt: Duration::from_secs(1),
            }]);
        }

        let player = query::player(&self.world).context("player vanished mid-walk")?;
        if player.position() != destination {
            bail!(
                "walk ended at ({}, {}) instead of ({}, {})",
                player.position().x(),
                player.position().y(),
                destination.x(),
                destination.y()
            );
        }
        Ok(())
    }

    fn cell_count(&self) -> usize {
        query::dimensions(&self.world)
            .map(|dimensions| dimensions.width() as usize * dimensions.height() as usize)
            .unwrap_or(0)
    }
}

fn announce(event: &Event) {
    match event {
        Event::TimeAdvanced { .. } => {}
        Event::CommandRejected { command, reason } => {
            println!("rejected {command:?}: {reason:?}");
        }
        other => println!("{other:?}"),
    }
}

/// Entry point for the Islander command-line scenario.
fn main() -> Result<()> {
    let args = Args::parse();
    let dimensions =
        Dimensions::new(args.width, args.height).context("invalid world dimensions")?;
    let wall_site = Coordinates::new(args.wall_x, args.wall_y);
    if !dimensions.contains(wall_site) {
        bail!(
            "wall site ({}, {}) lies outside the {}x{} grid",
            wall_site.x(),
            wall_site.y(),
            args.width,
            args.height
        );
    }

    let mut engine = Engine::new();
    engine.submit([
        Command::Resize { dimensions },
        Command::SpawnPlayer {
            location: Coordinates::new(0, 0),
        },
        Command::PlaceItem {
            item: Item::Pickaxe,
            location: Coordinates::new(args.width - 1, 0),
        },
    ]);

    let planner = Planner::with_default_factories();
    let goal = Goal::BuildWall(wall_site);
    let plan = {
        let mut context = PlannerContext {
            mapper: &engine.mapper,
            holder: &engine.holder,
            grapher: &mut engine.grapher,
        };
        planner
            .plan(&goal, &mut context)
            .context("no feasible plan for the requested wall")?
    };

    println!("plan:");
    for (index, action) in plan.iter().enumerate() {
        println!("  {}. {:?}", index + 1, action.kind());
    }

    for action in &plan {
        match action.kind() {
            ActionKind::MoveTo(destination) => engine.walk_to(*destination)?,
            ActionKind::PickUpItem(item) => {
                let location = engine
                    .mapper
                    .item_location(*item)
                    .context("item expected on the ground")?;
                engine.walk_to(location)?;
                engine.submit([Command::PickUpItem { item: *item }]);
            }
            ActionKind::BuildWall(location) => {
                engine.submit([Command::BuildWall {
                    location: *location,
                }]);
            }
        }
    }

    if !query::is_wall_at(&engine.world, wall_site) {
        bail!(
            "plan executed but no wall stands at ({}, {})",
            wall_site.x(),
            wall_site.y()
        );
    }
    println!(
        "wall standing at ({}, {}); walls: {:?}",
        wall_site.x(),
        wall_site.y(),
        query::walls(&engine.world)
    );
    Ok(())
}
