#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Goal-oriented action planning for the Islander player.
//!
//! The planner turns a high-level [`Goal`] into an ordered action list by
//! backward chaining: starting from the effect the goal demands, it asks
//! every registered [`ActionFactory`] for candidate actions, follows each
//! unsatisfied precondition to the effect that would satisfy it, and keeps
//! chaining until the frontier grounds out in preconditions that already
//! hold. The chains form a directed graph of effects connected by actions,
//! and the cheapest route through that graph is the plan.
//!
//! Planning graphs are built fresh for every `plan` call and discarded
//! afterwards; they embed precondition answers evaluated against live
//! read-models, so caching them would serve stale worlds.

use std::fmt;

use islander_core::{Coordinates, Item};
use islander_graph::{find_path, DirectedGraphBuilder, NodeId, SearchError};
use islander_world::{Grapher, Holder, Mapper};

/// Branches are pruned once they chain this many intermediate effects; a
/// longer chain in this domain always means runaway recursion rather than a
/// viable plan.
const MAX_CHAIN_DEPTH: usize = 8;

/// World condition an action can bring about.
///
/// Effects are the node payloads of the planning graph. Equality is by
/// variant and carried data, but the graph mints a fresh node for every
/// expansion, so recurring effects stay distinct search states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// The player stands at the carried coordinates.
    PlayerLocatedAt(Coordinates),
    /// A wall stands at the carried coordinates.
    WallExistsAt(Coordinates),
    /// The carried item has been taken into the inventory.
    ItemPickedUp(Item),
}

/// Condition that must hold before an action may run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Precondition {
    /// The player carries the item.
    HoldsItem(Item),
    /// A route exists from the player to the item.
    ItemReachable(Item),
    /// The destination is a traversable cell of the world.
    DestinationClear(Coordinates),
}

impl Precondition {
    /// Effect that would satisfy the precondition, when one exists.
    ///
    /// Preconditions without a satisfying effect are dead ends for the
    /// backward chainer: either they already hold or the branch is
    /// abandoned.
    #[must_use]
    pub fn satisfied_by(&self) -> Option<Effect> {
        match self {
            Self::HoldsItem(item) => Some(Effect::ItemPickedUp(*item)),
            Self::ItemReachable(_) | Self::DestinationClear(_) => None,
        }
    }

    /// Evaluates the precondition against the live read-models.
    #[must_use]
    pub fn check(&self, context: &mut PlannerContext<'_>) -> bool {
        match self {
            Self::HoldsItem(item) => context.holder.has(*item),
            Self::ItemReachable(item) => {
                let Some(player) = context.mapper.player_location() else {
                    return false;
                };
                let Some(location) = context.mapper.item_location(*item) else {
                    return false;
                };
                context.grapher.find_path_between(player, location).is_ok()
            }
            Self::DestinationClear(location) => context.grapher.is_reachable(*location),
        }
    }
}

/// Concrete unit of plan work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    /// Walk to the carried destination.
    MoveTo(Coordinates),
    /// Raise a wall at the carried location.
    BuildWall(Coordinates),
    /// Take the carried item from the ground.
    PickUpItem(Item),
}

/// Unit of plan work together with the preconditions gating it.
///
/// Actions label the edges of the planning graph; the execution layer
/// consumes them in the order the plan lists them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    kind: ActionKind,
    preconditions: Vec<Precondition>,
}

impl Action {
    /// Assembles an action with an explicit precondition set.
    ///
    /// Factories use this to attach the preconditions their domain demands.
    #[must_use]
    pub fn with_preconditions(kind: ActionKind, preconditions: Vec<Precondition>) -> Self {
        Self {
            kind,
            preconditions,
        }
    }

    /// Walk action gated on the destination being traversable.
    #[must_use]
    pub fn move_to(destination: Coordinates) -> Self {
        Self::with_preconditions(
            ActionKind::MoveTo(destination),
            vec![Precondition::DestinationClear(destination)],
        )
    }

    /// Construction action gated on carrying the pickaxe.
    #[must_use]
    pub fn build_wall(location: Coordinates) -> Self {
        Self::with_preconditions(
            ActionKind::BuildWall(location),
            vec![Precondition::HoldsItem(Item::Pickaxe)],
        )
    }

    /// Pick-up action gated on the item being reachable.
    #[must_use]
    pub fn pick_up(item: Item) -> Self {
        Self::with_preconditions(
            ActionKind::PickUpItem(item),
            vec![Precondition::ItemReachable(item)],
        )
    }

    /// Work the action performs when executed.
    #[must_use]
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// Conditions that must hold before the action may run.
    #[must_use]
    pub fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }
}

/// Produces actions capable of bringing about particular effects.
///
/// The planner holds a fixed factory set registered at construction time;
/// every expansion consults each factory in registration order.
pub trait ActionFactory {
    /// Reports whether the factory can produce the provided effect.
    fn can_produce(&self, effect: &Effect) -> bool;

    /// Builds the action bringing about the effect, or `None` when the
    /// factory cannot produce it.
    fn create(&self, effect: &Effect) -> Option<Action>;
}

/// Factory for walk actions satisfying `PlayerLocatedAt` effects.
#[derive(Debug, Default)]
pub struct MoveActionFactory;

impl ActionFactory for MoveActionFactory {
    fn can_produce(&self, effect: &Effect) -> bool {
        matches!(effect, Effect::PlayerLocatedAt(_))
    }

    fn create(&self, effect: &Effect) -> Option<Action> {
        match effect {
            Effect::PlayerLocatedAt(destination) => Some(Action::move_to(*destination)),
            _ => None,
        }
    }
}

/// Factory for construction actions satisfying `WallExistsAt` effects.
#[derive(Debug, Default)]
pub struct BuildWallActionFactory;

impl ActionFactory for BuildWallActionFactory {
    fn can_produce(&self, effect: &Effect) -> bool {
        matches!(effect, Effect::WallExistsAt(_))
    }

    fn create(&self, effect: &Effect) -> Option<Action> {
        match effect {
            Effect::WallExistsAt(location) => Some(Action::build_wall(*location)),
            _ => None,
        }
    }
}

/// Factory for pick-up actions satisfying `ItemPickedUp` effects.
#[derive(Debug, Default)]
pub struct PickUpItemActionFactory;

impl ActionFactory for PickUpItemActionFactory {
    fn can_produce(&self, effect: &Effect) -> bool {
        matches!(effect, Effect::ItemPickedUp(_))
    }

    fn create(&self, effect: &Effect) -> Option<Action> {
        match effect {
            Effect::ItemPickedUp(item) => Some(Action::pick_up(*item)),
            _ => None,
        }
    }
}

/// Top-level planning request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Goal {
    /// The player should end up at the carried coordinates.
    MoveTo(Coordinates),
    /// A wall should stand at the carried coordinates.
    BuildWall(Coordinates),
}

impl Goal {
    /// Effect that must be achieved for the goal to be satisfied.
    #[must_use]
    pub fn desired_effect(&self) -> Effect {
        match self {
            Self::MoveTo(location) => Effect::PlayerLocatedAt(*location),
            Self::BuildWall(location) => Effect::WallExistsAt(*location),
        }
    }
}

/// Read-only lookups the planner's precondition checks evaluate against.
///
/// The grapher is borrowed mutably because its queries lazily rebuild the
/// cached world graph; all lookups remain logically read-only.
#[derive(Debug)]
pub struct PlannerContext<'a> {
    /// Player and item location projection.
    pub mapper: &'a Mapper,
    /// Inventory projection.
    pub holder: &'a Holder,
    /// Traversal cache answering reachability and routing queries.
    pub grapher: &'a mut Grapher,
}

/// Failure to find any action chain satisfying a goal.
///
/// Expected and recoverable: the invoking layer treats it as "no feasible
/// plan exists right now", never as a fatal error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImpossibleGoal;

impl fmt::Display for ImpossibleGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no chain of available actions satisfies the goal")
    }
}

impl std::error::Error for ImpossibleGoal {}

/// Backward-chaining planner searching the effect graph with A*.
pub struct Planner {
    factories: Vec<Box<dyn ActionFactory>>,
}

impl fmt::Debug for Planner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Planner")
            .field("factories", &self.factories.len())
            .finish()
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::with_default_factories()
    }
}

impl Planner {
    /// Creates a planner with an explicit factory set.
    #[must_use]
    pub fn new(factories: Vec<Box<dyn ActionFactory>>) -> Self {
        Self { factories }
    }

    /// Creates a planner registered with every built-in factory.
    #[must_use]
    pub fn with_default_factories() -> Self {
        Self::new(vec![
            Box::new(MoveActionFactory),
            Box::new(BuildWallActionFactory),
            Box::new(PickUpItemActionFactory),
        ])
    }

    /// Plans the cheapest ordered action sequence satisfying the goal.
    ///
    /// A fresh planning graph is built per call: a payload-free start node,
    /// a node for the goal effect, and one node per intermediate effect
    /// discovered while backward chaining. Actions whose preconditions
    /// already hold connect the start node directly; unsatisfied
    /// preconditions that expose a satisfying effect recurse into a new
    /// intermediate node; unsatisfied preconditions without one abandon the
    /// branch. A* then routes from start to goal with a constant heuristic,
    /// degenerating to uniform-cost search.
    ///
    /// # Errors
    ///
    /// Fails with [`ImpossibleGoal`] when no action chain grounds out in
    /// currently satisfiable preconditions.
    pub fn plan(
        &self,
        goal: &Goal,
        context: &mut PlannerContext<'_>,
    ) -> Result<Vec<Action>, ImpossibleGoal> {
        let mut builder = DirectedGraphBuilder::new();
        let start = builder.add_node(None);
        let effect = goal.desired_effect();
        let end = builder.add_node(Some(effect.clone()));

        let mut visited = vec![effect.clone()];
        self.expand(&mut builder, start, end, &effect, context, &mut visited);

        let graph = builder.build();
        match find_path(start, end, &graph, |_, _| 1) {
            Ok(route) => Ok(route.iter().map(|edge| edge.label().clone()).collect()),
            Err(SearchError::NoPath) => Err(ImpossibleGoal),
            Err(SearchError::Graph(error)) => {
                // Every handle was minted by the builder a few lines up, so
                // the graph refusing one indicates a planner bug.
                panic!("planning graph rejected its own node handles: {error}");
            }
        }
    }

    fn expand(
        &self,
        builder: &mut DirectedGraphBuilder<Option<Effect>, Action>,
        start: NodeId,
        target: NodeId,
        effect: &Effect,
        context: &mut PlannerContext<'_>,
        visited: &mut Vec<Effect>,
    ) {
        let candidates: Vec<Action> = self
            .factories
            .iter()
            .filter(|factory| factory.can_produce(effect))
            .filter_map(|factory| factory.create(effect))
            .collect();

        for candidate in candidates {
            if candidate.preconditions().is_empty() {
                // Nothing gates the action; it is executable right now.
                builder.connect(start, target, candidate, 1);
                continue;
            }

            for &precondition in candidate.preconditions() {
                if precondition.check(context) {
                    builder.connect(start, target, candidate.clone(), 1);
                } else if let Some(child_effect) = precondition.satisfied_by() {
                    if visited.len() >= MAX_CHAIN_DEPTH || visited.contains(&child_effect) {
                        // Cyclic or runaway chain: abandon this branch and
                        // let the remaining candidates compete.
                        continue;
                    }

                    let step = builder.add_node(Some(child_effect.clone()));
                    builder.connect(step, target, candidate.clone(), 1);
                    visited.push(child_effect.clone());
                    self.expand(builder, start, step, &child_effect, context, visited);
                    let _ = visited.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Action, ActionFactory, BuildWallActionFactory, Effect, MoveActionFactory,
        PickUpItemActionFactory, Precondition,
    };
    use islander_core::{Coordinates, Item};

    #[test]
    fn factories_only_claim_their_own_effects() {
        let located = Effect::PlayerLocatedAt(Coordinates::new(1, 1));
        let walled = Effect::WallExistsAt(Coordinates::new(1, 1));
        let picked = Effect::ItemPickedUp(Item::Pickaxe);

        assert!(MoveActionFactory.can_produce(&located));
        assert!(!MoveActionFactory.can_produce(&walled));
        assert!(BuildWallActionFactory.can_produce(&walled));
        assert!(!BuildWallActionFactory.can_produce(&picked));
        assert!(PickUpItemActionFactory.can_produce(&picked));
        assert!(!PickUpItemActionFactory.can_produce(&located));
    }

    #[test]
    fn create_mirrors_can_produce() {
        let located = Effect::PlayerLocatedAt(Coordinates::new(2, 3));
        assert_eq!(
            MoveActionFactory.create(&located),
            Some(Action::move_to(Coordinates::new(2, 3))),
        );
        assert_eq!(MoveActionFactory.create(&Effect::ItemPickedUp(Item::Pickaxe)), None);
    }

    #[test]
    fn holding_an_item_is_satisfiable_by_picking_it_up() {
        let precondition = Precondition::HoldsItem(Item::Pickaxe);
        assert_eq!(
            precondition.satisfied_by(),
            Some(Effect::ItemPickedUp(Item::Pickaxe)),
        );
    }

    #[test]
    fn reachability_preconditions_are_terminal() {
        assert_eq!(Precondition::ItemReachable(Item::Pickaxe).satisfied_by(), None);
        assert_eq!(
            Precondition::DestinationClear(Coordinates::new(0, 0)).satisfied_by(),
            None,
        );
    }

    #[test]
    fn built_in_actions_carry_their_gating_preconditions() {
        let build = Action::build_wall(Coordinates::new(4, 4));
        assert_eq!(build.preconditions(), &[Precondition::HoldsItem(Item::Pickaxe)]);

        let walk = Action::move_to(Coordinates::new(1, 2));
        assert_eq!(
            walk.preconditions(),
            &[Precondition::DestinationClear(Coordinates::new(1, 2))],
        );
    }
}
