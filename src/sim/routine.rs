//! Where people spend each half-day.

use std::collections::BTreeMap;

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use super::context::{Occasion, TickContext};
use super::random::{chance, weighted_choice};
use super::system::{Fidelity, SimSystem};
use crate::config::RoutineConfig;
use crate::id::{BuildingId, PersonId};
use crate::model::{BusinessKind, Entity, Phase, Shift, SimTimestamp, World};
use crate::model::timestamp::DAYS_PER_YEAR;

/// The nearest open business of `kind` to a person's home.
pub fn patronized(world: &World, person: PersonId, kind: BusinessKind) -> Option<BuildingId> {
    let home = world.person(person).home?;
    let lot = world.building_lot(home);
    world
        .businesses_of_kind(kind)
        .min_by_key(|b| (world.town.lot_distance(lot, b.lot), b.id))
        .map(|b| b.id)
}

fn on_shift(shift: Shift, phase: Phase) -> bool {
    matches!((shift, phase), (Shift::Day, Phase::Day) | (Shift::Night, Phase::Night))
}

#[derive(Clone, Copy)]
enum Visit {
    Neighbor,
    Relative,
    Friend,
}

fn errand(world: &World, rng: &mut dyn RngCore, person: PersonId, phase: Phase) -> Option<Entity> {
    let types: Vec<(BusinessKind, f64)> = world
        .config
        .routine
        .errand_types(phase)
        .iter()
        .filter(|(kind, _)| RoutineConfig::PATRONIZED.contains(kind))
        .map(|(kind, weight)| (*kind, *weight))
        .collect();
    let kind = weighted_choice(rng, &types)?;
    patronized(world, person, kind).map(Entity::Business)
}

fn visit(world: &World, rng: &mut dyn RngCore, person: PersonId) -> Option<Entity> {
    let routine = &world.config.routine;
    let p = world.person(person);
    let home = p.home?;
    let home_of = |q: &PersonId| {
        let other = world.person(*q);
        other
            .is_present()
            .then_some(other.home)
            .flatten()
            .filter(|h| *h != home)
    };
    let kind = weighted_choice(
        rng,
        &[
            (Visit::Neighbor, routine.visit_neighbor_weight),
            (Visit::Relative, routine.visit_relative_weight),
            (Visit::Friend, routine.visit_friend_weight),
        ],
    )?;
    let candidates: Vec<BuildingId> = match kind {
        Visit::Neighbor => {
            let lot = world.town.lot(world.building_lot(home));
            lot.neighbors
                .iter()
                .filter_map(|l| world.town.lot(*l).building)
                .filter(|b| world.dwellings.get(b).is_some_and(|d| !d.is_vacant()))
                .collect()
        }
        Visit::Relative => p.extended_family().iter().filter_map(home_of).collect(),
        Visit::Friend => p.friends.iter().filter_map(home_of).collect(),
    };
    candidates.choose(rng).copied().map(Entity::Dwelling)
}

/// Where an adult or working-age person spends a half-day.
fn whereabouts(world: &World, rng: &mut dyn RngCore, person: PersonId, phase: Phase) -> Option<Entity> {
    let routine = &world.config.routine;
    let p = world.person(person);
    let home = p.home.map(Entity::Dwelling);

    // 1. Work
    if let Some(occupation) = p.occupation.map(|o| world.occupation(o)) {
        if on_shift(occupation.shift, phase)
            && !chance(rng, routine.chance_someone_calls_in_sick)
            && !chance(rng, routine.chance_someone_takes_day_off)
        {
            return Some(Entity::Business(occupation.company));
        }
    }

    // 2. Out and about
    if home.is_none() || chance(rng, routine.chance_leaves_home(phase)) {
        let errand_first = weighted_choice(
            rng,
            &[(true, routine.errand_weight), (false, routine.visit_weight)],
        )
        .unwrap_or(true);
        let outing = if errand_first {
            errand(world, rng, person, phase)
        } else {
            visit(world, rng, person)
        };
        if outing.is_some() {
            return outing;
        }
    }
    home
}

/// Place every resident for one half-day and group them by location.
pub fn enact_routines(world: &World, rng: &mut dyn RngCore, when: SimTimestamp) -> Occasion {
    let phase = when.phase();
    let working_age = world.config.economy.age_people_start_working;
    let accompany = world.config.routine.chance_child_accompanies_adult;
    let now = world.now();
    let mut placed: BTreeMap<PersonId, Entity> = BTreeMap::new();

    // 1. Adults
    let (children, adults): (Vec<PersonId>, Vec<PersonId>) = world
        .residents
        .iter()
        .copied()
        .partition(|p| world.person(*p).age(now) < working_age);
    for person in adults {
        if let Some(place) = whereabouts(world, rng, person, phase) {
            placed.insert(person, place);
        }
    }

    // 2. Children stay home or tag along with someone from their household
    for child in children {
        let home = world.person(child).home.map(Entity::Dwelling);
        let escorts: Vec<Entity> = world
            .household_of(child)
            .iter()
            .filter_map(|p| placed.get(p).copied())
            .filter(|place| Some(*place) != home && matches!(place, Entity::Business(_)))
            .collect();
        let place = if !escorts.is_empty() && chance(rng, accompany) {
            escorts.choose(rng).copied()
        } else {
            home
        };
        if let Some(place) = place {
            placed.insert(child, place);
        }
    }

    let mut groups: BTreeMap<Entity, Vec<PersonId>> = BTreeMap::new();
    for (person, place) in placed {
        groups.entry(place).or_default().push(person);
    }
    Occasion { when, groups }
}

/// Decides each half-day's whereabouts. At low fidelity it only samples a
/// few social occasions a year and records nothing.
pub struct RoutineSystem;

impl SimSystem for RoutineSystem {
    fn name(&self) -> &str {
        "routine"
    }

    fn runs_at(&self, _fidelity: Fidelity) -> bool {
        true
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        match ctx.fidelity {
            Fidelity::High => {
                let when = ctx.world.current_time;
                let occasion = enact_routines(ctx.world, ctx.rng, when);
                for (place, people) in &occasion.groups {
                    for person in people {
                        let p = ctx.world.person_mut(*person);
                        p.location = Some(*place);
                        p.whereabouts.insert(when, *place);
                    }
                }
                ctx.occasions.push(occasion);
            }
            Fidelity::Low => {
                let year = ctx.world.current_time.year();
                for _ in 0..ctx.world.config.time.social_occasions_per_year {
                    let day = ctx.rng.random_range(1..=DAYS_PER_YEAR);
                    let phase = if ctx.rng.random_bool(0.5) { Phase::Day } else { Phase::Night };
                    let when = SimTimestamp::new(year, day, phase);
                    let occasion = enact_routines(ctx.world, ctx.rng, when);
                    ctx.occasions.push(occasion);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::corpora::Corpora;
    use crate::sim::{housing, population};
    use crate::worldgen::plat_town;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::sync::Arc;

    #[test]
    fn shifts_match_phases() {
        assert!(on_shift(Shift::Day, Phase::Day));
        assert!(on_shift(Shift::Night, Phase::Night));
        assert!(!on_shift(Shift::Day, Phase::Night));
    }

    #[test]
    fn visits_go_to_a_friend_at_home() {
        let mut config = Config::default();
        config.routine.visit_neighbor_weight = 0.0;
        config.routine.visit_relative_weight = 0.0;
        let config = Arc::new(config);
        let corpora = Arc::new(Corpora::builtin());
        let mut rng = SmallRng::seed_from_u64(17);
        let mut world = World::new(config.clone(), corpora.clone());
        world.town = plat_town(&config.world_gen, &corpora, &mut rng);
        let a = population::person_ex_nihilo(&mut world, &mut rng, None, 35);
        let b = population::person_ex_nihilo(&mut world, &mut rng, None, 35);
        housing::arrive(&mut world, &[a, b]);
        housing::secure_home(&mut world, &mut rng, &[a], &[a]).expect("vacant lots");
        let friends_home = housing::secure_home(&mut world, &mut rng, &[b], &[b]).expect("vacant lots");
        assert_eq!(visit(&world, &mut rng, a), None);

        world.person_mut(a).friends.insert(b);

        assert_eq!(visit(&world, &mut rng, a), Some(Entity::Dwelling(friends_home)));
    }
}
