//! Choosing, building and buying homes; arriving in and leaving town.

use std::collections::BTreeSet;

use rand::RngCore;
use tracing::{debug, warn};

use super::business::pay_for_service;
use super::hiring::{self, Ending, Position};
use super::kinship;
use super::random::select_top_three;
use crate::config::Service;
use crate::id::{BuildingId, EventId, LotId, PersonId};
use crate::model::{DistanceTable, DwellingKind, DwellingPlace, Entity, EventKind, LotKind, World};

/// Somewhere a household could live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Venue {
    Home(BuildingId),
    /// A vacant lot a house would have to be built on.
    Lot(LotId),
}

fn pull(distance: u32) -> f64 {
    if distance == DistanceTable::UNREACHABLE {
        0.0
    } else {
        1.0 / (f64::from(distance) + 1.0)
    }
}

/// How much one decider wants to live on `lot`, given who lives where.
fn appeal(world: &World, decider: PersonId, movers: &[PersonId], lot: LotId) -> f64 {
    let housing = &world.config.housing;
    let town = &world.town;
    let person = world.person(decider);
    let lot_of = |p: PersonId| world.person(p).home.map(|h| world.building_lot(h));
    let mut score = 0.0;

    // Relatives
    let desire = housing.desire_to_live_near_family(
        person.personality.conscientiousness,
        person.personality.openness,
    );
    for relative in person.extended_family() {
        if movers.contains(&relative) || !world.person(relative).is_present() {
            continue;
        }
        let (Some(kin), Some(home)) = (kinship::kin_label(person, relative), lot_of(relative)) else {
            continue;
        };
        score += desire * housing.pull(kin) * pull(town.lot_distance(lot, home));
    }

    // Friends
    for friend in &person.friends {
        if movers.contains(friend) || !world.person(*friend).is_present() {
            continue;
        }
        if let Some(home) = lot_of(*friend) {
            score += housing.pull_to_live_near_a_friend * pull(town.lot_distance(lot, home));
        }
    }

    // Work
    if let Some(workplace) = world.workplace_of(decider) {
        let work = world.building_lot(workplace);
        score += housing.pull_to_live_near_workplace * pull(town.lot_distance(lot, work));
    }
    score
}

/// Every vacant home and buildable lot, scored for a household. Partners'
/// scores are summed; lots carry the penalty for having to build.
pub fn score_venues(world: &World, movers: &[PersonId], deciders: &[PersonId]) -> Vec<(Venue, f64)> {
    let penalty = world
        .config
        .housing
        .penalty_for_having_to_build_a_home_vs_buying_one;
    let score = |lot: LotId| -> f64 { deciders.iter().map(|d| appeal(world, *d, movers, lot)).sum() };
    let homes = world
        .vacant_homes()
        .into_iter()
        .map(|h| (Venue::Home(h), score(world.dwelling(h).lot)));
    let lots = world
        .town
        .vacant_lots(LotKind::Parcel)
        .map(|l| (Venue::Lot(l), score(l) * penalty));
    homes.chain(lots).collect()
}

/// Find a home for `movers`, chosen by `deciders`, and move them in.
/// Returns `None` when no home or lot is left.
pub fn secure_home(
    world: &mut World,
    rng: &mut dyn RngCore,
    movers: &[PersonId],
    deciders: &[PersonId],
) -> Option<BuildingId> {
    let venues = score_venues(world, movers, deciders);
    let (home, cause) = match select_top_three(rng, venues)? {
        Venue::Home(home) => (home, purchase_home(world, rng, deciders, home)),
        Venue::Lot(lot) => build_house(world, rng, deciders, lot),
    };
    move_in(world, movers, home, Some(cause));
    Some(home)
}

/// Secure a home, or leave town when none can be had. Positions the
/// leavers vacate are refilled.
pub fn relocate(world: &mut World, rng: &mut dyn RngCore, movers: &[PersonId], deciders: &[PersonId]) {
    if secure_home(world, rng, movers, deciders).is_some() {
        return;
    }
    for position in depart(world, movers) {
        hiring::fill_position(world, rng, position, None);
    }
}

fn build_house(world: &mut World, rng: &mut dyn RngCore, clients: &[PersonId], lot: LotId) -> (BuildingId, EventId) {
    let architect = hiring::contract(world, rng, clients.first().copied(), crate::model::OccupationKind::Architect);
    if architect.is_none() {
        warn!(lot = %lot, "no architect in town; building a house without one");
    }
    let builders = architect
        .and_then(|a| world.workplace_of(a))
        .map(|firm| hiring::employees_as(world, firm, crate::model::OccupationKind::ConstructionWorker))
        .unwrap_or_default();

    let house = BuildingId(world.id_gen.next_id());
    let address = world.town.address_of(lot);
    world.dwellings.insert(
        house,
        DwellingPlace {
            id: house,
            kind: DwellingKind::House,
            lot,
            address: address.clone(),
            owners: clients.iter().copied().collect(),
            former_owners: BTreeSet::new(),
            residents: BTreeSet::new(),
            former_residents: BTreeSet::new(),
            construction: None,
            transactions: Vec::new(),
        },
    );
    world.town.lot_mut(lot).building = Some(house);
    let event = world.add_event(
        EventKind::HouseConstruction {
            clients: clients.to_vec(),
            architect,
            builders: builders.clone(),
            lot,
            house,
        },
        Some(Entity::Dwelling(house)),
        format!("A house was built at {address}"),
        None,
    );
    world.dwelling_mut(house).construction = Some(event);
    if let Some(&payer) = clients.first() {
        let mut team: Vec<PersonId> = architect.into_iter().collect();
        team.extend(builders);
        pay_for_service(world, payer, Service::HouseConstruction, &team);
    }
    (house, event)
}

fn purchase_home(world: &mut World, rng: &mut dyn RngCore, buyers: &[PersonId], home: BuildingId) -> EventId {
    let realtor = hiring::contract(world, rng, buyers.first().copied(), crate::model::OccupationKind::Realtor);
    let event = world.add_event(
        EventKind::HomePurchase {
            buyers: buyers.to_vec(),
            home,
            realtor,
        },
        Some(Entity::Dwelling(home)),
        format!("A home changed hands at {}", world.dwelling(home).address),
        None,
    );
    {
        let dwelling = world.dwelling_mut(home);
        let sellers = std::mem::take(&mut dwelling.owners);
        dwelling.former_owners.extend(sellers);
        dwelling.owners = buyers.iter().copied().collect();
        dwelling.transactions.push(event);
    }
    if let (Some(&payer), Some(realtor)) = (buyers.first(), realtor) {
        pay_for_service(world, payer, Service::HomePurchase, &[realtor]);
    }
    event
}

/// Move people into a home, out of wherever they lived before.
pub fn move_in(world: &mut World, movers: &[PersonId], home: BuildingId, caused_by: Option<EventId>) -> EventId {
    let from = movers.first().and_then(|p| world.person(*p).home);
    for &mover in movers {
        if let Some(old) = world.person(mover).home {
            let dwelling = world.dwelling_mut(old);
            dwelling.residents.remove(&mover);
            dwelling.former_residents.insert(mover);
        }
        world.person_mut(mover).home = Some(home);
        world.dwelling_mut(home).residents.insert(mover);
    }
    let description = format!(
        "{} moved to {}",
        movers
            .iter()
            .map(|p| world.person(*p).name())
            .collect::<Vec<_>>()
            .join(", "),
        world.dwelling(home).address
    );
    debug!(home = %home, movers = movers.len(), "moved");
    world.add_event(
        EventKind::Move {
            movers: movers.to_vec(),
            from,
            to: home,
        },
        Some(Entity::Dwelling(home)),
        description,
        caused_by,
    )
}

/// Bring people into town without a home yet.
pub fn arrive(world: &mut World, people: &[PersonId]) {
    for &person in people {
        world.person_mut(person).in_town = true;
        world.departed.remove(&person);
        world.residents.insert(person);
    }
}

/// People leave town for good. Returns the positions they leave open so the
/// caller can decide whether to refill them.
pub fn depart(world: &mut World, people: &[PersonId]) -> Vec<Position> {
    if people.is_empty() {
        return Vec::new();
    }
    let description = format!(
        "{} left town",
        people
            .iter()
            .map(|p| world.person(*p).name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    let event = world.add_event(
        EventKind::Departure {
            subjects: people.to_vec(),
        },
        None,
        description,
        None,
    );
    let mut vacated = Vec::new();
    for &person in people {
        if let Some(home) = world.person(person).home {
            let dwelling = world.dwelling_mut(home);
            dwelling.residents.remove(&person);
            dwelling.former_residents.insert(person);
        }
        if let Some(occupation) = world.person(person).occupation {
            vacated.push(hiring::end_occupation(world, occupation, Ending::Exit, Some(event)));
        }
        let p = world.person_mut(person);
        p.home = None;
        p.in_town = false;
        p.location = None;
        world.residents.remove(&person);
        world.departed.insert(person);
        debug!(person = %person, "departed");
    }
    vacated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::corpora::Corpora;
    use crate::sim::population;
    use crate::worldgen::plat_town;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::sync::Arc;

    fn world(rng: &mut SmallRng) -> World {
        let config = Arc::new(Config::default());
        let corpora = Arc::new(Corpora::builtin());
        let mut world = World::new(config.clone(), corpora.clone());
        world.town = plat_town(&config.world_gen, &corpora, rng);
        world
    }

    #[test]
    fn newcomers_build_on_a_vacant_lot() {
        let mut rng = SmallRng::seed_from_u64(21);
        let mut world = world(&mut rng);
        let person = population::person_ex_nihilo(&mut world, &mut rng, None, 35);
        arrive(&mut world, &[person]);
        let home = secure_home(&mut world, &mut rng, &[person], &[person]).expect("the town is empty");
        assert_eq!(world.person(person).home, Some(home));
        assert!(world.dwelling(home).residents.contains(&person));
        assert!(world.dwelling(home).owners.contains(&person));
    }

    #[test]
    fn departing_clears_home_and_residency() {
        let mut rng = SmallRng::seed_from_u64(22);
        let mut world = world(&mut rng);
        let person = population::person_ex_nihilo(&mut world, &mut rng, None, 35);
        arrive(&mut world, &[person]);
        let home = secure_home(&mut world, &mut rng, &[person], &[person]).expect("the town is empty");
        let vacated = depart(&mut world, &[person]);
        assert!(vacated.is_empty());
        assert!(world.person(person).home.is_none());
        assert!(!world.residents.contains(&person));
        assert!(world.departed.contains(&person));
        assert!(world.dwelling(home).is_vacant());
        assert!(world.dwelling(home).former_residents.contains(&person));
    }

    #[test]
    fn a_full_town_turns_people_away() {
        let mut rng = SmallRng::seed_from_u64(23);
        let mut world = world(&mut rng);
        let lots: Vec<LotId> = world.town.lots.iter().map(|l| l.id).collect();
        for lot in lots {
            world.town.lot_mut(lot).building = Some(BuildingId(0));
        }
        let person = population::person_ex_nihilo(&mut world, &mut rng, None, 35);
        arrive(&mut world, &[person]);
        assert!(score_venues(&world, &[person], &[person]).is_empty());
        relocate(&mut world, &mut rng, &[person], &[person]);
        assert!(world.departed.contains(&person));
    }
}
