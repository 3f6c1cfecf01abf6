//! Founding businesses, siting them on lots, and paying for services.

use rand::RngCore;
use tracing::{debug, info, warn};

use super::hiring::{self, Ending, Position};
use super::housing;
use super::population;
use super::random::chance;
use crate::config::Service;
use crate::id::{BuildingId, LotId, PersonId};
use crate::model::{
    Business, BusinessKind, DistanceTable, DwellingKind, DwellingPlace, Entity, EventKind,
    LotKind, OccupationKind, Shift, World,
};

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

pub fn pay(world: &mut World, payer: PersonId, payee: PersonId, amount: i64) {
    if payer == payee || amount == 0 {
        return;
    }
    world.person_mut(payer).money -= amount;
    world.person_mut(payee).money += amount;
}

/// Pay each practitioner their compensation for a service, plus the owner
/// of each firm involved once.
pub fn pay_for_service(
    world: &mut World,
    client: PersonId,
    service: Service,
    practitioners: &[PersonId],
) {
    let mut firms = Vec::new();
    for &practitioner in practitioners {
        let Some(occupation) = world.person(practitioner).occupation else {
            continue;
        };
        let (kind, company) = {
            let o = world.occupation(occupation);
            (o.kind, o.company)
        };
        let fee = world.config.economy.compensation(service, kind);
        pay(world, client, practitioner, fee);
        if !firms.contains(&company) {
            firms.push(company);
        }
    }
    for company in firms {
        let owner = world
            .business(company)
            .owner
            .map(|o| world.occupation(o).person);
        if let Some(owner) = owner {
            let fee = world
                .config
                .economy
                .compensation(service, OccupationKind::Owner);
            pay(world, client, owner, fee);
        }
    }
}

// ---------------------------------------------------------------------------
// Siting
// ---------------------------------------------------------------------------

fn area_population(world: &World, lots: impl IntoIterator<Item = LotId>) -> f64 {
    lots.into_iter().map(|l| world.lot_population(l)).sum::<usize>() as f64
}

fn hops(distance: u32) -> f64 {
    if distance == DistanceTable::UNREACHABLE {
        f64::from(u16::MAX)
    } else {
        f64::from(distance)
    }
}

/// Desirability of a vacant lot for a new business of `kind`.
pub fn siting_score(world: &World, kind: BusinessKind, lot: LotId) -> f64 {
    let economy = &world.config.economy;
    let town = &world.town;
    let secondary = area_population(world, town.secondary_lots(lot));
    let tertiary = area_population(world, town.tertiary_lots(lot));
    let mut score = economy.secondary_population_weight * secondary.sqrt()
        + economy.tertiary_population_weight * tertiary.sqrt();
    for rival in world.businesses_of_kind(kind) {
        score -= economy.same_kind_proximity_penalty / (hops(town.lot_distance(lot, rival.lot)) + 1.0);
    }
    if let Some(downtown) = town.downtown {
        score -= economy.distance_from_downtown_penalty * hops(town.lot_distance(lot, downtown));
    }
    score
}

/// Best vacant lot for a business, or `None` when the town is full.
/// Parks and cemeteries take a tract when one is free.
pub fn site_business(world: &World, kind: BusinessKind) -> Option<LotId> {
    let best = |lot_kind| {
        world
            .town
            .vacant_lots(lot_kind)
            .map(|l| (l, siting_score(world, kind, l)))
            .fold(None, |best: Option<(LotId, f64)>, (l, s)| match best {
                Some((_, b)) if b >= s => best,
                _ => Some((l, s)),
            })
            .map(|(l, _)| l)
    };
    if kind.prefers_tract() {
        best(LotKind::Tract).or_else(|| best(LotKind::Parcel))
    } else {
        best(LotKind::Parcel)
    }
}

// ---------------------------------------------------------------------------
// Founding
// ---------------------------------------------------------------------------

fn business_name(world: &World, rng: &mut dyn RngCore, kind: BusinessKind, owner: Option<PersonId>) -> String {
    match (kind, owner) {
        (BusinessKind::Restaurant, _) => world.corpora.restaurant_name(rng),
        (BusinessKind::Bar, _) => world.corpora.bar_name(rng),
        (_, Some(owner)) => format!("{}'s {}", world.person(owner).last_name, kind.display_name()),
        (_, None) => format!("{} {}", world.town.name, kind.display_name()),
    }
}

/// Found a business of `kind`. Public institutions have no owner; owned
/// businesses are founded by `founder`, or by an immigrant entrepreneur when
/// none is given. Returns `None` when no lot is free.
pub fn found_business(
    world: &mut World,
    rng: &mut dyn RngCore,
    kind: BusinessKind,
    founder: Option<PersonId>,
) -> Option<BuildingId> {
    // 1. Site
    let Some(lot) = site_business(world, kind) else {
        warn!(kind = %kind, "no vacant lot for a new business");
        return None;
    };

    // 2. Owner, arriving from outside if need be
    let mut immigrants = Vec::new();
    let owner = if kind.is_public() {
        None
    } else if let Some(founder) = founder {
        Some(founder)
    } else {
        let level = world.config.economy.job_level(OccupationKind::Owner);
        immigrants = population::immigrant_household(world, rng, level);
        housing::arrive(world, &immigrants);
        Some(immigrants[0])
    };

    // 3. Construction; the first construction firm builds itself
    let id = BuildingId(world.id_gen.next_id());
    let bootstrapping = kind == BusinessKind::ConstructionFirm
        && world.businesses_of_kind(BusinessKind::ConstructionFirm).next().is_none();
    let architect = if bootstrapping {
        None
    } else {
        let architect = hiring::contract(world, rng, owner, OccupationKind::Architect);
        if architect.is_none() {
            warn!(kind = %kind, "no architect in town; building without one");
        }
        architect
    };
    let builders = architect
        .and_then(|a| world.workplace_of(a))
        .map(|firm| hiring::employees_as(world, firm, OccupationKind::ConstructionWorker))
        .unwrap_or_default();

    let name = business_name(world, rng, kind, owner);
    let now = world.now();
    let address = world.town.address_of(lot);
    world.businesses.insert(
        id,
        Business {
            id,
            kind,
            name: name.clone(),
            lot,
            address,
            founded: now,
            closed: None,
            founder: owner,
            owner: None,
            employees: Default::default(),
            former_employees: Default::default(),
            open_positions: Vec::new(),
            units: Vec::new(),
            plots: Default::default(),
            construction: None,
        },
    );
    world.town.lot_mut(lot).building = Some(id);
    let event = world.add_event(
        EventKind::BuildingConstruction {
            client: owner,
            architect,
            builders: builders.clone(),
            lot,
            building: id,
            business_kind: kind,
        },
        Some(Entity::Business(id)),
        format!("{name} was built at {}", world.town.address_of(lot)),
        None,
    );
    world.business_mut(id).construction = Some(event);
    if let Some(owner) = owner {
        let cost = world.config.economy.business_startup_cost;
        world.person_mut(owner).money -= cost;
        let mut team: Vec<PersonId> = architect.into_iter().collect();
        team.extend(&builders);
        pay_for_service(world, owner, Service::BuildingConstruction, &team);
    }

    // 4. Apartment units
    if kind == BusinessKind::ApartmentComplex {
        let units = world.config.housing.units_per_apartment_complex;
        let address = world.business(id).address.clone();
        for unit in 1..=units {
            let apartment = BuildingId(world.id_gen.next_id());
            world.dwellings.insert(
                apartment,
                DwellingPlace {
                    id: apartment,
                    kind: DwellingKind::Apartment { complex: id, unit },
                    lot,
                    address: format!("{address} (Unit #{unit})"),
                    owners: Default::default(),
                    former_owners: Default::default(),
                    residents: Default::default(),
                    former_residents: Default::default(),
                    construction: Some(event),
                    transactions: Vec::new(),
                },
            );
            world.business_mut(id).units.push(apartment);
        }
    }

    info!(business = %id, kind = %kind, name = %name, "business founded");

    // 5. Owner takes the helm; their old job is refilled
    if let Some(owner) = owner {
        let owner_position = Position {
            company: id,
            kind: OccupationKind::Owner,
            shift: Shift::Day,
        };
        let (occupation, vacated) = hiring::hire(world, owner, owner_position, Some(event));
        if let Some(vacated) = vacated {
            hiring::fill_position(world, rng, vacated, Some(event));
        }
        if !immigrants.is_empty() && housing::secure_home(world, rng, &immigrants, &immigrants).is_none() {
            hiring::end_occupation(world, occupation, Ending::Exit, Some(event));
            housing::depart(world, &immigrants);
            world
                .business_mut(id)
                .open_positions
                .push((OccupationKind::Owner, Shift::Day));
        }
    }

    // 6. Staff
    let vacancies = world.config.economy.vacancies(kind).to_vec();
    for vacancy in vacancies {
        let position = Position {
            company: id,
            kind: vacancy.occupation,
            shift: vacancy.shift,
        };
        hiring::fill_position(world, rng, position, Some(event));
    }
    Some(id)
}

// ---------------------------------------------------------------------------
// Demand
// ---------------------------------------------------------------------------

/// The richest resident who can afford a business and owns none yet.
fn entrepreneur(world: &World) -> Option<PersonId> {
    let cost = world.config.economy.business_startup_cost;
    let now = world.now();
    world
        .residents
        .iter()
        .map(|p| world.person(*p))
        .filter(|p| p.is_adult(now) && !p.retired && p.money >= cost)
        .filter(|p| {
            p.occupation
                .is_none_or(|o| world.occupation(o).kind != OccupationKind::Owner)
        })
        .max_by_key(|p| (p.money, std::cmp::Reverse(p.id)))
        .map(|p| p.id)
}

/// Yearly: found businesses the population can support.
pub fn meet_demand(world: &mut World, rng: &mut dyn RngCore) {
    let demand = world.config.economy.business_demand.clone();
    for (kind, d) in demand {
        let population = world.residents.len();
        if population < d.min_population || d.residents_per_business == 0 {
            continue;
        }
        let existing = world.businesses_of_kind(kind).count();
        if existing >= population / d.residents_per_business || !chance(rng, d.chance_per_year) {
            continue;
        }
        let founder = if kind.is_public() { None } else { entrepreneur(world) };
        debug!(kind = %kind, population, existing, "demand for a new business");
        found_business(world, rng, kind, founder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::corpora::Corpora;
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
    fn pay_moves_money() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut world = world(&mut rng);
        let a = population::person_ex_nihilo(&mut world, &mut rng, None, 40);
        let b = population::person_ex_nihilo(&mut world, &mut rng, None, 40);
        let (ma, mb) = (world.person(a).money, world.person(b).money);
        pay(&mut world, a, b, 250);
        assert_eq!(world.person(a).money, ma - 250);
        assert_eq!(world.person(b).money, mb + 250);
    }

    #[test]
    fn public_institutions_have_no_owner_and_a_town_name() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut world = world(&mut rng);
        let hall = found_business(&mut world, &mut rng, BusinessKind::CityHall, None)
            .expect("a fresh town has vacant lots");
        let hall = world.business(hall);
        assert!(hall.founder.is_none());
        assert!(hall.name.ends_with("City Hall"));
        assert!(
            world.town.lot(hall.lot).building == Some(hall.id),
            "the lot points back at its building"
        );
    }

    #[test]
    fn parks_take_tracts() {
        let mut rng = SmallRng::seed_from_u64(8);
        let world = world(&mut rng);
        if world.town.vacant_lots(LotKind::Tract).next().is_some() {
            let lot = site_business(&world, BusinessKind::Park).expect("a tract is free");
            assert_eq!(world.town.lot(lot).kind, LotKind::Tract);
        }
    }

    #[test]
    fn apartment_complexes_create_units() {
        let mut rng = SmallRng::seed_from_u64(13);
        let mut world = world(&mut rng);
        let founder = population::person_ex_nihilo(&mut world, &mut rng, None, 45);
        housing::arrive(&mut world, &[founder]);
        world.person_mut(founder).money = 100_000;
        let complex = found_business(&mut world, &mut rng, BusinessKind::ApartmentComplex, Some(founder))
            .expect("a fresh town has vacant lots");
        let units = world.config.housing.units_per_apartment_complex as usize;
        assert_eq!(world.business(complex).units.len(), units);
        assert!(world.business(complex).name.ends_with("'s Apartment Complex"));
        let complex_address = world.business(complex).address.clone();
        for (n, unit) in world.business(complex).units.iter().enumerate() {
            assert_eq!(world.dwelling(*unit).address, format!("{complex_address} (Unit #{})", n + 1));
        }
    }
}
