//! Filling positions, hiring chains, and contracting practitioners.

use std::collections::VecDeque;

use rand::RngCore;
use tracing::{debug, warn};

use super::housing;
use super::population;
use super::random::select_top_three;
use super::relationships;
use crate::id::{BuildingId, EventId, OccupationId, PersonId};
use crate::model::{
    Entity, EventKind, Occupation, OccupationKind, Prerequisite, Shift, World,
};

/// A position at a company: what the vacancy tables and hiring chains pass
/// around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub company: BuildingId,
    pub kind: OccupationKind,
    pub shift: Shift,
}

/// Why an occupation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// Left for another job, or was let go.
    Termination,
    Retirement,
    /// Died or left town; the life event already records it.
    Exit,
}

// ---------------------------------------------------------------------------
// Qualification and scoring
// ---------------------------------------------------------------------------

fn has_industry_experience(world: &World, person: PersonId, industry: crate::model::Industry) -> bool {
    world
        .person(person)
        .occupations
        .iter()
        .any(|o| world.occupation(*o).industry == industry)
}

/// Whether a resident may be hired into a position.
pub fn qualifies(world: &World, person: PersonId, position: &Position) -> bool {
    let now = world.now();
    let economy = &world.config.economy;
    let p = world.person(person);
    if !p.is_present()
        || p.retired
        || p.in_college
        || p.age(now) < economy.age_people_start_working
    {
        return false;
    }
    let target_level = economy.job_level(position.kind);
    match p.occupation.map(|o| world.occupation(o)) {
        Some(current) => {
            if current.level >= target_level {
                return false;
            }
            if target_level > 1 && current.years_experience(now) < 1 {
                return false;
            }
        }
        None if target_level > 1 => return false,
        None => {}
    }
    match economy.prerequisite(position.kind) {
        None => true,
        Some(Prerequisite::CollegeGraduate) => p.college_graduate,
        Some(Prerequisite::SameIndustry) => {
            let industry = world.business(position.company).kind.industry();
            has_industry_experience(world, person, industry)
        }
        Some(Prerequisite::Industry(industry)) => has_industry_experience(world, person, industry),
    }
}

/// How much the hiring company favors a candidate.
pub fn hiring_score(world: &World, person: PersonId, position: &Position) -> f64 {
    let economy = &world.config.economy;
    let business = world.business(position.company);
    let p = world.person(person);
    let mut score = 1.0;

    let current = p.occupation.map(|o| world.occupation(o));
    if current.is_some_and(|o| o.company == position.company) {
        score += economy.preference_to_hire_from_within_company;
    }
    if let Some(owner) = business.owner.map(|o| world.occupation(o).person) {
        let owner = world.person(owner);
        if owner.immediate_family().contains(&person) {
            score += economy.preference_to_hire_immediate_family;
        } else if owner.is_extended_family(person) {
            score += economy.preference_to_hire_extended_family;
        }
        if owner.friends.contains(&person) {
            score += economy.preference_to_hire_friend;
        } else if owner.enemies.contains(&person) {
            score -= economy.dispreference_to_hire_enemy;
        } else if owner.relationships.contains_key(&person) {
            score += economy.preference_to_hire_known_person;
        }
    }
    let level = current.map_or(economy.unemployment_occupation_level, |o| f64::from(o.level));
    score.max(0.0) * level
}

pub fn candidates(world: &World, position: &Position) -> Vec<(PersonId, f64)> {
    world
        .residents
        .iter()
        .copied()
        .filter(|p| qualifies(world, *p, position))
        .map(|p| (p, hiring_score(world, p, position)))
        .collect()
}

// ---------------------------------------------------------------------------
// Hiring and termination
// ---------------------------------------------------------------------------

/// Start a new occupation. The previous occupation ends only after the new
/// one is set, so the person cannot be rehired into the position they just
/// vacated. Returns the new occupation and the vacated position.
pub fn hire(
    world: &mut World,
    person: PersonId,
    position: Position,
    caused_by: Option<EventId>,
) -> (OccupationId, Option<Position>) {
    let now = world.now();
    let economy = &world.config.economy;
    let level = economy.job_level(position.kind);
    let industry = economy.industry(position.kind);
    let previous = world.person(person).occupation;
    let promotion = previous.is_some_and(|o| world.occupation(o).company == position.company);

    let id = OccupationId(world.id_gen.next_id());
    world.occupations.insert(
        id,
        Occupation {
            id,
            kind: position.kind,
            person,
            company: position.company,
            shift: position.shift,
            level,
            industry,
            start: now,
            end: None,
            hiring: None,
            terminus: None,
        },
    );
    let description = format!(
        "{} was hired as a {} at {}",
        world.person(person).name(),
        position.kind.title(),
        world.business(position.company).name
    );
    let event = world.add_event(
        EventKind::Hiring {
            subject: person,
            company: position.company,
            occupation: id,
            position: position.kind,
            promotion,
        },
        Some(Entity::Business(position.company)),
        description,
        caused_by,
    );
    world.occupation_mut(id).hiring = Some(event);
    {
        let p = world.person_mut(person);
        p.occupation = Some(id);
        p.occupations.push(id);
    }
    {
        let business = world.business_mut(position.company);
        business.employees.insert(id);
        if position.kind == OccupationKind::Owner {
            business.owner = Some(id);
        }
    }
    debug!(
        person = %person,
        company = %position.company,
        position = %position.kind,
        promotion,
        "hired"
    );

    let vacated = previous.map(|old| end_occupation(world, old, Ending::Termination, Some(event)));
    relationships::refresh_coworker_salience(world, person);
    (id, vacated)
}

/// End an occupation and report the position it leaves open.
pub fn end_occupation(
    world: &mut World,
    occupation: OccupationId,
    ending: Ending,
    caused_by: Option<EventId>,
) -> Position {
    let now = world.now();
    let (person, position) = {
        let o = world.occupation_mut(occupation);
        o.end = Some(now);
        (
            o.person,
            Position {
                company: o.company,
                kind: o.kind,
                shift: o.shift,
            },
        )
    };
    {
        let business = world.business_mut(position.company);
        business.employees.remove(&occupation);
        business.former_employees.insert(occupation);
        if business.owner == Some(occupation) {
            business.owner = None;
        }
    }
    {
        let p = world.person_mut(person);
        if p.occupation == Some(occupation) {
            p.occupation = None;
        }
        if ending == Ending::Retirement {
            p.retired = true;
        }
    }
    let name = world.person(person).name();
    let kind = match ending {
        Ending::Termination => Some((
            EventKind::Termination {
                subject: person,
                occupation,
            },
            format!("{name} left their job as a {}", position.kind.title()),
        )),
        Ending::Retirement => Some((
            EventKind::Retirement {
                subject: person,
                occupation,
            },
            format!("{name} retired as a {}", position.kind.title()),
        )),
        Ending::Exit => None,
    };
    if let Some((kind, description)) = kind {
        let event = world.add_event(
            kind,
            Some(Entity::Business(position.company)),
            description,
            caused_by,
        );
        world.occupation_mut(occupation).terminus = Some(event);
    }
    position
}

/// Fill a position and every position the chain of hirings vacates behind
/// it. Positions nobody can fill, even from outside, stay open on the
/// company.
pub fn fill_position(
    world: &mut World,
    rng: &mut dyn RngCore,
    position: Position,
    caused_by: Option<EventId>,
) {
    let mut queue = VecDeque::from([position]);
    while let Some(position) = queue.pop_front() {
        if !world.business(position.company).is_open() {
            continue;
        }
        let scored = candidates(world, &position);
        match select_top_three(rng, scored) {
            Some(person) => {
                let (_, vacated) = hire(world, person, position, caused_by);
                queue.extend(vacated);
            }
            None => hire_immigrant(world, rng, position, caused_by),
        }
    }
}

/// Bring in an outsider tuned to the position's level, with any family.
fn hire_immigrant(
    world: &mut World,
    rng: &mut dyn RngCore,
    position: Position,
    caused_by: Option<EventId>,
) {
    let level = world.config.economy.job_level(position.kind);
    let household = population::immigrant_household(world, rng, level);
    let immigrant = household[0];
    if world.config.economy.prerequisite(position.kind) == Some(Prerequisite::CollegeGraduate) {
        world.person_mut(immigrant).college_graduate = true;
    }
    housing::arrive(world, &household);
    let (occupation, _) = hire(world, immigrant, position, caused_by);
    if housing::secure_home(world, rng, &household, &household).is_none() {
        // The household left again; do not let its departure start a chain
        end_occupation(world, occupation, Ending::Exit, caused_by);
        housing::depart(world, &household);
        world
            .business_mut(position.company)
            .open_positions
            .push((position.kind, position.shift));
        warn!(
            company = %position.company,
            position = %position.kind,
            "position left open: no housing for an immigrant"
        );
    }
}

/// Retry every company's open positions.
pub fn fill_open_positions(world: &mut World, rng: &mut dyn RngCore) {
    let open: Vec<Position> = world
        .businesses
        .values_mut()
        .filter(|b| b.is_open())
        .flat_map(|b| {
            let company = b.id;
            std::mem::take(&mut b.open_positions)
                .into_iter()
                .map(move |(kind, shift)| Position {
                    company,
                    kind,
                    shift,
                })
        })
        .collect();
    for position in open {
        fill_position(world, rng, position, None);
    }
}

// ---------------------------------------------------------------------------
// Contracting
// ---------------------------------------------------------------------------

/// How much a client favors a practitioner. Without a client (the city
/// commissioning a public building) only experience counts.
pub fn contracting_score(
    world: &World,
    client: Option<PersonId>,
    practitioner: PersonId,
    kind: OccupationKind,
) -> f64 {
    let economy = &world.config.economy;
    let mut score = 1.0;
    if let Some(c) = client.map(|c| world.person(c)) {
        if c.immediate_family().contains(&practitioner) {
            score += economy.preference_to_contract_immediate_family;
        } else if c.is_extended_family(practitioner) {
            score += economy.preference_to_contract_extended_family;
        }
        if c.friends.contains(&practitioner) {
            score += economy.preference_to_contract_friend;
        } else if c.relationships.contains_key(&practitioner) {
            score += economy.preference_to_contract_known_person;
        }
        if c.former_contractors
            .get(&kind)
            .is_some_and(|s| s.contains(&practitioner))
        {
            score += economy.preference_to_contract_former_contract;
        }
    }
    let years = world
        .person(practitioner)
        .occupation
        .map_or(0, |o| world.occupation(o).years_experience(world.now()));
    score * economy.experience_bonus(years + 1)
}

/// Pick a practitioner of `kind` for a client, or `None` when nobody in
/// town practices it.
pub fn contract(
    world: &mut World,
    rng: &mut dyn RngCore,
    client: Option<PersonId>,
    kind: OccupationKind,
) -> Option<PersonId> {
    let scored: Vec<(PersonId, f64)> = world
        .occupations
        .values()
        .filter(|o| o.kind == kind && o.is_active() && Some(o.person) != client)
        .filter(|o| world.person(o.person).is_present())
        .map(|o| (o.person, contracting_score(world, client, o.person, kind)))
        .collect();
    let chosen = select_top_three(rng, scored)?;
    if let Some(client) = client {
        world
            .person_mut(client)
            .former_contractors
            .entry(kind)
            .or_default()
            .insert(chosen);
    }
    Some(chosen)
}

/// Employees of a company holding a given position.
pub fn employees_as(world: &World, company: BuildingId, kind: OccupationKind) -> Vec<PersonId> {
    world
        .business(company)
        .employees
        .iter()
        .map(|o| world.occupation(*o))
        .filter(|o| o.kind == kind)
        .map(|o| o.person)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::corpora::Corpora;
    use crate::model::BusinessKind;
    use crate::sim::business::found_business;
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

    fn adult(world: &mut World, rng: &mut SmallRng) -> PersonId {
        let person = population::person_ex_nihilo(world, rng, None, 35);
        housing::arrive(world, &[person]);
        person
    }

    #[test]
    fn unemployed_people_start_at_the_bottom() {
        let mut rng = SmallRng::seed_from_u64(21);
        let mut world = world(&mut rng);
        let hall = found_business(&mut world, &mut rng, BusinessKind::CityHall, None).expect("vacant lots");
        let person = adult(&mut world, &mut rng);

        let entry = Position { company: hall, kind: OccupationKind::Secretary, shift: Shift::Day };
        let senior = Position { company: hall, kind: OccupationKind::Manager, shift: Shift::Day };
        assert!(qualifies(&world, person, &entry));
        assert!(!qualifies(&world, person, &senior));
    }

    #[test]
    fn hiring_and_termination_keep_back_references() {
        let mut rng = SmallRng::seed_from_u64(22);
        let mut world = world(&mut rng);
        let hall = found_business(&mut world, &mut rng, BusinessKind::CityHall, None).expect("vacant lots");
        let person = adult(&mut world, &mut rng);
        let position = Position { company: hall, kind: OccupationKind::Secretary, shift: Shift::Day };

        let (occupation, vacated) = hire(&mut world, person, position, None);
        assert_eq!(vacated, None);
        assert_eq!(world.person(person).occupation, Some(occupation));
        assert!(world.business(hall).employees.contains(&occupation));
        assert!(world.occupation(occupation).hiring.is_some());

        let freed = end_occupation(&mut world, occupation, Ending::Termination, None);
        assert_eq!(freed, position);
        assert_eq!(world.person(person).occupation, None);
        assert!(!world.business(hall).employees.contains(&occupation));
        assert!(world.business(hall).former_employees.contains(&occupation));
        let terminus = world.occupation(occupation).terminus.expect("termination event");
        assert!(matches!(world.events[&terminus].kind, EventKind::Termination { .. }));
    }

    #[test]
    fn a_job_change_vacates_the_old_position() {
        let mut rng = SmallRng::seed_from_u64(23);
        let mut world = world(&mut rng);
        let hall = found_business(&mut world, &mut rng, BusinessKind::CityHall, None).expect("vacant lots");
        let person = adult(&mut world, &mut rng);
        let secretary = Position { company: hall, kind: OccupationKind::Secretary, shift: Shift::Day };
        let (first, _) = hire(&mut world, person, secretary, None);

        let groundskeeper = Position { company: hall, kind: OccupationKind::Groundskeeper, shift: Shift::Day };
        let (second, vacated) = hire(&mut world, person, groundskeeper, None);

        assert_eq!(vacated, Some(secretary));
        assert!(!world.occupation(first).is_active());
        assert_eq!(world.person(person).occupations, vec![first, second]);
    }
}
