//! Consistency checks run at the end of every step.
//!
//! A failure here means a bug in the simulation, not bad input; the runner
//! treats it as fatal.

use std::collections::{BTreeMap, VecDeque};

use crate::id::BlockId;
use crate::model::{Entity, EvidenceKind, Town, World};

use super::kinship;

/// Every per-step invariant over people, places, beliefs and the event log.
pub fn check_world(world: &World) -> Result<(), String> {
    check_people(world)?;
    check_dwellings(world)?;
    check_employment(world)?;
    check_facets(world)?;
    check_event_order(world)?;
    Ok(())
}

fn check_people(world: &World) -> Result<(), String> {
    for person in world.people.values() {
        kinship::check_symmetry(world, person)?;

        let filed = [&world.residents, &world.departed, &world.deceased]
            .iter()
            .filter(|set| set.contains(&person.id))
            .count();
        if filed > 1 {
            return Err(format!("{} is filed as more than one of resident, departed, deceased", person.id));
        }

        if let Some(spouse) = person.spouse {
            let other = world
                .people
                .get(&spouse)
                .ok_or_else(|| format!("{} is married to missing person {spouse}", person.id))?;
            if other.spouse != Some(person.id) {
                return Err(format!("{} is married to {spouse} but not vice versa", person.id));
            }
            if !person.is_alive() || !other.is_alive() {
                return Err(format!("{} and {spouse} are married but not both alive", person.id));
            }
        }

        if person.is_present() && person.home.is_some_and(|h| !world.dwellings.contains_key(&h)) {
            return Err(format!("{} lives in a dwelling that does not exist", person.id));
        }

        if let Some(occ) = person.occupation {
            let occupation = world
                .occupations
                .get(&occ)
                .ok_or_else(|| format!("{} holds missing occupation {occ}", person.id))?;
            if occupation.person != person.id {
                return Err(format!("occupation {occ} of {} points at {}", person.id, occupation.person));
            }
            if !occupation.is_active() {
                return Err(format!("{} still holds ended occupation {occ}", person.id));
            }
        }
    }
    Ok(())
}

fn check_dwellings(world: &World) -> Result<(), String> {
    for dwelling in world.dwellings.values() {
        for resident in &dwelling.residents {
            if world.person(*resident).home != Some(dwelling.id) {
                return Err(format!("{resident} is listed in {} but lives elsewhere", dwelling.id));
            }
        }
    }
    for person in world.people.values() {
        if let Some(home) = person.home {
            let listed = world.dwellings.get(&home).is_some_and(|d| d.residents.contains(&person.id));
            if !listed {
                return Err(format!("{} lives in {home} but is not among its residents", person.id));
            }
        }
    }
    Ok(())
}

fn check_employment(world: &World) -> Result<(), String> {
    for business in world.businesses.values() {
        for occ in &business.employees {
            let occupation = world
                .occupations
                .get(occ)
                .ok_or_else(|| format!("{} employs missing occupation {occ}", business.id))?;
            if occupation.company != business.id {
                return Err(format!("occupation {occ} is listed at {} but belongs to {}", business.id, occupation.company));
            }
            if world.person(occupation.person).occupation != Some(*occ) {
                return Err(format!(
                    "{} is employed at {} under {occ} but does not hold it",
                    occupation.person, business.id
                ));
            }
        }
    }
    Ok(())
}

fn subject_exists(world: &World, subject: Entity) -> bool {
    match subject {
        Entity::Person(id) => world.people.contains_key(&id),
        Entity::Dwelling(id) => world.dwellings.contains_key(&id),
        Entity::Business(id) => world.businesses.contains_key(&id),
    }
}

fn check_facets(world: &World) -> Result<(), String> {
    for facet in world.facets.values() {
        let Some(last) = facet.latest_evidence() else {
            return Err(format!("facet {} has no evidence", facet.id));
        };
        if !subject_exists(world, facet.subject) {
            return Err(format!("facet {} is about a subject that does not exist", facet.id));
        }
        if facet.is_forgotten() && !matches!(world.evidence_item(last).kind, EvidenceKind::Forgetting) {
            return Err(format!("facet {} is empty but was not forgotten", facet.id));
        }
        for evidence in &facet.evidence {
            let item = world
                .evidence
                .get(evidence)
                .ok_or_else(|| format!("facet {} cites missing evidence {evidence}", facet.id))?;
            if !item.beliefs_evidenced.contains(&facet.id) {
                return Err(format!("evidence {evidence} does not point back at facet {}", facet.id));
            }
        }
    }
    Ok(())
}

/// Events and evidence share one counter; in id order their numbers must
/// strictly increase.
fn check_event_order(world: &World) -> Result<(), String> {
    let mut numbers: BTreeMap<u64, u64> = BTreeMap::new();
    for event in world.events.values() {
        numbers.insert(event.id.0, event.number);
    }
    for evidence in world.evidence.values() {
        numbers.insert(evidence.id.0, evidence.number);
    }
    let mut previous: Option<u64> = None;
    for (id, number) in numbers {
        if previous.is_some_and(|p| number <= p) {
            return Err(format!("record {id} has event number {number} out of order"));
        }
        previous = Some(number);
    }
    Ok(())
}

fn hops_from(town: &Town, start: BlockId) -> Vec<Option<u32>> {
    let mut hops = vec![None; town.blocks.len()];
    hops[start.index()] = Some(0);
    let mut queue = VecDeque::from([start]);
    while let Some(block) = queue.pop_front() {
        let here = hops[block.index()].unwrap_or(0);
        for next in &town.block(block).neighbors {
            if hops[next.index()].is_none() {
                hops[next.index()] = Some(here + 1);
                queue.push_back(*next);
            }
        }
    }
    hops
}

/// The stored distance table is symmetric and agrees with a breadth-first
/// search of the block graph. The layout never changes after platting, so
/// this runs once rather than every step.
pub fn check_layout(town: &Town) -> Result<(), String> {
    for a in &town.blocks {
        let expected = hops_from(town, a.id);
        for b in &town.blocks {
            let stored = town.paths.get(a.id, b.id);
            if stored != town.paths.get(b.id, a.id) {
                return Err(format!("paths between {} and {} are asymmetric", a.id, b.id));
            }
            let bfs = expected[b.id.index()].unwrap_or(crate::model::DistanceTable::UNREACHABLE);
            if stored != bfs {
                return Err(format!("path {} to {} is {stored}, shortest is {bfs}", a.id, b.id));
            }
        }
    }
    for lot in &town.lots {
        if let Some(building) = lot.building {
            let elsewhere = town.lots.iter().any(|other| other.id != lot.id && other.building == Some(building));
            if elsewhere {
                return Err(format!("building {building} stands on more than one lot"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::corpora::Corpora;
    use crate::model::Sex;
    use crate::sim::{life, population};
    use crate::worldgen::plat_town;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::sync::Arc;

    fn setup() -> (World, SmallRng) {
        let mut rng = SmallRng::seed_from_u64(91);
        let config = Arc::new(Config::default());
        let corpora = Arc::new(Corpora::builtin());
        let mut world = World::new(config.clone(), corpora.clone());
        world.town = plat_town(&config.world_gen, &corpora, &mut rng);
        (world, rng)
    }

    #[test]
    fn platted_layout_is_consistent() {
        let (world, _) = setup();
        check_layout(&world.town).expect("fresh layout");
    }

    #[test]
    fn married_couple_passes_and_one_sided_marriage_fails() {
        let (mut world, mut rng) = setup();
        let a = population::person_ex_nihilo(&mut world, &mut rng, Some(Sex::Male), 30);
        let b = population::person_ex_nihilo(&mut world, &mut rng, Some(Sex::Female), 30);
        life::marry(&mut world, &mut rng, a, b);
        check_world(&world).expect("consistent marriage");

        world.person_mut(b).spouse = None;
        let err = check_world(&world).expect_err("one-sided marriage");
        assert!(err.contains("not vice versa"));
    }

    #[test]
    fn dangling_home_is_caught() {
        let (mut world, mut rng) = setup();
        let a = population::person_ex_nihilo(&mut world, &mut rng, None, 30);
        world.person_mut(a).home = Some(crate::id::BuildingId(999_999));
        assert!(check_world(&world).is_err());
    }

    #[test]
    fn an_unexplained_empty_facet_is_caught() {
        let (mut world, mut rng) = setup();
        let a = population::person_ex_nihilo(&mut world, &mut rng, None, 30);
        let subject = Entity::Person(a);
        let evidence = world.add_evidence(EvidenceKind::Reflection, subject, a, None);
        let belief = crate::sim::beliefs::Belief::new(subject, crate::model::FeatureType::FirstName, "");
        crate::sim::beliefs::new_facet(&mut world, a, belief, evidence, 1.0, None, None);
        assert!(check_world(&world).unwrap_err().contains("not forgotten"));
    }
}
