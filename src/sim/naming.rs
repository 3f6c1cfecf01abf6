//! Given names, surnames, generational suffixes and name changes.

use rand::RngCore;

use super::random::{chance, weighted_choice};
use crate::config::Service;
use crate::id::{EventId, PersonId};
use crate::model::{Entity, EventKind, OccupationKind, Sex, World};

const SUFFIXES: &[&str] = &["", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

/// The suffix a son named exactly after his father takes.
pub fn next_suffix(father_suffix: &str) -> String {
    let index = SUFFIXES
        .iter()
        .position(|s| *s == father_suffix)
        .unwrap_or(0);
    SUFFIXES
        .get(index + 1)
        .copied()
        .unwrap_or(SUFFIXES[SUFFIXES.len() - 1])
        .to_string()
}

/// Relatives a newborn may be named after, weighted by configured frequency.
fn namegivers(world: &World, child: PersonId) -> Vec<(PersonId, f64)> {
    let names = &world.config.names;
    let person = world.person(child);
    let sex = person.sex;
    let (parent, grand, great) = match sex {
        Sex::Male => (
            person.father,
            names.frequency_of_naming_after_grandfather,
            names.frequency_of_naming_after_greatgrandfather,
        ),
        Sex::Female => (
            person.mother,
            names.frequency_of_naming_after_grandmother,
            names.frequency_of_naming_after_greatgrandmother,
        ),
    };
    let parent_weight = match sex {
        Sex::Male => names.frequency_of_naming_after_father,
        Sex::Female => names.frequency_of_naming_after_mother,
    };
    let same_sex = |id: &PersonId| world.person(*id).sex == sex;

    let mut pool: Vec<(PersonId, f64)> = Vec::new();
    pool.extend(parent.map(|p| (p, f64::from(parent_weight))));
    let ties = &person.legal;
    pool.extend(ties.grandparents.iter().filter(|p| same_sex(p)).map(|p| (*p, f64::from(grand))));
    pool.extend(
        ties.greatgrandparents
            .iter()
            .filter(|p| same_sex(p))
            .map(|p| (*p, f64::from(great))),
    );
    pool.extend(
        ties.aunts_and_uncles
            .iter()
            .filter(|p| same_sex(p))
            .map(|p| (*p, f64::from(names.frequency_of_naming_after_uncle_or_aunt))),
    );
    pool
}

/// Choose first, middle and last names and a suffix for a newborn whose
/// parents are already linked.
pub fn name_newborn(world: &mut World, rng: &mut dyn RngCore, child: PersonId) {
    let names = world.config.names.clone();
    let corpora = world.corpora.clone();
    let (sex, mother, father) = {
        let p = world.person(child);
        (p.sex, p.mother, p.father)
    };

    let last_name = match (father, mother) {
        (Some(f), Some(m)) if world.person(m).kids_get_hyphenated_surname => {
            let (fl, ml) = (&world.person(f).last_name, &world.person(m).last_name);
            if fl == ml {
                fl.clone()
            } else {
                format!("{fl}-{ml}")
            }
        }
        (Some(f), _) => world.person(f).last_name.clone(),
        (None, Some(m)) => world.person(m).last_name.clone(),
        (None, None) => corpora.surname(rng),
    };

    // 1. Juniors take the father's exact name
    if let (Sex::Male, Some(f)) = (sex, father) {
        if chance(rng, names.chance_son_inherits_fathers_exact_name) {
            let (first, middle, suffix) = {
                let father = world.person(f);
                (
                    father.first_name.clone(),
                    father.middle_name.clone(),
                    next_suffix(&father.suffix),
                )
            };
            let person = world.person_mut(child);
            person.first_name = first;
            person.middle_name = middle;
            person.suffix = suffix;
            person.last_name = last_name;
            person.named_for = (Some(f), Some(f));
            return;
        }
    }

    // 2. Otherwise from a relative or the corpora
    let pool = namegivers(world, child);
    let pick = |rng: &mut dyn RngCore, p: f64| -> (String, Option<PersonId>) {
        if chance(rng, p) {
            if let Some(giver) = weighted_choice(rng, &pool) {
                return (world.person(giver).first_name.clone(), Some(giver));
            }
        }
        (corpora.first_name(sex, rng), None)
    };
    let (first, first_for) = pick(rng, names.chance_child_inherits_first_name);
    let (middle, middle_for) = pick(rng, names.chance_child_inherits_middle_name);

    let person = world.person_mut(child);
    person.first_name = first;
    person.middle_name = middle;
    person.last_name = last_name;
    person.named_for = (first_for, middle_for);
}

/// Change a surname through a NameChange event; the lawyer, if any, is paid.
pub fn change_last_name(
    world: &mut World,
    person: PersonId,
    new_last_name: String,
    lawyer: Option<PersonId>,
    caused_by: Option<EventId>,
) -> EventId {
    let old_last_name = world.person(person).last_name.clone();
    let description = format!(
        "{} changed their surname from {old_last_name} to {new_last_name}",
        world.person(person).full_name()
    );
    let location = lawyer
        .and_then(|l| world.workplace_of(l))
        .map(Entity::Business);
    {
        let p = world.person_mut(person);
        if p.maiden_name.is_none() {
            p.maiden_name = Some(old_last_name.clone());
        }
        p.last_name = new_last_name.clone();
    }
    if let Some(lawyer) = lawyer {
        let fee = world
            .config
            .economy
            .compensation(Service::NameChange, OccupationKind::Lawyer);
        super::business::pay(world, person, lawyer, fee);
    }
    world.add_event(
        EventKind::NameChange {
            subject: person,
            old_last_name,
            new_last_name,
            lawyer,
        },
        location,
        description,
        caused_by,
    )
}
