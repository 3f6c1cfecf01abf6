//! Marriage, reproduction, death, divorce and the other yearly life events.

use rand::{Rng, RngCore};
use tracing::debug;

use super::business::{self, pay_for_service};
use super::context::TickContext;
use super::hiring::{self, Ending};
use super::housing;
use super::kinship;
use super::naming;
use super::population;
use super::random::chance;
use super::relationships;
use super::system::{Fidelity, SimSystem};
use crate::config::Service;
use crate::id::{EventId, PersonId};
use crate::model::{BusinessKind, Entity, EventKind, OccupationKind, Pregnancy, Sex, World};

// ---------------------------------------------------------------------------
// Romance and reproduction
// ---------------------------------------------------------------------------

/// Two people sleep together. Either may fall in love; an opposite-sex pair
/// may conceive.
pub fn have_sex(world: &mut World, rng: &mut dyn RngCore, a: PersonId, b: PersonId, protection: bool) {
    let d = world.config.demographics.clone();
    for (x, y) in [(a, b), (b, a)] {
        world.person_mut(x).sexual_partners.insert(y);
        let attracted = world.person(x).attracted_to(world.person(y));
        if attracted && chance(rng, d.chance_person_falls_in_love_after_sex) {
            world.person_mut(x).love_interest = Some(y);
        }
    }

    let (female, male) = match (world.person(a).sex, world.person(b).sex) {
        (Sex::Female, Sex::Male) => (a, b),
        (Sex::Male, Sex::Female) => (b, a),
        _ => return,
    };
    let (f, m) = (world.person(female), world.person(male));
    if f.is_pregnant() || f.infertile || m.infertile {
        return;
    }
    if protection && !chance(rng, d.chance_protection_does_not_work) {
        return;
    }
    let age = f.age(world.now());
    if chance(rng, d.chance_of_conception(age)) {
        let conceived = world.now();
        world.person_mut(female).pregnancy = Some(Pregnancy {
            father: male,
            conceived,
        });
        debug!(mother = %female, father = %male, "conceived");
    }
}

/// Deliver a pregnancy that has run its year. Returns the newborn.
pub fn deliver_if_due(world: &mut World, rng: &mut dyn RngCore, mother: PersonId) -> Option<PersonId> {
    let due = world
        .person(mother)
        .pregnancy
        .is_some_and(|p| p.conceived.year() < world.now().year());
    if due { give_birth(world, rng, mother) } else { None }
}

/// A married couple may try for a child this year.
pub fn try_for_child(world: &mut World, rng: &mut dyn RngCore, a: PersonId, b: PersonId) {
    let n_kids = world.person(a).legal.kids.len();
    let p = world.config.demographics.chance_trying_to_conceive(n_kids);
    if chance(rng, p) {
        have_sex(world, rng, a, b, false);
    }
}

/// One year of a marriage: births first, then conception.
pub fn family_year(world: &mut World, rng: &mut dyn RngCore, a: PersonId, b: PersonId) {
    for parent in [a, b] {
        deliver_if_due(world, rng, parent);
    }
    let together = world.person(a).spouse == Some(b)
        && world.person(a).is_alive()
        && world.person(b).is_alive();
    if together {
        try_for_child(world, rng, a, b);
    }
}

/// Birth of a child. In town a doctor delivers it at their hospital; a
/// mother's husband who is not the father adopts the child.
pub fn give_birth(world: &mut World, rng: &mut dyn RngCore, mother: PersonId) -> Option<PersonId> {
    let pregnancy = world.person_mut(mother).pregnancy.take()?;
    let father = pregnancy.father;
    let now = world.now();
    let child = population::create_person(world, rng, None, now, Some(mother), Some(father));
    let in_town = world.person(mother).is_present();

    // 1. Delivery
    let doctor = if in_town {
        hiring::contract(world, rng, Some(mother), OccupationKind::Doctor)
    } else {
        None
    };
    let hospital = doctor
        .and_then(|d| world.workplace_of(d))
        .filter(|h| world.business(*h).kind == BusinessKind::Hospital);
    let nurses = hospital
        .map(|h| hiring::employees_as(world, h, OccupationKind::Nurse))
        .unwrap_or_default();

    // 2. Legal father
    let stepfather = world
        .person(mother)
        .spouse
        .filter(|s| *s != father && world.person(*s).sex == Sex::Male);
    let legal_father = stepfather.unwrap_or(father);

    let location = hospital
        .map(Entity::Business)
        .or_else(|| world.person(mother).home.map(Entity::Dwelling));
    let description = format!(
        "{} was born to {}",
        world.person(child).full_name(),
        world.person(mother).name()
    );
    let birth = world.add_event(
        EventKind::Birth {
            child,
            mother,
            father: Some(legal_father),
            biological_father: father,
            doctor,
            nurses: nurses.clone(),
            hospital,
        },
        location,
        description,
        None,
    );
    if let Some(stepfather) = stepfather {
        kinship::adopt(world, child, stepfather);
        let description = format!(
            "{} adopted {}",
            world.person(stepfather).name(),
            world.person(child).name()
        );
        world.add_event(
            EventKind::Adoption {
                child,
                adoptive_parents: vec![stepfather],
            },
            location,
            description,
            Some(birth),
        );
    }
    if let Some(doctor) = doctor {
        let mut staff = vec![doctor];
        staff.extend(nurses);
        pay_for_service(world, mother, Service::Birth, &staff);
    }

    // 3. Home and family
    if in_town {
        housing::arrive(world, &[child]);
        if let Some(home) = world.person(mother).home {
            world.person_mut(child).home = Some(home);
            world.dwelling_mut(home).residents.insert(child);
        }
        let family: Vec<PersonId> = world
            .person(child)
            .immediate_family()
            .into_iter()
            .filter(|p| world.person(*p).is_present())
            .collect();
        for member in family {
            relationships::add_kinship(world, child, member, location);
        }
        relationships::refresh_family_salience(world, child);
    }
    debug!(child = %child, mother = %mother, father = %father, "born");
    Some(child)
}

/// Unmarried kids sharing `person`'s home, and grandkids living there
/// without a parent of their own in the household.
fn dependents(world: &World, person: PersonId) -> Vec<PersonId> {
    let p = world.person(person);
    let Some(home) = p.home else {
        return Vec::new();
    };
    let household = world.household_of(person);
    let at_home = |k: &PersonId| {
        let kid = world.person(*k);
        kid.is_present() && kid.spouse.is_none() && kid.home == Some(home)
    };
    let kids = p.legal.kids.iter().copied().filter(at_home);
    let grandkids = p
        .legal
        .grandchildren
        .iter()
        .copied()
        .filter(at_home)
        .filter(|g| world.person(*g).legal.parents.is_disjoint(&household));
    kids.chain(grandkids).collect()
}

/// Wed two people: spouse links, a Marriage event, surname decisions and
/// pooled money. Finding a home is left to the caller.
pub fn marry(world: &mut World, rng: &mut dyn RngCore, a: PersonId, b: PersonId) -> EventId {
    let d = world.config.demographics.clone();
    let names = world.config.names.clone();

    // 1. Spouses and love interests
    for (x, y) in [(a, b), (b, a)] {
        let keeps_former = chance(rng, d.chance_a_newlywed_keeps_former_love_interest);
        let p = world.person_mut(x);
        p.spouse = Some(y);
        p.grieving = false;
        if p.love_interest != Some(y) && !keeps_former {
            p.love_interest = Some(y);
        }
    }
    let description = format!(
        "{} and {} got married",
        world.person(a).name(),
        world.person(b).name()
    );
    let location = world.person(a).home.map(Entity::Dwelling);
    let event = world.add_event(
        EventKind::Marriage {
            spouses: [a, b],
            name_changes: Vec::new(),
        },
        location,
        description,
        None,
    );
    world.person_mut(a).marriage = Some(event);
    world.person_mut(b).marriage = Some(event);

    // 2. Surnames
    let mut name_changes = Vec::new();
    if chance(rng, names.chance_one_newlywed_takes_others_name) {
        let (taker, giver) = match (world.person(a).sex, world.person(b).sex) {
            (Sex::Female, Sex::Male) | (Sex::Male, Sex::Female) => {
                let (woman, man) = if world.person(a).sex == Sex::Female { (a, b) } else { (b, a) };
                if chance(rng, names.chance_woman_takes_mans_name) { (woman, man) } else { (man, woman) }
            }
            _ => if rng.random_bool(0.5) { (a, b) } else { (b, a) },
        };
        let surname = world.person(giver).last_name.clone();
        if world.person(taker).last_name != surname {
            name_changes.push(naming::change_last_name(world, taker, surname.clone(), None, Some(event)));
            let now = world.now();
            let stepkids: Vec<PersonId> = world
                .person(taker)
                .legal
                .kids
                .iter()
                .copied()
                .filter(|k| !world.person(giver).legal.kids.contains(k))
                .filter(|k| {
                    let kid = world.person(*k);
                    kid.is_alive()
                        && kid.age(now) < names.age_after_which_stepchildren_will_not_take_stepparent_name
                        && kid.last_name != surname
                })
                .collect();
            for kid in stepkids {
                if chance(rng, names.chance_stepchildren_take_stepparent_name) {
                    name_changes.push(naming::change_last_name(world, kid, surname.clone(), None, Some(event)));
                }
            }
        }
    }
    if let Some(crate::model::Event {
        kind: EventKind::Marriage { name_changes: recorded, .. },
        ..
    }) = world.events.get_mut(&event)
    {
        recorded.extend(name_changes.iter().copied());
    }
    let hyphenate = name_changes.is_empty()
        && chance(rng, names.chance_newlyweds_decide_children_get_hyphenated_surname);
    world.person_mut(a).kids_get_hyphenated_surname = hyphenate;
    world.person_mut(b).kids_get_hyphenated_surname = hyphenate;

    // 3. Pooled money
    let total = world.person(a).money + world.person(b).money;
    world.person_mut(a).money = total - total / 2;
    world.person_mut(b).money = total / 2;

    relationships::begin_romance(world, a, b);
    relationships::refresh_salience(world, a, b);
    debug!(a = %a, b = %b, "married");
    event
}

/// End a marriage. A lawyer handles it; one partner moves out, and either
/// may revert a surname taken at the wedding.
pub fn divorce(world: &mut World, rng: &mut dyn RngCore, a: PersonId, b: PersonId) -> EventId {
    let d = world.config.demographics.clone();
    let now = world.now();
    let lawyer = hiring::contract(world, rng, Some(a), OccupationKind::Lawyer);
    let marriage = world.person(a).marriage;
    let years_married = marriage.map_or(0, |m| now.years_since(world.events[&m].timestamp));
    let description = format!(
        "{} and {} divorced",
        world.person(a).name(),
        world.person(b).name()
    );
    let event = world.add_event(
        EventKind::Divorce {
            spouses: [a, b],
            lawyer,
            marriage,
        },
        lawyer.and_then(|l| world.workplace_of(l)).map(Entity::Business),
        description,
        None,
    );

    // 1. Unlink
    for (x, y) in [(a, b), (b, a)] {
        let falls_out = chance(rng, d.chance_a_divorcee_falls_out_of_love);
        let p = world.person_mut(x);
        p.spouse = None;
        p.marriage = None;
        p.kids_get_hyphenated_surname = false;
        if p.love_interest == Some(y) && falls_out {
            p.love_interest = None;
        }
    }
    let total = world.person(a).money + world.person(b).money;
    world.person_mut(a).money = total - total / 2;
    world.person_mut(b).money = total / 2;

    // 2. Surnames back
    let changes = match marriage.map(|m| &world.events[&m].kind) {
        Some(EventKind::Marriage { name_changes, .. }) => name_changes.clone(),
        _ => Vec::new(),
    };
    for change in changes {
        let EventKind::NameChange {
            subject,
            old_last_name,
            ..
        } = world.events[&change].kind.clone()
        else {
            continue;
        };
        if (subject == a || subject == b)
            && chance(rng, d.chance_spouse_changes_name_back(years_married))
        {
            naming::change_last_name(world, subject, old_last_name, lawyer, Some(event));
        }
    }
    if let Some(lawyer) = lawyer {
        pay_for_service(world, a, Service::Divorce, &[lawyer]);
    }

    // 3. One of them moves out
    let mover = match (world.person(a).sex, world.person(b).sex) {
        (Sex::Male, Sex::Female) | (Sex::Female, Sex::Male) => {
            let (man, woman) = if world.person(a).sex == Sex::Male { (a, b) } else { (b, a) };
            if chance(rng, d.chance_a_male_divorcee_is_one_who_moves_out) { man } else { woman }
        }
        _ => if rng.random_bool(0.5) { a } else { b },
    };
    let stayer = if mover == a { b } else { a };
    let mut movers = vec![mover];
    movers.extend(
        dependents(world, mover)
            .into_iter()
            .filter(|k| !world.person(stayer).legal.kids.contains(k))
            .filter(|k| !world.person(*k).is_adult(now)),
    );
    relationships::refresh_salience(world, a, b);
    housing::relocate(world, rng, &movers, &[mover]);
    debug!(a = %a, b = %b, "divorced");
    event
}

// ---------------------------------------------------------------------------
// Death
// ---------------------------------------------------------------------------

/// Who arranges a funeral: spouse, mother, father, an adult child, adult
/// immediate family, adult extended family, an adult friend, then any adult
/// resident.
pub fn next_of_kin(world: &World, person: PersonId) -> Option<PersonId> {
    let now = world.now();
    let p = world.person(person);
    let present = |q: &PersonId| *q != person && world.person(*q).is_present();
    let adult = |q: &PersonId| present(q) && world.person(*q).is_adult(now);
    p.spouse
        .filter(present)
        .or(p.mother.filter(present))
        .or(p.father.filter(present))
        .or_else(|| p.legal.kids.iter().copied().find(adult))
        .or_else(|| p.immediate_family().into_iter().find(adult))
        .or_else(|| p.extended_family().into_iter().find(adult))
        .or_else(|| p.friends.iter().copied().find(adult))
        .or_else(|| world.residents.iter().copied().find(adult))
}

/// A person dies: buried by a mortician in the cemetery, their spouse
/// widowed, their home and job left behind.
pub fn die(world: &mut World, rng: &mut dyn RngCore, person: PersonId) -> EventId {
    let now = world.now();
    let kin = next_of_kin(world, person);

    // 1. Mark dead
    {
        let p = world.person_mut(person);
        p.death = Some(now);
        p.pregnancy = None;
        p.location = None;
    }
    world.residents.remove(&person);
    world.deceased.insert(person);

    // 2. Funeral
    let mortician = hiring::contract(world, rng, kin, OccupationKind::Mortician);
    let cemetery = world
        .businesses_of_kind(BusinessKind::Cemetery)
        .next()
        .map(|c| c.id);
    let plot = cemetery.map(|c| {
        let plots = &mut world.business_mut(c).plots;
        let plot = plots.keys().next_back().map_or(1, |n| n + 1);
        plots.insert(plot, person);
        plot
    });

    // 3. Widow
    let widow = world.person_mut(person).spouse.take();
    if let Some(widow) = widow {
        let w = world.person_mut(widow);
        w.spouse = None;
        w.widowed = true;
        w.grieving = true;
    }

    // 4. Home
    if let Some(home) = world.person_mut(person).home.take() {
        let dwelling = world.dwelling_mut(home);
        dwelling.residents.remove(&person);
        dwelling.former_residents.insert(person);
    }

    let description = format!("{} died", world.person(person).full_name());
    let event = world.add_event(
        EventKind::Death {
            subject: person,
            mortician,
            cemetery,
            plot,
            widow,
        },
        cemetery.map(Entity::Business),
        description,
        None,
    );
    if let (Some(kin), Some(mortician)) = (kin, mortician) {
        pay_for_service(world, kin, Service::Death, &[mortician]);
    }

    // 5. Job
    if let Some(occupation) = world.person(person).occupation {
        let position = hiring::end_occupation(world, occupation, Ending::Exit, Some(event));
        hiring::fill_position(world, rng, position, Some(event));
    }
    debug!(person = %person, ?plot, "died");
    event
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// The yearly life events of every resident.
pub struct LifeEventsSystem;

impl LifeEventsSystem {
    fn deaths(world: &mut World, rng: &mut dyn RngCore) {
        let now = world.now();
        let residents: Vec<PersonId> = world.residents.iter().copied().collect();
        for person in residents {
            if !world.person(person).is_present() {
                continue;
            }
            let p = world.config.demographics.chance_of_death(world.person(person).age(now));
            if chance(rng, p) {
                die(world, rng, person);
            }
        }
    }

    fn births(world: &mut World, rng: &mut dyn RngCore) {
        let expecting: Vec<PersonId> = world
            .residents
            .iter()
            .copied()
            .filter(|p| world.person(*p).is_pregnant())
            .collect();
        for mother in expecting {
            if world.person(mother).is_present() {
                deliver_if_due(world, rng, mother);
            }
        }
        for (a, b) in couples(world) {
            try_for_child(world, rng, a, b);
        }
    }

    fn marriages(world: &mut World, rng: &mut dyn RngCore) {
        let now = world.now();
        let d = world.config.demographics.clone();
        let single = |world: &World, p: PersonId| {
            let person = world.person(p);
            person.is_present() && person.spouse.is_none() && person.is_adult(now)
        };
        let residents: Vec<PersonId> = world.residents.iter().copied().collect();
        for a in residents {
            if !single(world, a) {
                continue;
            }
            let Some(b) = world.person(a).love_interest else {
                continue;
            };
            if a > b || !single(world, b) || world.person(b).love_interest != Some(a) {
                continue;
            }
            let mutual = relationships::spark(world, a, b).min(relationships::spark(world, b, a));
            if mutual < d.spark_threshold_for_marriage || !chance(rng, d.chance_love_interests_marry) {
                continue;
            }
            marry(world, rng, a, b);
            let mut movers = vec![a, b];
            for dependent in [a, b].into_iter().flat_map(|p| dependents(world, p)) {
                if !movers.contains(&dependent) {
                    movers.push(dependent);
                }
            }
            housing::relocate(world, rng, &movers, &[a, b]);
        }
    }

    fn divorces(world: &mut World, rng: &mut dyn RngCore) {
        let d = world.config.demographics.clone();
        for (a, b) in couples(world) {
            if world.person(a).spouse != Some(b) {
                continue;
            }
            let unhappy = [(a, b), (b, a)].into_iter().any(|(x, y)| {
                world.person(x).love_interest.is_some_and(|other| {
                    other != y
                        && relationships::spark(world, x, other)
                            > d.divorce_spark_ratio * relationships::spark(world, x, y).max(0.0)
                })
            });
            if unhappy && chance(rng, d.chance_unhappy_spouse_divorces) {
                divorce(world, rng, a, b);
            }
        }
    }

    fn retirements(world: &mut World, rng: &mut dyn RngCore) {
        let now = world.now();
        let economy = world.config.economy.clone();
        let workers: Vec<PersonId> = world
            .residents
            .iter()
            .copied()
            .filter(|p| world.person(*p).occupation.is_some())
            .filter(|p| world.person(*p).age(now) >= economy.age_people_retire)
            .collect();
        for worker in workers {
            let Some(occupation) = world.person(worker).occupation else {
                continue;
            };
            if chance(rng, economy.chance_someone_retires) {
                let position = hiring::end_occupation(world, occupation, Ending::Retirement, None);
                hiring::fill_position(world, rng, position, None);
            }
        }
    }

    fn moving_out(world: &mut World, rng: &mut dyn RngCore) {
        let now = world.now();
        let p = world.config.demographics.chance_adult_moves_out_per_year;
        let candidates: Vec<PersonId> = world
            .residents
            .iter()
            .copied()
            .filter(|id| {
                let person = world.person(*id);
                person.is_adult(now)
                    && person.spouse.is_none()
                    && person.home.is_some()
                    && person
                        .legal
                        .parents
                        .iter()
                        .any(|parent| world.person(*parent).home == person.home)
            })
            .collect();
        for person in candidates {
            if world.person(person).is_present() && chance(rng, p) {
                housing::relocate(world, rng, &[person], &[person]);
            }
        }
    }
}

/// Present married couples, each listed once.
fn couples(world: &World) -> Vec<(PersonId, PersonId)> {
    world
        .residents
        .iter()
        .filter_map(|a| world.person(*a).spouse.map(|b| (*a, b)))
        .filter(|(a, b)| a < b && world.person(*b).is_present())
        .collect()
}

impl SimSystem for LifeEventsSystem {
    fn name(&self) -> &str {
        "life_events"
    }

    fn runs_at(&self, fidelity: Fidelity) -> bool {
        fidelity == Fidelity::Low
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        Self::deaths(ctx.world, ctx.rng);
        Self::births(ctx.world, ctx.rng);
        Self::marriages(ctx.world, ctx.rng);
        Self::divorces(ctx.world, ctx.rng);
        Self::retirements(ctx.world, ctx.rng);
        Self::moving_out(ctx.world, ctx.rng);
        business::meet_demand(ctx.world, ctx.rng);
        hiring::fill_open_positions(ctx.world, ctx.rng);
    }
}
