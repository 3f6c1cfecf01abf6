//! Charge, spark and trust between people who spend time together.

use rand::RngCore;
use tracing::trace;

use super::context::TickContext;
use super::random::chance;
use super::system::{Fidelity, SimSystem};
use crate::id::PersonId;
use crate::model::{Entity, Person, Relationship, RelationshipKind, Trait, World};

// ---------------------------------------------------------------------------
// Initial values
// ---------------------------------------------------------------------------

/// Similarity in openness, extroversion and agreeableness, on [-1, 1].
pub fn compatibility(owner: &Person, subject: &Person) -> f64 {
    let (a, b) = (&owner.personality, &subject.personality);
    let diff = (a.openness - b.openness).abs()
        + (a.extroversion - b.extroversion).abs()
        + (a.agreeableness - b.agreeableness).abs();
    ((3.0 - diff) / 3.0).clamp(-1.0, 1.0)
}

fn charge_increment(world: &World, owner: &Person, subject: &Person, compatibility: f64) -> f64 {
    let config = &world.config.relationships;
    let mut increment = compatibility
        + owner.personality.extroversion * config.owner_extroversion_boost_to_charge_multiplier
        + subject.personality.agreeableness * config.subject_agreeableness_boost_to_charge_multiplier;
    if owner.sex != subject.sex {
        increment *= config.charge_intensity_reduction_due_to_sex_difference;
    }
    increment
}

/// Zero between relatives, towards the wrong sex, or involving a minor.
fn spark_increment(world: &World, owner: &Person, subject: &Person) -> f64 {
    let now = world.now();
    if owner.is_extended_family(subject.id)
        || !owner.attracted_to(subject)
        || !owner.is_adult(now)
        || !subject.is_adult(now)
    {
        return 0.0;
    }
    let multipliers = world.config.relationships.spark_multipliers(owner.sex);
    Trait::ALL
        .iter()
        .map(|t| multipliers.get(*t) * (owner.personality.get(*t) + subject.personality.get(*t)))
        .sum()
}

fn job_level(world: &World, person: &Person) -> u8 {
    person.occupation.map_or(0, |o| world.occupation(o).level)
}

fn modifiers(world: &World, owner: &Person, subject: &Person) -> (f64, f64) {
    let now = world.now();
    let config = &world.config.relationships;
    (
        config.age_gap_modifier(owner.age(now), subject.age(now)),
        config.job_level_gap_modifier(job_level(world, owner), job_level(world, subject)),
    )
}

fn new_relationship(world: &World, owner: PersonId, subject: PersonId, kind: RelationshipKind, place: Option<Entity>) -> Relationship {
    let (o, s) = (world.person(owner), world.person(subject));
    let now = world.now();
    let compatibility = compatibility(o, s);
    let charge_increment = charge_increment(world, o, s, compatibility);
    let spark_increment = spark_increment(world, o, s);
    let (age_gap_modifier, job_level_gap_modifier) = modifiers(world, o, s);
    Relationship {
        owner,
        subject,
        kind,
        preceded_by: Vec::new(),
        where_met: place,
        when_met: now,
        where_last_met: place,
        when_last_met: now,
        total_interactions: 0,
        compatibility,
        charge: charge_increment,
        charge_increment,
        spark: spark_increment,
        spark_increment,
        trust: world.config.relationships.trust(charge_increment),
        age_gap_modifier,
        job_level_gap_modifier,
        interacted_this_timestep: false,
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Record a first meeting in both directions. Existing relationships are
/// left alone.
pub fn meet(world: &mut World, a: PersonId, b: PersonId, place: Option<Entity>) {
    for (owner, subject) in [(a, b), (b, a)] {
        if world.person(owner).relationships.contains_key(&subject) {
            continue;
        }
        let relationship = new_relationship(world, owner, subject, RelationshipKind::Acquaintance, place);
        let p = world.person_mut(owner);
        p.relationships.insert(subject, relationship);
        p.acquaintances.insert(subject);
        refresh_salience(world, owner, subject);
    }
}

/// Kinship ties between a newborn and the family present at the birth.
pub fn add_kinship(world: &mut World, a: PersonId, b: PersonId, place: Option<Entity>) {
    for (owner, subject) in [(a, b), (b, a)] {
        let relationship = new_relationship(world, owner, subject, RelationshipKind::Kinship, place);
        world
            .person_mut(owner)
            .relationships
            .insert(subject, relationship);
    }
}

fn change_kind(world: &mut World, owner: PersonId, subject: PersonId, kind: RelationshipKind) {
    let now = world.now();
    let p = world.person_mut(owner);
    let Some(relationship) = p.relationships.get_mut(&subject) else {
        return;
    };
    let old = relationship.kind;
    if old == kind {
        return;
    }
    relationship.preceded_by.push((old, now));
    relationship.kind = kind;
    match old {
        RelationshipKind::Acquaintance => p.acquaintances.remove(&subject),
        RelationshipKind::Friendship => p.friends.remove(&subject),
        RelationshipKind::Enmity => p.enemies.remove(&subject),
        RelationshipKind::Kinship | RelationshipKind::Romance => false,
    };
    match kind {
        RelationshipKind::Acquaintance => p.acquaintances.insert(subject),
        RelationshipKind::Friendship => p.friends.insert(subject),
        RelationshipKind::Enmity => p.enemies.insert(subject),
        RelationshipKind::Kinship | RelationshipKind::Romance => false,
    };
    if p.best_friend == Some(subject) && kind != RelationshipKind::Friendship {
        p.best_friend = None;
    }
    if p.worst_enemy == Some(subject) && kind != RelationshipKind::Enmity {
        p.worst_enemy = None;
    }
    trace!(owner = %owner, subject = %subject, from = %old, to = %kind, "relationship changed");
}

/// Newlyweds who loved each other become a romance in both directions.
pub fn begin_romance(world: &mut World, a: PersonId, b: PersonId) {
    let mutual = world.person(a).love_interest == Some(b) && world.person(b).love_interest == Some(a);
    if mutual {
        change_kind(world, a, b, RelationshipKind::Romance);
        change_kind(world, b, a, RelationshipKind::Romance);
    }
}

// ---------------------------------------------------------------------------
// Progression
// ---------------------------------------------------------------------------

fn progress(world: &mut World, owner: PersonId, subject: PersonId, place: Option<Entity>, missing_days: u32) {
    let now = world.now();
    let config = world.config.clone();
    let config = &config.relationships;
    let days = f64::from(missing_days.max(1));
    let (kind, charge, spark) = {
        let Some(r) = world.person_mut(owner).relationships.get_mut(&subject) else {
            return;
        };
        if r.interacted_this_timestep {
            return;
        }
        r.charge += r.charge_increment * r.age_gap_modifier * r.job_level_gap_modifier * days;
        r.spark_increment *= config.spark_decay_rate;
        r.spark += r.spark_increment * r.age_gap_modifier;
        r.trust = config.trust(r.charge);
        r.total_interactions += 1;
        r.where_last_met = place;
        r.when_last_met = now;
        r.interacted_this_timestep = true;
        (r.kind, r.charge, r.spark)
    };

    // 1. Charge transitions
    let eligible = matches!(kind, RelationshipKind::Acquaintance | RelationshipKind::Kinship);
    if eligible && charge > config.charge_threshold_friendship {
        change_kind(world, owner, subject, RelationshipKind::Friendship);
    } else if eligible && charge < config.charge_threshold_enmity {
        change_kind(world, owner, subject, RelationshipKind::Enmity);
    } else if config.allow_reversion
        && ((kind == RelationshipKind::Friendship && charge <= config.charge_threshold_friendship)
            || (kind == RelationshipKind::Enmity && charge >= config.charge_threshold_enmity))
    {
        change_kind(world, owner, subject, RelationshipKind::Acquaintance);
    }

    // 2. Slots
    let kind = world.person(owner).relationships[&subject].kind;
    let mut changed = Vec::new();
    let best = slot_value(world, owner, world.person(owner).best_friend, |r| r.charge);
    if kind == RelationshipKind::Friendship && best.is_none_or(|b| charge > b) {
        changed.extend(world.person(owner).best_friend);
        world.person_mut(owner).best_friend = Some(subject);
    }
    let worst = slot_value(world, owner, world.person(owner).worst_enemy, |r| r.charge);
    if kind == RelationshipKind::Enmity && worst.is_none_or(|w| charge < w) {
        changed.extend(world.person(owner).worst_enemy);
        world.person_mut(owner).worst_enemy = Some(subject);
    }
    let love = slot_value(world, owner, world.person(owner).love_interest, |r| r.spark);
    if spark > 0.0 && love.is_none_or(|l| spark > l) && world.person(owner).love_interest != Some(subject) {
        changed.extend(world.person(owner).love_interest);
        world.person_mut(owner).love_interest = Some(subject);
    }
    changed.push(subject);
    changed.sort();
    changed.dedup();
    for other in changed {
        refresh_salience(world, owner, other);
    }
}

fn slot_value(
    world: &World,
    owner: PersonId,
    other: Option<PersonId>,
    measure: fn(&Relationship) -> f64,
) -> Option<f64> {
    other.and_then(|o| world.person(owner).relationships.get(&o).map(measure))
}

/// Two people spend time together: each direction progresses at most once
/// per step.
pub fn interact(world: &mut World, a: PersonId, b: PersonId, place: Option<Entity>, missing_days: u32) {
    if a == b {
        return;
    }
    meet(world, a, b, place);
    progress(world, a, b, place, missing_days);
    progress(world, b, a, place, missing_days);
}

pub fn clear_interaction_flags(world: &mut World) {
    for person in world.people.values_mut() {
        for relationship in person.relationships.values_mut() {
            relationship.interacted_this_timestep = false;
        }
    }
}

/// Recompute age and job-level gap modifiers after a birthday or job change.
pub fn refresh_modifiers(world: &mut World, person: PersonId) {
    let others: Vec<PersonId> = world.person(person).relationships.keys().copied().collect();
    for other in others {
        for (owner, subject) in [(person, other), (other, person)] {
            let (age, job) = modifiers(world, world.person(owner), world.person(subject));
            if let Some(r) = world.person_mut(owner).relationships.get_mut(&subject) {
                r.age_gap_modifier = age;
                r.job_level_gap_modifier = job;
            }
        }
    }
}

/// Spark from `owner` towards `subject`, zero if they never met.
pub fn spark(world: &World, owner: PersonId, subject: PersonId) -> f64 {
    world
        .person(owner)
        .relationships
        .get(&subject)
        .map_or(0.0, |r| r.spark)
}

/// Trust from `owner` towards `subject`; strangers get the neutral value.
pub fn trust(world: &World, owner: PersonId, subject: PersonId) -> f64 {
    world
        .person(owner)
        .relationships
        .get(&subject)
        .map_or_else(|| world.config.relationships.trust(0.0), |r| r.trust)
}

// ---------------------------------------------------------------------------
// Salience
// ---------------------------------------------------------------------------

fn coworkers(world: &World, a: PersonId, b: PersonId) -> bool {
    match (world.workplace_of(a), world.workplace_of(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// How salient `other` is to `owner`, from their ties.
pub fn salience_of(world: &World, owner: PersonId, other: PersonId) -> f64 {
    let w = &world.config.relationships.salience;
    let p = world.person(owner);
    let mut salience = 0.0;
    if p.spouse == Some(other) {
        salience += w.spouse;
    }
    if p.legal.immediate().contains(&other) {
        salience += w.immediate_family;
    } else if p.is_extended_family(other) {
        salience += w.extended_family;
    }
    if p.best_friend == Some(other) {
        salience += w.best_friend;
    }
    if p.worst_enemy == Some(other) {
        salience += w.worst_enemy;
    }
    if p.love_interest == Some(other) {
        salience += w.love_interest;
    }
    if p.friends.contains(&other) {
        salience += w.friend;
    }
    if p.enemies.contains(&other) {
        salience += w.enemy;
    }
    if p.acquaintances.contains(&other) {
        salience += w.acquaintance;
    }
    if coworkers(world, owner, other) {
        salience += w.coworker;
    }
    salience
}

/// Recompute salience both ways between two people.
pub fn refresh_salience(world: &mut World, a: PersonId, b: PersonId) {
    if a == b {
        return;
    }
    for (owner, other) in [(a, b), (b, a)] {
        let salience = salience_of(world, owner, other);
        let map = &mut world.person_mut(owner).salience;
        if salience > 0.0 {
            map.insert(other, salience);
        } else {
            map.remove(&other);
        }
    }
}

/// Refresh salience between a person and their family.
pub fn refresh_family_salience(world: &mut World, person: PersonId) {
    for relative in world.person(person).extended_family() {
        refresh_salience(world, person, relative);
    }
}

/// Refresh salience between a person and everyone at their workplace.
pub fn refresh_coworker_salience(world: &mut World, person: PersonId) {
    let Some(company) = world.workplace_of(person) else {
        return;
    };
    let coworkers: Vec<PersonId> = world
        .business(company)
        .employees
        .iter()
        .map(|o| world.occupation(*o).person)
        .collect();
    for coworker in coworkers {
        refresh_salience(world, person, coworker);
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Progresses relationships between people gathered together this step.
pub struct RelationshipSystem;

impl RelationshipSystem {
    fn socialize(world: &mut World, rng: &mut dyn RngCore, place: Entity, people: &[PersonId], missing_days: u32) {
        let p = world.config.relationships.chance_someone_socializes;
        for (i, &a) in people.iter().enumerate() {
            for &b in &people[i + 1..] {
                if !world.person(a).is_present() || !world.person(b).is_present() {
                    continue;
                }
                if chance(rng, p) {
                    interact(world, a, b, Some(place), missing_days);
                }
            }
        }
    }
}

impl SimSystem for RelationshipSystem {
    fn name(&self) -> &str {
        "relationships"
    }

    fn runs_at(&self, _fidelity: Fidelity) -> bool {
        true
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        for occasion in ctx.occasions.iter() {
            for (place, people) in &occasion.groups {
                Self::socialize(ctx.world, ctx.rng, *place, people, ctx.missing_days);
            }
            clear_interaction_flags(ctx.world);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::corpora::Corpora;
    use crate::model::Sex;
    use crate::sim::population;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::sync::Arc;

    fn setup() -> (World, SmallRng) {
        let world = World::new(Arc::new(Config::default()), Arc::new(Corpora::builtin()));
        (world, SmallRng::seed_from_u64(31))
    }

    fn friendly_pair(world: &mut World, rng: &mut SmallRng) -> (PersonId, PersonId) {
        let a = population::person_ex_nihilo(world, rng, Some(Sex::Female), 30);
        let b = population::person_ex_nihilo(world, rng, Some(Sex::Female), 31);
        for p in [a, b] {
            let personality = &mut world.person_mut(p).personality;
            personality.openness = 0.5;
            personality.extroversion = 0.8;
            personality.agreeableness = 0.8;
        }
        (a, b)
    }

    #[test]
    fn compatibility_of_identical_personalities_is_one() {
        let (mut world, mut rng) = setup();
        let (a, b) = friendly_pair(&mut world, &mut rng);
        assert!((compatibility(world.person(a), world.person(b)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn meeting_is_mutual_and_idempotent() {
        let (mut world, mut rng) = setup();
        let (a, b) = friendly_pair(&mut world, &mut rng);
        meet(&mut world, a, b, None);
        meet(&mut world, a, b, None);
        assert_eq!(world.person(a).relationships[&b].kind, RelationshipKind::Acquaintance);
        assert_eq!(world.person(b).relationships[&a].kind, RelationshipKind::Acquaintance);
        assert!(world.person(a).acquaintances.contains(&b));
    }

    #[test]
    fn repeated_interaction_makes_friends_and_best_friends() {
        let (mut world, mut rng) = setup();
        let (a, b) = friendly_pair(&mut world, &mut rng);
        for _ in 0..20 {
            interact(&mut world, a, b, None, 1);
            clear_interaction_flags(&mut world);
        }
        let person = world.person(a);
        assert_eq!(person.relationships[&b].kind, RelationshipKind::Friendship);
        assert!(person.friends.contains(&b));
        assert!(!person.acquaintances.contains(&b));
        assert_eq!(person.best_friend, Some(b));
        assert!(person.salience[&b] > 0.0);
        assert_eq!(person.relationships[&b].preceded_by[0].0, RelationshipKind::Acquaintance);
    }

    #[test]
    fn friendship_persists_without_reversion() {
        let (mut world, mut rng) = setup();
        let (a, b) = friendly_pair(&mut world, &mut rng);
        for _ in 0..20 {
            interact(&mut world, a, b, None, 1);
            clear_interaction_flags(&mut world);
        }
        let r = world.person_mut(a).relationships.get_mut(&b).expect("they met");
        r.charge_increment = -5.0;
        for _ in 0..10 {
            interact(&mut world, a, b, None, 1);
            clear_interaction_flags(&mut world);
        }
        assert_eq!(world.person(a).relationships[&b].kind, RelationshipKind::Friendship);
    }

    #[test]
    fn one_progression_per_step() {
        let (mut world, mut rng) = setup();
        let (a, b) = friendly_pair(&mut world, &mut rng);
        interact(&mut world, a, b, None, 1);
        interact(&mut world, b, a, None, 1);
        assert_eq!(world.person(a).relationships[&b].total_interactions, 1);
        assert_eq!(world.person(b).relationships[&a].total_interactions, 1);
    }

    #[test]
    fn missing_days_scale_charge() {
        let (mut world, mut rng) = setup();
        let (a, b) = friendly_pair(&mut world, &mut rng);
        meet(&mut world, a, b, None);
        let before = world.person(a).relationships[&b].charge;
        let r = &world.person(a).relationships[&b];
        let step = r.charge_increment * r.age_gap_modifier * r.job_level_gap_modifier;
        interact(&mut world, a, b, None, 10);
        let after = world.person(a).relationships[&b].charge;
        assert!((after - before - step * 10.0).abs() < 1e-9);
    }

    #[test]
    fn no_spark_towards_family_or_minors() {
        let (mut world, mut rng) = setup();
        let adult = population::person_ex_nihilo(&mut world, &mut rng, Some(Sex::Male), 30);
        let child = population::person_ex_nihilo(&mut world, &mut rng, Some(Sex::Female), 10);
        world.person_mut(adult).sexuality.attracted_to_women = true;
        meet(&mut world, adult, child, None);
        assert_eq!(world.person(adult).relationships[&child].spark_increment, 0.0);
    }
}
