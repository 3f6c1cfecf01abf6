//! Observation and reflection: beliefs formed first-hand.

use rand::RngCore;

use super::{Belief, attach, base_strength, current_facet, decay, new_facet};
use crate::id::{EvidenceId, PersonId};
use crate::model::{Entity, EvidenceKind, FeatureType, SimTimestamp, World};
use crate::sim::random::chance;

fn features_of(subject: Entity) -> Vec<FeatureType> {
    match subject {
        Entity::Person(_) => FeatureType::person_features(),
        Entity::Dwelling(_) => FeatureType::place_features(false),
        Entity::Business(_) => FeatureType::place_features(true),
    }
}

/// Fold one piece of first-hand evidence into the owner's model of
/// `subject`, feature by feature.
///
/// An accurate facet is strengthened. An inaccurate one is replaced by the
/// truth. A feature the owner has no belief about is perceived with a
/// chance that grows with its salience; a failed roll still leaves a facet,
/// already deteriorated. A feature the subject no longer has blanks out
/// whatever the owner still believes about it.
pub fn perceive(world: &mut World, rng: &mut dyn RngCore, owner: PersonId, subject: Entity, evidence: EvidenceId) {
    let kind = world.evidence_item(evidence).kind.clone();
    let strength = base_strength(world, &kind);
    let memory = world.person(owner).mind.memory;

    for feature in features_of(subject) {
        let truth = world.true_value(subject, feature, None).filter(|t| !t.value.is_empty());
        let Some(truth) = truth else {
            // The feature is gone, so a lingering belief about it goes blank
            let stale = current_facet(world, owner, subject, feature, None)
                .filter(|f| !world.facet(*f).is_forgotten());
            if let Some(stale) = stale {
                decay::blank(world, stale);
            }
            continue;
        };
        let belief = Belief {
            subject,
            feature,
            when: None,
            value: truth.value,
            object: truth.object,
        };
        match current_facet(world, owner, subject, feature, None) {
            Some(existing) if world.facet(existing).value == belief.value => {
                attach(world, existing, evidence, strength);
            }
            Some(existing) => {
                new_facet(world, owner, belief, evidence, strength, Some(existing), None);
            }
            None => {
                let perceived = chance(rng, world.config.beliefs.perception_chance(feature, memory));
                let facet = new_facet(world, owner, belief, evidence, strength, None, None);
                if !perceived {
                    let degraded = decay::deteriorate(world, rng, facet);
                    if world.facet(degraded).is_forgotten() {
                        decay::confabulate(world, rng, degraded);
                    }
                }
            }
        }
    }
}

/// Record where `subject` was at `when`, as seen by `owner`.
pub fn note_whereabouts(
    world: &mut World,
    owner: PersonId,
    subject: PersonId,
    place: Entity,
    when: SimTimestamp,
    evidence: EvidenceId,
) {
    let kind = world.evidence_item(evidence).kind.clone();
    let strength = base_strength(world, &kind);
    let subject = Entity::Person(subject);
    let belief = Belief {
        subject,
        feature: FeatureType::Whereabouts,
        when: Some(when),
        value: world.place_label(place),
        object: Some(place),
    };
    match current_facet(world, owner, subject, FeatureType::Whereabouts, Some(when)) {
        Some(existing) if world.facet(existing).value == belief.value => {
            attach(world, existing, evidence, strength);
        }
        existing => {
            new_facet(world, owner, belief, evidence, strength, existing, None);
        }
    }
}

/// `observer` sees `subject` at `place`.
pub fn observe(
    world: &mut World,
    rng: &mut dyn RngCore,
    observer: PersonId,
    subject: Entity,
    place: Option<Entity>,
) -> EvidenceId {
    let evidence = world.add_evidence(EvidenceKind::Observation, subject, observer, place);
    perceive(world, rng, observer, subject, evidence);
    if let (Entity::Person(seen), Some(place)) = (subject, place) {
        let when = world.now();
        note_whereabouts(world, observer, seen, place, when, evidence);
    }
    evidence
}

/// A person takes stock of themselves: where they are right now.
pub fn reflect(world: &mut World, rng: &mut dyn RngCore, person: PersonId, place: Entity) -> EvidenceId {
    let subject = Entity::Person(person);
    let evidence = world.add_evidence(EvidenceKind::Reflection, subject, person, Some(place));
    perceive(world, rng, person, subject, evidence);
    let when = world.now();
    note_whereabouts(world, person, person, place, when, evidence);
    evidence
}

/// Everyone gathered at one place this timestep: each reflects, may take
/// in the building, and may notice each of the others.
pub fn observe_gathering(
    world: &mut World,
    rng: &mut dyn RngCore,
    place: Entity,
    people: &[PersonId],
) {
    let nearby = world.config.beliefs.chance_someone_observes_nearby_entity;
    let building = world.config.beliefs.chance_someone_observes_building_they_are_in;

    for &observer in people {
        if !world.person(observer).is_present() {
            continue;
        }
        reflect(world, rng, observer, place);
        if chance(rng, building) {
            observe(world, rng, observer, place, Some(place));
        }
        for &other in people {
            if other != observer && chance(rng, nearby) {
                observe(world, rng, observer, Entity::Person(other), Some(place));
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

    fn setup(seed: u64) -> (World, SmallRng) {
        setup_with(seed, Config::default())
    }

    fn setup_with(seed: u64, config: Config) -> (World, SmallRng) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let config = Arc::new(config);
        let corpora = Arc::new(Corpora::builtin());
        let mut world = World::new(config.clone(), corpora.clone());
        world.town = plat_town(&config.world_gen, &corpora, &mut rng);
        (world, rng)
    }

    fn root(world: &World, mut facet: crate::id::FacetId) -> crate::id::FacetId {
        while let Some(previous) = world.facet(facet).predecessor {
            facet = previous;
        }
        facet
    }

    #[test]
    fn observation_builds_a_model_backed_by_evidence() {
        let (mut world, mut rng) = setup(11);
        let a = population::person_ex_nihilo(&mut world, &mut rng, None, 30);
        let b = population::person_ex_nihilo(&mut world, &mut rng, None, 30);

        let evidence = observe(&mut world, &mut rng, a, Entity::Person(b), None);

        let model = &world.person(a).mind.models[&Entity::Person(b)];
        let first = model.get_facet(FeatureType::FirstName).expect("first name facet");
        assert!(world.evidence_item(evidence).beliefs_evidenced.contains(&root(&world, first)));
        for id in model.all_facet_ids() {
            let f = world.facet(id);
            if f.is_forgotten() {
                let last = f.latest_evidence().expect("evidence");
                assert!(matches!(world.evidence_item(last).kind, EvidenceKind::Forgetting));
            }
        }
    }

    #[test]
    fn repeated_observation_strengthens_accurate_facets() {
        let mut config = Config::default();
        config.beliefs.perception_chance_floor = 1.0;
        config.beliefs.perception_chance_cap = 1.0;
        let (mut world, mut rng) = setup_with(3, config);
        let a = population::person_ex_nihilo(&mut world, &mut rng, None, 30);
        let b = population::person_ex_nihilo(&mut world, &mut rng, None, 30);

        observe(&mut world, &mut rng, a, Entity::Person(b), None);
        let facet = world.person(a).mind.models[&Entity::Person(b)]
            .get_facet(FeatureType::LastName)
            .expect("surname facet");
        let before = world.facet(facet).strength;
        observe(&mut world, &mut rng, a, Entity::Person(b), None);
        assert!(world.facet(facet).strength > before);
        assert_eq!(world.facet(facet).evidence.len(), 2);
    }

    #[test]
    fn a_feature_that_is_gone_blanks_the_old_belief() {
        let mut config = Config::default();
        config.beliefs.perception_chance_floor = 1.0;
        config.beliefs.perception_chance_cap = 1.0;
        let (mut world, mut rng) = setup_with(7, config);
        let a = population::person_ex_nihilo(&mut world, &mut rng, None, 30);
        let b = population::person_ex_nihilo(&mut world, &mut rng, None, 30);
        housing::arrive(&mut world, &[b]);
        let home = housing::secure_home(&mut world, &mut rng, &[b], &[b]).expect("the town is empty");
        observe(&mut world, &mut rng, a, Entity::Person(b), None);
        let address = world.person(a).mind.models[&Entity::Person(b)]
            .get_facet(FeatureType::HomeAddress)
            .expect("address facet");
        assert_eq!(world.facet(address).value, world.dwelling(home).address);

        housing::depart(&mut world, &[b]);
        observe(&mut world, &mut rng, a, Entity::Person(b), None);

        let current = world.person(a).mind.models[&Entity::Person(b)]
            .get_facet(FeatureType::HomeAddress)
            .expect("address facet");
        let facet = world.facet(current);
        assert!(facet.is_forgotten());
        assert_eq!(facet.predecessor, Some(address));
        let last = facet.latest_evidence().expect("evidence");
        assert!(matches!(world.evidence_item(last).kind, EvidenceKind::Forgetting));
    }

    #[test]
    fn reflection_records_own_whereabouts() {
        let (mut world, mut rng) = setup(5);
        let a = population::person_ex_nihilo(&mut world, &mut rng, None, 40);
        housing::arrive(&mut world, &[a]);
        let home = housing::secure_home(&mut world, &mut rng, &[a], &[a]).expect("the town is empty");
        let home = Entity::Dwelling(home);

        reflect(&mut world, &mut rng, a, home);

        let now = world.now();
        let facet = world.person(a).mind.models[&Entity::Person(a)]
            .whereabouts_at(now)
            .expect("whereabouts facet");
        assert_eq!(world.facet(facet).object_itself, Some(home));
        assert_eq!(world.facet(facet).value, world.dwelling(home_id(home)).address);
    }

    fn home_id(entity: Entity) -> crate::id::BuildingId {
        match entity {
            Entity::Dwelling(id) => id,
            _ => unreachable!(),
        }
    }
}
