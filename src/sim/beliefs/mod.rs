//! Mental models: creating, strengthening and replacing belief facets.
//!
//! Every facet is backed by evidence in the world log. A facet is never
//! edited in place once a different value is believed; the replacement
//! points back at it through `predecessor`, so a belief's history can be
//! walked back to the evidence that first formed it.

pub mod decay;
pub mod perception;
pub mod propagation;

use rand::RngCore;

use super::context::{Occasion, TickContext};
use super::relationships;
use super::system::{Fidelity, SimSystem};
use crate::id::{EvidenceId, FacetId, PersonId};
use crate::model::{Entity, EvidenceKind, EvidenceType, Facet, FeatureType, MentalModel, SimTimestamp, World};

pub use propagation::{Conversation, consider_new_evidence, convey_statement, tell_lie};

/// What a new facet believes and why.
#[derive(Debug, Clone)]
pub struct Belief {
    pub subject: Entity,
    pub feature: FeatureType,
    /// The half-day a whereabouts belief is about.
    pub when: Option<SimTimestamp>,
    pub value: String,
    pub object: Option<Entity>,
}

impl Belief {
    pub fn new(subject: Entity, feature: FeatureType, value: impl Into<String>) -> Self {
        Self {
            subject,
            feature,
            when: None,
            value: value.into(),
            object: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Facet bookkeeping
// ---------------------------------------------------------------------------

/// The owner's current facet for a feature of a subject.
pub fn current_facet(
    world: &World,
    owner: PersonId,
    subject: Entity,
    feature: FeatureType,
    when: Option<SimTimestamp>,
) -> Option<FacetId> {
    let model = world.person(owner).mind.models.get(&subject)?;
    match (feature, when) {
        (FeatureType::Whereabouts, Some(when)) => model.whereabouts_at(when),
        (FeatureType::Whereabouts, None) => None,
        _ => model.get_facet(feature),
    }
}

fn register(world: &mut World, evidence: EvidenceId, facet: FacetId) {
    if let Some(item) = world.evidence.get_mut(&evidence) {
        item.beliefs_evidenced.insert(facet);
    }
}

/// Create a facet from its first evidence and make it the owner's current
/// belief, replacing `predecessor`.
pub fn new_facet(
    world: &mut World,
    owner: PersonId,
    belief: Belief,
    evidence: EvidenceId,
    strength: f64,
    predecessor: Option<FacetId>,
    parent: Option<FacetId>,
) -> FacetId {
    let id = FacetId(world.id_gen.next_id());
    let cap = world.config.beliefs.facet_strength_cap;
    let facet = Facet {
        id,
        owner,
        subject: belief.subject,
        feature: belief.feature,
        value: belief.value,
        object_itself: belief.object,
        evidence: vec![evidence],
        predecessor,
        parent,
        strength: strength.min(cap),
        when: belief.when,
        created: world.now(),
    };
    world.facets.insert(id, facet);
    register(world, evidence, id);
    world.reinforced.insert(id);

    let model = world
        .person_mut(owner)
        .mind
        .models
        .entry(belief.subject)
        .or_insert_with(|| MentalModel::for_subject(belief.subject));
    match (belief.feature, belief.when) {
        (FeatureType::Whereabouts, Some(when)) => {
            model.set_whereabouts(when, id);
        }
        (feature, _) => {
            model.set_facet(feature, id);
        }
    }
    id
}

/// Supporting evidence for a facet: strength grows up to the cap. The same
/// evidence item counts once.
pub fn attach(world: &mut World, facet: FacetId, evidence: EvidenceId, strength: f64) {
    let cap = world.config.beliefs.facet_strength_cap;
    let f = world.facet_mut(facet);
    if f.evidence.contains(&evidence) {
        return;
    }
    f.evidence.push(evidence);
    f.strength = (f.strength + strength).min(cap);
    register(world, evidence, facet);
    world.reinforced.insert(facet);
}

/// Strength a fresh piece of non-propagated evidence lends.
pub fn base_strength(world: &World, kind: &EvidenceKind) -> f64 {
    world.config.beliefs.base_strength(kind.evidence_type())
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// The subject a person most likely means by a description: every given
/// feature must match a current facet; ties go to the more salient person.
pub fn closest_match(world: &World, owner: PersonId, description: &[(FeatureType, String)]) -> Option<Entity> {
    let person = world.person(owner);
    person.mind.closest_match(&world.facets, &person.salience, description)
}

// ---------------------------------------------------------------------------
// Implants
// ---------------------------------------------------------------------------

/// Seed everyone's knowledge of the people who matter most to them, as
/// high-fidelity simulation begins.
pub fn implant_knowledge(world: &mut World) {
    let beliefs = world.config.beliefs.clone();
    let residents: Vec<PersonId> = world.residents.iter().copied().collect();
    for owner in residents {
        let salient: Vec<(PersonId, f64)> = world
            .person(owner)
            .salience
            .iter()
            .filter(|(other, s)| **s >= beliefs.implant_salience_threshold && world.person(**other).is_present())
            .map(|(other, s)| (*other, *s))
            .collect();
        for (other, salience) in salient {
            let subject = Entity::Person(other);
            let interactions = world
                .person(owner)
                .relationships
                .get(&other)
                .map_or(0, |r| r.total_interactions);
            let evidence = world.add_evidence(EvidenceKind::Implant, subject, owner, None);
            let component = beliefs.implant_component(interactions, salience);
            for feature in FeatureType::person_features() {
                let Some(truth) = world.true_value(subject, feature, None) else {
                    continue;
                };
                if truth.value.is_empty() {
                    continue;
                }
                let strength =
                    beliefs.base_strength(EvidenceType::Implant) * component * beliefs.salience(feature);
                let belief = Belief {
                    subject,
                    feature,
                    when: None,
                    value: truth.value,
                    object: truth.object,
                };
                consider_new_evidence(world, owner, belief, evidence, strength, None);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Observation-driven build-up, then decay of whatever was not reinforced.
pub struct BeliefSystem;

impl BeliefSystem {
    fn observe_occasions(world: &mut World, rng: &mut dyn RngCore, occasions: &[Occasion]) {
        for occasion in occasions {
            for (place, people) in &occasion.groups {
                perception::observe_gathering(world, rng, *place, people);
            }
        }
    }
}

impl SimSystem for BeliefSystem {
    fn name(&self) -> &str {
        "beliefs"
    }

    fn runs_at(&self, fidelity: Fidelity) -> bool {
        fidelity == Fidelity::High
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        Self::observe_occasions(ctx.world, ctx.rng, ctx.occasions);
        decay::decay_unreinforced(ctx.world, ctx.rng, ctx.missing_days);
        ctx.world.reinforced.clear();
    }
}

/// Trust an owner places in what a source tells them.
pub fn trust_in(world: &World, owner: PersonId, source: PersonId) -> f64 {
    relationships::trust(world, owner, source)
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
        (world, SmallRng::seed_from_u64(81))
    }

    #[test]
    fn implants_cover_salient_people_only() {
        let (mut world, mut rng) = setup();
        let a = population::person_ex_nihilo(&mut world, &mut rng, Some(Sex::Female), 40);
        let b = population::person_ex_nihilo(&mut world, &mut rng, Some(Sex::Male), 40);
        let c = population::person_ex_nihilo(&mut world, &mut rng, Some(Sex::Male), 40);
        for p in [a, b, c] {
            world.person_mut(p).in_town = true;
            world.residents.insert(p);
        }
        world.person_mut(a).salience.insert(b, 5.0);
        world.person_mut(a).salience.insert(c, 0.5);

        implant_knowledge(&mut world);

        let models = &world.person(a).mind.models;
        assert!(models.contains_key(&Entity::Person(b)));
        assert!(!models.contains_key(&Entity::Person(c)));
        for id in models[&Entity::Person(b)].all_facet_ids() {
            assert!(world.facet_is_accurate(id));
        }
    }

    #[test]
    fn closest_match_prefers_the_more_salient_person() {
        let (mut world, mut rng) = setup();
        let a = population::person_ex_nihilo(&mut world, &mut rng, Some(Sex::Female), 40);
        let b = population::person_ex_nihilo(&mut world, &mut rng, Some(Sex::Male), 40);
        let c = population::person_ex_nihilo(&mut world, &mut rng, Some(Sex::Male), 40);
        for subject in [b, c] {
            let evidence = world.add_evidence(EvidenceKind::Implant, Entity::Person(subject), a, None);
            let belief = Belief::new(Entity::Person(subject), FeatureType::LastName, "Smith");
            new_facet(&mut world, a, belief, evidence, 10.0, None, None);
        }
        world.person_mut(a).salience.insert(c, 3.0);
        world.person_mut(a).salience.insert(b, 1.0);

        let description = [(FeatureType::LastName, "Smith".to_string())];
        assert_eq!(closest_match(&world, a, &description), Some(Entity::Person(c)));
        let nobody = [(FeatureType::LastName, "Jones".to_string())];
        assert_eq!(closest_match(&world, a, &nobody), None);
    }

    #[test]
    fn strength_is_capped() {
        let (mut world, mut rng) = setup();
        let a = population::person_ex_nihilo(&mut world, &mut rng, None, 40);
        let subject = Entity::Person(a);
        let evidence = world.add_evidence(EvidenceKind::Reflection, subject, a, None);
        let facet = new_facet(&mut world, a, Belief::new(subject, FeatureType::FirstName, "Ada"), evidence, 900.0, None, None);
        let more = world.add_evidence(EvidenceKind::Reflection, subject, a, None);
        attach(&mut world, facet, more, 900.0);
        assert_eq!(world.facet(facet).strength, world.config.beliefs.facet_strength_cap);
        assert!(world.reinforced.contains(&facet));
    }
}
