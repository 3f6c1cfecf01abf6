mod common;

use town_gen::model::{Entity, EvidenceKind, FacialFeature, FeatureType};
use town_gen::sim::beliefs::perception::observe;
use town_gen::sim::beliefs::{Belief, Conversation, consider_new_evidence, convey_statement};
use town_gen::sim::population::person_ex_nihilo;
use town_gen::sim::relationships;

const HAIR: FeatureType = FeatureType::Face(FacialFeature::HairColor);

#[test]
fn a_trusted_confident_teller_overturns_an_observation() {
    let (mut world, mut rng) = common::platted(17, common::certain_perception());
    let a = person_ex_nihilo(&mut world, &mut rng, None, 30);
    let b = person_ex_nihilo(&mut world, &mut rng, None, 30);
    let c = person_ex_nihilo(&mut world, &mut rng, None, 30);
    let subject = Entity::Person(b);

    observe(&mut world, &mut rng, a, subject, None);
    let observed = world.person(a).mind.models[&subject].get_facet(HAIR).expect("hair observed");
    let truth = world.true_value(subject, HAIR, None).expect("hair has a color").value;
    assert_eq!(world.facet(observed).value, truth);

    // c is sure of a different color
    let wrong = if truth == "black" { "red" } else { "black" }.to_string();
    let implant = world.add_evidence(EvidenceKind::Implant, subject, c, None);
    let held = consider_new_evidence(&mut world, c, Belief::new(subject, HAIR, wrong.clone()), implant, 100.0, None)
        .expect("c had no belief yet");

    relationships::meet(&mut world, a, c, None);
    world
        .person_mut(a)
        .relationships
        .get_mut(&c)
        .expect("a knows c now")
        .trust = 1.0;

    let mut conversation = Conversation::new(&world, None);
    assert!(convey_statement(&mut world, &mut rng, &mut conversation, c, a, subject, HAIR, None));

    let current = world.person(a).mind.models[&subject].get_facet(HAIR).expect("still believes something");
    let facet = world.facet(current);
    assert_ne!(current, observed);
    assert_eq!(facet.value, wrong);
    assert_ne!(facet.value, truth);
    assert_eq!(facet.predecessor, Some(observed));
    assert_eq!(facet.parent, Some(held));
    let statement = facet.latest_evidence().expect("statement evidence");
    assert_eq!(world.evidence_item(statement).source, c);
    assert!(matches!(world.evidence_item(statement).kind, EvidenceKind::Statement { recipient } if recipient == a));
}

#[test]
fn strangers_are_not_believed_over_their_own_eyes() {
    let (mut world, mut rng) = common::platted(18, common::certain_perception());
    let a = person_ex_nihilo(&mut world, &mut rng, None, 30);
    let b = person_ex_nihilo(&mut world, &mut rng, None, 30);
    let c = person_ex_nihilo(&mut world, &mut rng, None, 30);
    let subject = Entity::Person(b);

    observe(&mut world, &mut rng, a, subject, None);
    let observed = world.person(a).mind.models[&subject].get_facet(HAIR).expect("hair observed");
    let truth = world.facet(observed).value.clone();
    let wrong = if truth == "black" { "red" } else { "black" }.to_string();
    let implant = world.add_evidence(EvidenceKind::Implant, subject, c, None);
    consider_new_evidence(&mut world, c, Belief::new(subject, HAIR, wrong), implant, 100.0, None);

    let mut conversation = Conversation::new(&world, None);
    convey_statement(&mut world, &mut rng, &mut conversation, c, a, subject, HAIR, None);

    assert_eq!(world.person(a).mind.models[&subject].get_facet(HAIR), Some(observed));
}
