mod common;

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use town_gen::config::Kin;
use town_gen::model::Sex;
use town_gen::sim::kinship::{self, kin_label};
use town_gen::sim::population::{create_person, person_ex_nihilo};

#[test]
fn three_generations_close_over_cousins_and_aunts() {
    let (mut world, _) = common::platted(1, town_gen::Config::default());
    let mut rng = SmallRng::seed_from_u64(11);
    let birth = world.now();

    // Grandparents, their two kids, outside spouses, and one grandchild each
    let grandma = person_ex_nihilo(&mut world, &mut rng, Some(Sex::Female), 70);
    let grandpa = person_ex_nihilo(&mut world, &mut rng, Some(Sex::Male), 72);
    let son = create_person(&mut world, &mut rng, Some(Sex::Male), birth, Some(grandma), Some(grandpa));
    let daughter = create_person(&mut world, &mut rng, Some(Sex::Female), birth, Some(grandma), Some(grandpa));
    let son_wife = person_ex_nihilo(&mut world, &mut rng, Some(Sex::Female), 40);
    let daughter_husband = person_ex_nihilo(&mut world, &mut rng, Some(Sex::Male), 40);
    let grandson = create_person(&mut world, &mut rng, Some(Sex::Male), birth, Some(son_wife), Some(son));
    let granddaughter =
        create_person(&mut world, &mut rng, Some(Sex::Female), birth, Some(daughter), Some(daughter_husband));

    let grandson_p = world.person(grandson);
    assert_eq!(grandson_p.legal.grandparents, BTreeSet::from([grandma, grandpa]));
    assert_eq!(grandson_p.legal.cousins, BTreeSet::from([granddaughter]));
    assert_eq!(grandson_p.legal.aunts_and_uncles, BTreeSet::from([daughter]));
    assert_eq!(kin_label(grandson_p, daughter), Some(Kin::AuntOrUncle));
    assert_eq!(world.person(daughter).sex, Sex::Female);

    let granddaughter_p = world.person(granddaughter);
    assert_eq!(granddaughter_p.legal.aunts_and_uncles, BTreeSet::from([son]));
    assert_eq!(world.person(son).sex, Sex::Male);
    assert_eq!(kin_label(granddaughter_p, grandson), Some(Kin::Cousin));
    assert_eq!(kin_label(granddaughter_p, grandpa), Some(Kin::Grandparent));

    // The spouses married in and are not blood relatives of the grandparents
    assert!(!world.person(grandma).legal.kids.contains(&son_wife));
    assert_eq!(world.person(grandma).legal.grandchildren, BTreeSet::from([grandson, granddaughter]));
    assert_eq!(world.person(son).legal.nieces_and_nephews, BTreeSet::from([granddaughter]));
    assert_eq!(world.person(son).legal.siblings, BTreeSet::from([daughter]));

    for person in world.people.values() {
        kinship::check_symmetry(&world, person).expect("kinship is symmetric");
    }
}

#[test]
fn adoption_changes_legal_but_not_biological_ties() {
    let (mut world, _) = common::platted(2, town_gen::Config::default());
    let mut rng = SmallRng::seed_from_u64(5);
    let birth = world.now();

    let mother = person_ex_nihilo(&mut world, &mut rng, Some(Sex::Female), 30);
    let father = person_ex_nihilo(&mut world, &mut rng, Some(Sex::Male), 30);
    let stepfather = person_ex_nihilo(&mut world, &mut rng, Some(Sex::Male), 35);
    let child = create_person(&mut world, &mut rng, None, birth, Some(mother), Some(father));

    kinship::adopt(&mut world, child, stepfather);

    let person = world.person(child);
    assert_eq!(person.father, Some(stepfather));
    assert_eq!(person.biological_father, Some(father));
    assert_eq!(person.legal.parents, BTreeSet::from([mother, stepfather]));
    assert_eq!(person.biological.parents, BTreeSet::from([mother, father]));
    assert!(!world.person(father).legal.kids.contains(&child));
    assert!(world.person(father).biological.kids.contains(&child));
    for person in world.people.values() {
        kinship::check_symmetry(&world, person).expect("kinship is symmetric");
    }
}

#[test]
fn a_late_baby_is_born_an_aunt_or_uncle() {
    let (mut world, _) = common::platted(3, town_gen::Config::default());
    let mut rng = SmallRng::seed_from_u64(17);
    let birth = world.now();

    let mother = person_ex_nihilo(&mut world, &mut rng, Some(Sex::Female), 40);
    let father = person_ex_nihilo(&mut world, &mut rng, Some(Sex::Male), 42);
    let elder = create_person(&mut world, &mut rng, Some(Sex::Female), birth, Some(mother), Some(father));
    let elder_husband = person_ex_nihilo(&mut world, &mut rng, Some(Sex::Male), 22);
    let grandkid = create_person(&mut world, &mut rng, None, birth, Some(elder), Some(elder_husband));

    let baby = create_person(&mut world, &mut rng, None, birth, Some(mother), Some(father));

    assert_eq!(world.person(baby).legal.siblings, BTreeSet::from([elder]));
    assert_eq!(world.person(baby).legal.nieces_and_nephews, BTreeSet::from([grandkid]));
    assert_eq!(world.person(baby).biological.nieces_and_nephews, BTreeSet::from([grandkid]));
    assert!(world.person(grandkid).legal.aunts_and_uncles.contains(&baby));
    assert_eq!(kin_label(world.person(grandkid), baby), Some(Kin::AuntOrUncle));
    assert_eq!(kin_label(world.person(baby), grandkid), Some(Kin::NieceOrNephew));
    for person in world.people.values() {
        kinship::check_symmetry(&world, person).expect("kinship is symmetric");
    }
}
