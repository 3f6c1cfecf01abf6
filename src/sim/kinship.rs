//! Kinship closure. Every relative set is kept symmetric with its inverse
//! on the other person, separately for legal and biological lineages.

use std::collections::BTreeSet;

use crate::config::Kin;
use crate::id::PersonId;
use crate::model::person::FamilyTies;
use crate::model::{Person, Sex, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lineage {
    Legal,
    Biological,
}

fn ties(person: &Person, lineage: Lineage) -> &FamilyTies {
    match lineage {
        Lineage::Legal => &person.legal,
        Lineage::Biological => &person.biological,
    }
}

fn ties_mut(person: &mut Person, lineage: Lineage) -> &mut FamilyTies {
    match lineage {
        Lineage::Legal => &mut person.legal,
        Lineage::Biological => &mut person.biological,
    }
}

/// Union of one relative set over a group of people.
fn gather(
    world: &World,
    people: &BTreeSet<PersonId>,
    lineage: Lineage,
    select: fn(&FamilyTies) -> &BTreeSet<PersonId>,
) -> BTreeSet<PersonId> {
    people
        .iter()
        .flat_map(|p| select(ties(world.person(*p), lineage)).iter().copied())
        .collect()
}

/// Rebuild a person's relative sets in one lineage from `parents` and
/// register the person on every relative's inverse set. The person must
/// not have descendants yet: this runs at birth and at adoption.
pub fn close_kinship(
    world: &mut World,
    person: PersonId,
    lineage: Lineage,
    parents: BTreeSet<PersonId>,
) {
    // 1. Withdraw from the inverse sets of the old ties
    let old = ties(world.person(person), lineage).clone();
    apply_inverses(world, person, &old, lineage, false);

    // 2. Derive the new ties from the parents
    let grandparents = gather(world, &parents, lineage, |t| &t.parents);
    let greatgrandparents = gather(world, &grandparents, lineage, |t| &t.parents);
    let mut siblings = gather(world, &parents, lineage, |t| &t.kids);
    siblings.remove(&person);
    let aunts_and_uncles = gather(world, &parents, lineage, |t| &t.siblings);
    let cousins = gather(world, &aunts_and_uncles, lineage, |t| &t.kids);
    // An older sibling may already have kids of their own
    let nieces_and_nephews = gather(world, &siblings, lineage, |t| &t.kids);
    let new = FamilyTies {
        parents,
        kids: old.kids,
        siblings,
        grandparents,
        grandchildren: old.grandchildren,
        greatgrandparents,
        greatgrandchildren: old.greatgrandchildren,
        aunts_and_uncles,
        nieces_and_nephews,
        cousins,
    };

    // 3. Register on the inverse sets
    apply_inverses(world, person, &new, lineage, true);
    *ties_mut(world.person_mut(person), lineage) = new;
}

fn apply_inverses(
    world: &mut World,
    person: PersonId,
    ties: &FamilyTies,
    lineage: Lineage,
    insert: bool,
) {
    let pairs: [(&BTreeSet<PersonId>, fn(&mut FamilyTies) -> &mut BTreeSet<PersonId>); 7] = [
        (&ties.parents, |t| &mut t.kids),
        (&ties.grandparents, |t| &mut t.grandchildren),
        (&ties.greatgrandparents, |t| &mut t.greatgrandchildren),
        (&ties.siblings, |t| &mut t.siblings),
        (&ties.aunts_and_uncles, |t| &mut t.nieces_and_nephews),
        (&ties.nieces_and_nephews, |t| &mut t.aunts_and_uncles),
        (&ties.cousins, |t| &mut t.cousins),
    ];
    for (relatives, inverse) in pairs {
        for relative in relatives {
            let set = inverse(ties_mut(world.person_mut(*relative), lineage));
            if insert {
                set.insert(person);
            } else {
                set.remove(&person);
            }
        }
    }
}

/// Set both lineages' parents for a newborn and close both.
pub fn register_birth(
    world: &mut World,
    child: PersonId,
    mother: Option<PersonId>,
    father: Option<PersonId>,
) {
    let parents: BTreeSet<PersonId> = mother.into_iter().chain(father).collect();
    {
        let person = world.person_mut(child);
        person.mother = mother;
        person.father = father;
        person.biological_mother = mother;
        person.biological_father = father;
    }
    close_kinship(world, child, Lineage::Legal, parents.clone());
    close_kinship(world, child, Lineage::Biological, parents);
}

/// Make `parent` a legal parent of `child`, replacing the legal parent of
/// the same sex.
pub fn adopt(world: &mut World, child: PersonId, parent: PersonId) {
    let sex = world.person(parent).sex;
    let person = world.person_mut(child);
    let replaced = match sex {
        Sex::Male => person.father.replace(parent),
        Sex::Female => person.mother.replace(parent),
    };
    let mut parents = person.legal.parents.clone();
    if let Some(old) = replaced {
        parents.remove(&old);
    }
    parents.insert(parent);
    close_kinship(world, child, Lineage::Legal, parents);
}

/// The closest legal kin label `other` holds relative to `person`.
pub fn kin_label(person: &Person, other: PersonId) -> Option<Kin> {
    let t = &person.legal;
    let labels = [
        (&t.kids, Kin::Child),
        (&t.parents, Kin::Parent),
        (&t.grandchildren, Kin::Grandchild),
        (&t.siblings, Kin::Sibling),
        (&t.grandparents, Kin::Grandparent),
        (&t.greatgrandparents, Kin::Greatgrandparent),
        (&t.nieces_and_nephews, Kin::NieceOrNephew),
        (&t.aunts_and_uncles, Kin::AuntOrUncle),
        (&t.cousins, Kin::Cousin),
    ];
    labels
        .into_iter()
        .find(|(set, _)| set.contains(&other))
        .map(|(_, kin)| kin)
}

/// Check that every relative set has its inverse on the relative.
pub fn check_symmetry(world: &World, person: &Person) -> Result<(), String> {
    for lineage in [Lineage::Legal, Lineage::Biological] {
        let t = ties(person, lineage);
        let pairs: [(&str, &BTreeSet<PersonId>, fn(&FamilyTies) -> &BTreeSet<PersonId>); 10] = [
            ("parents", &t.parents, |r| &r.kids),
            ("kids", &t.kids, |r| &r.parents),
            ("grandparents", &t.grandparents, |r| &r.grandchildren),
            ("grandchildren", &t.grandchildren, |r| &r.grandparents),
            ("greatgrandparents", &t.greatgrandparents, |r| &r.greatgrandchildren),
            ("greatgrandchildren", &t.greatgrandchildren, |r| &r.greatgrandparents),
            ("siblings", &t.siblings, |r| &r.siblings),
            ("aunts_and_uncles", &t.aunts_and_uncles, |r| &r.nieces_and_nephews),
            ("nieces_and_nephews", &t.nieces_and_nephews, |r| &r.aunts_and_uncles),
            ("cousins", &t.cousins, |r| &r.cousins),
        ];
        for (name, relatives, inverse) in pairs {
            for relative in relatives {
                let Some(other) = world.people.get(relative) else {
                    return Err(format!("{} lists missing {name} {relative}", person.id));
                };
                if !inverse(ties(other, lineage)).contains(&person.id) {
                    return Err(format!(
                        "{:?} {name} of {} includes {relative} without the inverse",
                        lineage, person.id
                    ));
                }
            }
        }
    }
    Ok(())
}
