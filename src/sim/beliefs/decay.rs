//! Memory deterioration and confabulation.

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use super::{Belief, base_strength, new_facet};
use crate::id::{FacetId, PersonId};
use crate::model::{
    BusinessKind, DwellingKind, Entity, EvidenceKind, Facet, FeatureType, OccupationKind, Sex, Shift,
    World,
};
use crate::sim::population::population_feature_value;
use crate::sim::random::{chance, weighted_choice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pathway {
    Forgetting,
    Mutation,
    Transference,
}

/// What a borrowed memory should share with the one it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Likeness {
    Sex(Sex),
    Business(BusinessKind),
    House,
    Apartment,
}

fn likeness(world: &World, subject: Entity) -> Likeness {
    match subject {
        Entity::Person(id) => Likeness::Sex(world.person(id).sex),
        Entity::Business(id) => Likeness::Business(world.business(id).kind),
        Entity::Dwelling(id) => match world.dwelling(id).kind {
            DwellingKind::House => Likeness::House,
            DwellingKind::Apartment { .. } => Likeness::Apartment,
        },
    }
}

fn subject_sex(world: &World, subject: Entity) -> Option<Sex> {
    match subject {
        Entity::Person(id) => Some(world.person(id).sex),
        _ => None,
    }
}

/// Replace `facet` with a degraded version of itself. Mutation needs a
/// known transition for the believed value and transference needs another
/// subject to borrow from; either falls back to forgetting.
pub fn deteriorate(world: &mut World, rng: &mut dyn RngCore, facet: FacetId) -> FacetId {
    let old = world.facet(facet).clone();
    let weights = world.config.beliefs.deterioration_weights;
    let pathway = weighted_choice(
        rng,
        &[
            (Pathway::Forgetting, weights.forgetting),
            (Pathway::Mutation, weights.mutation),
            (Pathway::Transference, weights.transference),
        ],
    )
    .unwrap_or(Pathway::Forgetting);

    match pathway {
        Pathway::Mutation => {
            if let Some(id) = mutate(world, rng, &old) {
                return id;
            }
        }
        Pathway::Transference => {
            if let Some(id) = transfer(world, rng, &old) {
                return id;
            }
        }
        Pathway::Forgetting => {}
    }
    forget(world, &old)
}

fn replace(
    world: &mut World,
    old: &Facet,
    kind: EvidenceKind,
    value: String,
    object: Option<Entity>,
    parent: Option<FacetId>,
) -> FacetId {
    let strength = base_strength(world, &kind);
    let evidence = world.add_evidence(kind, old.subject, old.owner, None);
    let belief = Belief {
        subject: old.subject,
        feature: old.feature,
        when: old.when,
        value,
        object,
    };
    new_facet(world, old.owner, belief, evidence, strength, Some(old.id), parent)
}

fn forget(world: &mut World, old: &Facet) -> FacetId {
    replace(world, old, EvidenceKind::Forgetting, String::new(), None, Some(old.id))
}

/// Blank out `facet`, as when its subject no longer has the feature.
pub fn blank(world: &mut World, facet: FacetId) -> FacetId {
    let old = world.facet(facet).clone();
    forget(world, &old)
}

fn mutate(world: &mut World, rng: &mut dyn RngCore, old: &Facet) -> Option<FacetId> {
    let targets: Vec<(String, f64)> = world
        .config
        .beliefs
        .mutation_targets(old.feature, &old.value)?
        .iter()
        .map(|(v, w)| (v.clone(), *w))
        .collect();
    let value = weighted_choice(rng, &targets)?;
    let kind = EvidenceKind::Mutation {
        mutated_from: old.value.clone(),
    };
    Some(replace(world, old, kind, value, None, Some(old.id)))
}

/// Borrow the value the owner holds for the same feature of another
/// subject. People borrow from people, preferring the same sex; buildings
/// borrow from buildings, preferring the same kind.
fn transfer(world: &mut World, rng: &mut dyn RngCore, old: &Facet) -> Option<FacetId> {
    let like = likeness(world, old.subject);
    let mut candidates: Vec<(FacetId, Likeness)> = Vec::new();
    for (subject, model) in &world.person(old.owner).mind.models {
        if *subject == old.subject || subject.is_place() != old.subject.is_place() {
            continue;
        }
        let Some(id) = model.get_facet(old.feature) else {
            continue;
        };
        let facet = world.facet(id);
        if facet.is_forgotten() || facet.value == old.value {
            continue;
        }
        candidates.push((id, likeness(world, *subject)));
    }
    let alike: Vec<FacetId> = candidates
        .iter()
        .filter(|(_, l)| *l == like)
        .map(|(id, _)| *id)
        .collect();
    let source = match alike.choose(rng) {
        Some(id) => *id,
        None => candidates.choose(rng)?.0,
    };
    let donor = world.facet(source);
    let (value, object) = (donor.value.clone(), donor.object_itself);
    let kind = EvidenceKind::Transference {
        transferred_from: source,
    };
    Some(replace(world, old, kind, value, object, Some(source)))
}

/// A plausible value for a feature, drawn from what the town looks like
/// rather than from the subject.
fn confabulated_value(world: &World, rng: &mut dyn RngCore, subject: Entity, feature: FeatureType) -> Option<String> {
    let sex = subject_sex(world, subject).unwrap_or_else(|| if rng.random_bool(0.5) { Sex::Male } else { Sex::Female });
    let business_names: Vec<String> = world.businesses.values().map(|b| b.name.clone()).collect();
    match feature {
        FeatureType::Face(f) => population_feature_value(world, rng, f, sex),
        FeatureType::FirstName | FeatureType::MiddleName => Some(world.corpora.first_name(sex, rng)),
        FeatureType::LastName => Some(world.corpora.surname(rng)),
        FeatureType::Workplace | FeatureType::BuildingName | FeatureType::Whereabouts => {
            business_names.choose(rng).cloned()
        }
        FeatureType::JobTitle => OccupationKind::ALL.choose(rng).map(|k| k.title()),
        FeatureType::JobShift => Shift::ALL.choose(rng).map(|s| s.as_str().to_string()),
        FeatureType::HomeAddress | FeatureType::Address => {
            let addresses: Vec<String> = match subject {
                Entity::Business(_) => world.businesses.values().map(|b| b.address.clone()).collect(),
                _ => world.dwellings.values().map(|d| d.address.clone()).collect(),
            };
            addresses.choose(rng).cloned()
        }
        FeatureType::BuildingKind => match subject {
            Entity::Business(_) => BusinessKind::ALL.choose(rng).map(|k| k.display_name()),
            _ => ["house", "apartment"].choose(rng).map(|s| s.to_string()),
        },
        FeatureType::BlockName => {
            let names: Vec<String> = world.town.blocks.iter().map(|b| world.town.block_name(b.id)).collect();
            names.choose(rng).cloned()
        }
    }
}

/// Fill a forgotten facet with a made-up value.
pub fn confabulate(world: &mut World, rng: &mut dyn RngCore, facet: FacetId) -> Option<FacetId> {
    let old = world.facet(facet).clone();
    let value = confabulated_value(world, rng, old.subject, old.feature)?;
    if value.is_empty() {
        return None;
    }
    Some(replace(world, &old, EvidenceKind::Confabulation, value, None, None))
}

/// One timestep of memory decay for every resident, over `missing_days`
/// days. Facets reinforced during the step are left alone.
pub fn decay_unreinforced(world: &mut World, rng: &mut dyn RngCore, missing_days: u32) {
    let days = f64::from(missing_days.max(1));
    let owners: Vec<PersonId> = world.residents.iter().copied().collect();
    for owner in owners {
        decay_mind(world, rng, owner, days);
    }
}

fn decay_mind(world: &mut World, rng: &mut dyn RngCore, owner: PersonId, days: f64) {
    let memory = world.person(owner).mind.memory.max(0.01);
    let facets: Vec<FacetId> = world
        .person(owner)
        .mind
        .models
        .values()
        .flat_map(|m| m.all_facet_ids())
        .filter(|id| !world.reinforced.contains(id))
        .collect();
    for id in facets {
        let facet = world.facet(id);
        if facet.is_forgotten() {
            let p = world.config.beliefs.chance_of_confabulation_on_timestep * days;
            if chance(rng, p) {
                confabulate(world, rng, id);
            }
        } else {
            let base = world.config.beliefs.deterioration_chance(facet.feature);
            let p = base / memory / facet.strength.max(f64::EPSILON) * days;
            if chance(rng, p) {
                deteriorate(world, rng, id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::corpora::Corpora;
    use crate::model::FacialFeature;
    use crate::sim::beliefs::perception::observe;
    use crate::sim::business;
    use crate::sim::population;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::sync::Arc;

    fn setup(config: Config) -> (World, SmallRng, PersonId, PersonId) {
        let mut world = World::new(Arc::new(config), Arc::new(Corpora::builtin()));
        let mut rng = SmallRng::seed_from_u64(61);
        let a = population::person_ex_nihilo(&mut world, &mut rng, Some(Sex::Female), 30);
        let b = population::person_ex_nihilo(&mut world, &mut rng, Some(Sex::Female), 30);
        (world, rng, a, b)
    }

    fn certain_perception() -> Config {
        let mut config = Config::default();
        config.beliefs.perception_chance_floor = 1.0;
        config.beliefs.perception_chance_cap = 1.0;
        config
    }

    #[test]
    fn forgetting_leaves_an_empty_value_backed_by_forgetting_evidence() {
        let (mut world, mut rng, a, b) = setup(certain_perception());
        observe(&mut world, &mut rng, a, Entity::Person(b), None);
        let hair = FeatureType::Face(FacialFeature::HairColor);
        let original = world.person(a).mind.models[&Entity::Person(b)].get_facet(hair).expect("hair facet");

        let old = world.facet(original).clone();
        let forgotten = forget(&mut world, &old);

        let facet = world.facet(forgotten);
        assert!(facet.is_forgotten());
        assert_eq!(facet.predecessor, Some(original));
        let last = facet.latest_evidence().expect("evidence");
        assert!(matches!(world.evidence_item(last).kind, EvidenceKind::Forgetting));
        assert_eq!(world.person(a).mind.models[&Entity::Person(b)].get_facet(hair), Some(forgotten));
    }

    #[test]
    fn mutation_follows_the_transition_table() {
        let mut config = certain_perception();
        config.beliefs.deterioration_weights.forgetting = 0.0;
        config.beliefs.deterioration_weights.transference = 0.0;
        let (mut world, mut rng, a, b) = setup(config);
        observe(&mut world, &mut rng, a, Entity::Person(b), None);
        let glasses = FeatureType::Face(FacialFeature::Glasses);
        let Some(original) = world.person(a).mind.models[&Entity::Person(b)].get_facet(glasses) else {
            return;
        };
        let before = world.facet(original).value.clone();

        let mutated = deteriorate(&mut world, &mut rng, original);

        let after = &world.facet(mutated).value;
        assert_ne!(*after, before);
        assert!(["yes", "no"].contains(&after.as_str()));
    }

    #[test]
    fn transference_borrows_from_another_subject() {
        let mut config = certain_perception();
        config.beliefs.deterioration_weights.forgetting = 0.0;
        config.beliefs.deterioration_weights.mutation = 0.0;
        let (mut world, mut rng, a, b) = setup(config);
        let c = population::person_ex_nihilo(&mut world, &mut rng, Some(Sex::Female), 30);
        observe(&mut world, &mut rng, a, Entity::Person(b), None);
        observe(&mut world, &mut rng, a, Entity::Person(c), None);
        let first = world.person(a).mind.models[&Entity::Person(b)]
            .get_facet(FeatureType::FirstName)
            .expect("name facet");
        if world.person(b).first_name == world.person(c).first_name {
            return;
        }

        let moved = deteriorate(&mut world, &mut rng, first);

        let facet = world.facet(moved);
        assert_eq!(facet.value, world.person(c).first_name);
        let last = facet.latest_evidence().expect("evidence");
        assert!(matches!(world.evidence_item(last).kind, EvidenceKind::Transference { .. }));
    }

    #[test]
    fn transference_between_buildings_prefers_the_same_kind() {
        let mut config = certain_perception();
        config.beliefs.deterioration_weights.forgetting = 0.0;
        config.beliefs.deterioration_weights.mutation = 0.0;
        let config = Arc::new(config);
        let corpora = Arc::new(Corpora::builtin());
        let mut rng = SmallRng::seed_from_u64(62);
        let mut world = World::new(config.clone(), corpora.clone());
        world.town = crate::worldgen::plat_town(&config.world_gen, &corpora, &mut rng);
        let a = population::person_ex_nihilo(&mut world, &mut rng, None, 40);
        let mut found = |world: &mut World, kind, name: &str| {
            let id = business::found_business(world, &mut rng, kind, None).expect("vacant lots");
            world.business_mut(id).name = name.to_string();
            id
        };
        let precinct = found(&mut world, BusinessKind::PoliceStation, "Precinct House");
        let engine_one = found(&mut world, BusinessKind::FireStation, "Engine Company 1");
        let engine_two = found(&mut world, BusinessKind::FireStation, "Engine Company 2");
        for building in [precinct, engine_one, engine_two] {
            observe(&mut world, &mut rng, a, Entity::Business(building), None);
        }
        let name = world.person(a).mind.models[&Entity::Business(engine_one)]
            .get_facet(FeatureType::BuildingName)
            .expect("name facet");

        let moved = deteriorate(&mut world, &mut rng, name);

        assert_eq!(world.facet(moved).value, "Engine Company 2");
    }

    #[test]
    fn transference_falls_back_to_any_building() {
        let mut config = certain_perception();
        config.beliefs.deterioration_weights.forgetting = 0.0;
        config.beliefs.deterioration_weights.mutation = 0.0;
        let config = Arc::new(config);
        let corpora = Arc::new(Corpora::builtin());
        let mut rng = SmallRng::seed_from_u64(63);
        let mut world = World::new(config.clone(), corpora.clone());
        world.town = crate::worldgen::plat_town(&config.world_gen, &corpora, &mut rng);
        let a = population::person_ex_nihilo(&mut world, &mut rng, None, 40);
        let station = business::found_business(&mut world, &mut rng, BusinessKind::FireStation, None)
            .expect("vacant lots");
        let hall = business::found_business(&mut world, &mut rng, BusinessKind::CityHall, None)
            .expect("vacant lots");
        for building in [station, hall] {
            observe(&mut world, &mut rng, a, Entity::Business(building), None);
        }
        let address = world.person(a).mind.models[&Entity::Business(station)]
            .get_facet(FeatureType::Address)
            .expect("address facet");

        let moved = deteriorate(&mut world, &mut rng, address);

        assert_eq!(world.facet(moved).value, world.business(hall).address);
    }

    #[test]
    fn confabulation_fills_a_forgotten_facet() {
        let (mut world, mut rng, a, b) = setup(certain_perception());
        observe(&mut world, &mut rng, a, Entity::Person(b), None);
        let surname = world.person(a).mind.models[&Entity::Person(b)]
            .get_facet(FeatureType::LastName)
            .expect("surname facet");
        let old = world.facet(surname).clone();
        let forgotten = forget(&mut world, &old);

        let made_up = confabulate(&mut world, &mut rng, forgotten).expect("surnames are always available");

        let facet = world.facet(made_up);
        assert!(!facet.is_forgotten());
        assert_eq!(facet.predecessor, Some(forgotten));
    }

    #[test]
    fn reinforced_facets_do_not_decay() {
        let mut config = certain_perception();
        config.beliefs.chance_of_memory_deterioration_on_timestep =
            FeatureType::all().into_iter().map(|f| (f, 1000.0)).collect();
        let (mut world, mut rng, a, b) = setup(config);
        world.residents.insert(a);
        observe(&mut world, &mut rng, a, Entity::Person(b), None);
        let before = world.person(a).mind.models[&Entity::Person(b)].all_facet_ids();

        decay_unreinforced(&mut world, &mut rng, 1);
        assert_eq!(world.person(a).mind.models[&Entity::Person(b)].all_facet_ids(), before);

        world.reinforced.clear();
        decay_unreinforced(&mut world, &mut rng, 1);
        assert_ne!(world.person(a).mind.models[&Entity::Person(b)].all_facet_ids(), before);
    }
}
