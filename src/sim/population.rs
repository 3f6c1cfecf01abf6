//! Creating people: attributes at birth, ex nihilo generation for founders
//! and immigrants, and retconned immigrant families.

use std::collections::{BTreeMap, BTreeSet};

use rand::{Rng, RngCore};

use super::kinship;
use super::life;
use super::naming;
use super::random::{chance, gaussian, weighted_choice};
use crate::id::PersonId;
use crate::model::face::FeatureValue;
use crate::model::person::FamilyTies;
use crate::model::timestamp::DAYS_PER_YEAR;
use crate::model::{
    Face, FacialFeature, Mind, Person, Personality, Phase, Sex, Sexuality, SimTimestamp, Trait,
    World,
};

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

fn draw_sex(rng: &mut dyn RngCore) -> Sex {
    if rng.random_bool(0.5) { Sex::Male } else { Sex::Female }
}

/// Four-way partition: homosexual, bisexual, asexual, heterosexual.
pub fn draw_sexuality(world: &World, rng: &mut dyn RngCore, sex: Sex) -> Sexuality {
    let d = &world.config.demographics;
    let roll: f64 = rng.random();
    let (same, opposite) = if roll < d.homosexuality_incidence {
        (true, false)
    } else if roll < d.homosexuality_incidence + d.bisexuality_incidence {
        (true, true)
    } else if roll < d.homosexuality_incidence + d.bisexuality_incidence + d.asexuality_incidence
    {
        (false, false)
    } else {
        (false, true)
    };
    let (men, women) = match sex {
        Sex::Male => (same, opposite),
        Sex::Female => (opposite, same),
    };
    Sexuality {
        attracted_to_men: men,
        attracted_to_women: women,
    }
}

fn draw_personality(
    world: &World,
    rng: &mut dyn RngCore,
    parents: &[&Personality],
) -> Personality {
    let config = &world.config.personality;
    let mut personality = Personality::default();
    for t in Trait::ALL {
        let dist = config.distribution(*t);
        let value = if !parents.is_empty() && chance(rng, dist.heritability) {
            let takes_after = parents[rng.random_range(0..parents.len())];
            gaussian(rng, takes_after.get(*t), config.inheritance_sd)
        } else {
            gaussian(rng, dist.mean, dist.sd)
        };
        personality.set(*t, value.clamp(config.floor, config.cap));
    }
    personality
}

fn draw_memory(world: &World, rng: &mut dyn RngCore, sex: Sex, parents: &[f64]) -> f64 {
    let config = &world.config.memory;
    let mut memory = if !parents.is_empty() && chance(rng, config.heritability) {
        let takes_after = parents[rng.random_range(0..parents.len())];
        gaussian(rng, takes_after, config.heritability_sd)
    } else {
        gaussian(rng, config.mean, config.sd)
    };
    if sex == Sex::Male {
        memory -= config.sex_diff;
    }
    memory.clamp(config.floor_at_birth.min(config.cap), config.cap)
}

/// A value drawn from the population distribution of a feature.
pub fn population_feature_value(
    world: &World,
    rng: &mut dyn RngCore,
    feature: FacialFeature,
    sex: Sex,
) -> Option<String> {
    let dist = world.config.face.distribution(feature)?;
    let weights: Vec<(String, f64)> = dist
        .weights(sex)
        .iter()
        .map(|(v, w)| (v.clone(), *w))
        .collect();
    weighted_choice(rng, &weights)
}

fn draw_face(world: &World, rng: &mut dyn RngCore, sex: Sex, child: &Person) -> Face {
    let config = &world.config.face;
    let variants = config.variants_per_value.max(1);
    let mother = child.biological_mother.map(|m| world.person(m));
    let father = child.biological_father.map(|f| world.person(f));
    let grandparents: Vec<&Person> = child
        .biological
        .grandparents
        .iter()
        .map(|g| world.person(*g))
        .collect();

    let mut face = Face::default();
    for feature in FacialFeature::ALL {
        let Some(dist) = config.distribution(*feature) else {
            continue;
        };

        if *feature == FacialFeature::SkinColor {
            if let (Some(m), Some(f)) = (mother, father) {
                let blended = config.blend_skin_colors(
                    m.face.get(FacialFeature::SkinColor),
                    f.face.get(FacialFeature::SkinColor),
                );
                if let Some(value) = blended {
                    face.features.insert(
                        *feature,
                        FeatureValue {
                            value,
                            variant_id: rng.random_range(0..variants),
                            inherited_from: None,
                        },
                    );
                    continue;
                }
            }
        }

        // Relatives the child may take after, weighted by closeness
        let (same_parent, other_parent) = match sex {
            Sex::Male => (father, mother),
            Sex::Female => (mother, father),
        };
        let mut relatives: Vec<(&Person, f64)> = Vec::new();
        relatives.extend(same_parent.map(|p| (p, config.takes_after.same_sex_parent)));
        if !feature.is_sex_specific() {
            relatives.extend(other_parent.map(|p| (p, config.takes_after.other_sex_parent)));
        }
        for g in &grandparents {
            if !feature.is_sex_specific() || g.sex == sex {
                relatives.push((g, config.takes_after.grandparent / grandparents.len() as f64));
            }
        }
        let relatives: Vec<(&Person, f64)> = relatives
            .into_iter()
            .filter(|(p, _)| p.face.feature(*feature).is_some())
            .collect();

        let inherited = if !relatives.is_empty() && chance(rng, dist.heritability) {
            let indexed: Vec<(usize, f64)> =
                relatives.iter().enumerate().map(|(i, (_, w))| (i, *w)).collect();
            weighted_choice(rng, &indexed).and_then(|i| {
                let (relative, _) = relatives[i];
                let source = relative.face.feature(*feature)?;
                let variant_id = if chance(rng, config.chance_inherits_exact_variant) {
                    source.variant_id
                } else {
                    rng.random_range(0..variants)
                };
                Some(FeatureValue {
                    value: source.value.clone(),
                    variant_id,
                    inherited_from: Some(relative.id),
                })
            })
        } else {
            None
        };

        let value = match inherited {
            Some(v) => Some(v),
            None => population_feature_value(world, rng, *feature, sex).map(|value| FeatureValue {
                value,
                variant_id: rng.random_range(0..variants),
                inherited_from: None,
            }),
        };
        if let Some(v) = value {
            face.features.insert(*feature, v);
        }
    }
    face
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Create a person with the given biological parents (both optional), link
/// kinship and name them. The person starts outside the town.
pub fn create_person(
    world: &mut World,
    rng: &mut dyn RngCore,
    sex: Option<Sex>,
    birth: SimTimestamp,
    mother: Option<PersonId>,
    father: Option<PersonId>,
) -> PersonId {
    let id = PersonId(world.id_gen.next_id());
    let sex = sex.unwrap_or_else(|| draw_sex(rng));
    let infertility = match sex {
        Sex::Male => world.config.demographics.male_infertility_rate,
        Sex::Female => world.config.demographics.female_infertility_rate,
    };
    let person = Person {
        id,
        sex,
        sexuality: draw_sexuality(world, rng, sex),
        infertile: chance(rng, infertility),
        birth,
        death: None,
        first_name: String::new(),
        middle_name: String::new(),
        last_name: String::new(),
        suffix: String::new(),
        maiden_name: None,
        named_for: (None, None),
        mother: None,
        father: None,
        biological_mother: None,
        biological_father: None,
        legal: FamilyTies::default(),
        biological: FamilyTies::default(),
        home: None,
        occupation: None,
        occupations: Vec::new(),
        in_college: false,
        college_graduate: false,
        retired: false,
        in_town: false,
        ex_nihilo: mother.is_none() && father.is_none(),
        spouse: None,
        widowed: false,
        grieving: false,
        love_interest: None,
        sexual_partners: BTreeSet::new(),
        pregnancy: None,
        kids_get_hyphenated_surname: false,
        marriage: None,
        relationships: BTreeMap::new(),
        friends: BTreeSet::new(),
        enemies: BTreeSet::new(),
        acquaintances: BTreeSet::new(),
        best_friend: None,
        worst_enemy: None,
        salience: BTreeMap::new(),
        former_contractors: BTreeMap::new(),
        money: 0,
        life_events: Vec::new(),
        personality: Personality::default(),
        face: Face::default(),
        mind: Mind::default(),
        whereabouts: BTreeMap::new(),
        location: None,
    };
    world.people.insert(id, person);

    if mother.is_some() || father.is_some() {
        kinship::register_birth(world, id, mother, father);
    }

    // Heritable attributes need the parents linked first
    let parents: Vec<&Person> = [mother, father]
        .into_iter()
        .flatten()
        .map(|p| world.person(p))
        .collect();
    let personalities: Vec<&Personality> = parents.iter().map(|p| &p.personality).collect();
    let memories: Vec<f64> = parents.iter().map(|p| p.mind.memory).collect();
    let personality = draw_personality(world, rng, &personalities);
    let memory = draw_memory(world, rng, sex, &memories);
    let face = draw_face(world, rng, sex, world.person(id));
    {
        let person = world.person_mut(id);
        person.personality = personality;
        person.mind.memory = memory;
        person.face = face;
    }

    if mother.is_some() || father.is_some() {
        naming::name_newborn(world, rng, id);
    } else {
        let corpora = world.corpora.clone();
        let person = world.person_mut(id);
        person.first_name = corpora.first_name(sex, rng);
        person.middle_name = corpora.first_name(sex, rng);
        person.last_name = corpora.surname(rng);
    }
    id
}

/// A random birth date `age` years before now.
fn birth_for_age(world: &World, rng: &mut dyn RngCore, age: u32) -> SimTimestamp {
    let now = world.now();
    let day = rng.random_range(1..=DAYS_PER_YEAR);
    let year = now.year().saturating_sub(age);
    let birth = SimTimestamp::new(year, day, Phase::Day);
    // Born later in the year than today would make them a year too young
    if now.years_since(birth) < age {
        SimTimestamp::new(year.saturating_sub(1), day, Phase::Day)
    } else {
        birth
    }
}

/// A person with no parents, `age` years old, carrying outside money.
pub fn person_ex_nihilo(
    world: &mut World,
    rng: &mut dyn RngCore,
    sex: Option<Sex>,
    age: u32,
) -> PersonId {
    let birth = birth_for_age(world, rng, age);
    let id = create_person(world, rng, sex, birth, None, None);
    let money = world
        .config
        .economy
        .amount_of_money_generated_people_from_outside_city_start_with;
    let adult = age >= world.config.economy.age_people_start_working;
    if adult {
        world.person_mut(id).money = money;
    }
    id
}

/// Age of an immigrant hired in at `level`: more senior jobs draw older
/// people.
pub fn age_for_job_level(world: &World, rng: &mut dyn RngCore, level: u8) -> u32 {
    let d = &world.config.demographics;
    let per_level =
        rng.random_range(d.ex_nihilo_years_per_level_min..=d.ex_nihilo_years_per_level_max.max(d.ex_nihilo_years_per_level_min));
    d.ex_nihilo_age_base + u32::from(level) * per_level
}

/// An immigrant tuned to a job level, possibly arriving with a retconned
/// family. Returns the household with the immigrant first; nobody has moved
/// into town yet.
pub fn immigrant_household(world: &mut World, rng: &mut dyn RngCore, level: u8) -> Vec<PersonId> {
    let age = age_for_job_level(world, rng, level);
    let immigrant = person_ex_nihilo(world, rng, None, age);
    let mut household = vec![immigrant];
    let family_chance = world
        .config
        .demographics
        .chance_ex_nihilo_starts_with_family(age);
    if chance(rng, family_chance) {
        if let Some(spouse) = retcon_family(world, rng, immigrant, None) {
            household.push(spouse);
            household.extend(living_kids(world, immigrant));
        }
    }
    household
}

fn living_kids(world: &World, person: PersonId) -> Vec<PersonId> {
    world
        .person(person)
        .legal
        .kids
        .iter()
        .copied()
        .filter(|k| world.person(*k).is_alive())
        .collect()
}

/// Sex of a partner `person` would marry.
pub fn partner_sex(person: &Person) -> Sex {
    let same = person.sex;
    if person.sexuality.attracted_to(same.opposite()) || !person.sexuality.attracted_to(same) {
        same.opposite()
    } else {
        same
    }
}

/// Synthesize a spouse for an ex nihilo person, backdate the wedding and
/// replay the intervening years for pregnancies and births. Events during
/// the replay carry the retconned dates. Returns the spouse, or `None` when
/// the person is too young to have married.
pub fn retcon_family(
    world: &mut World,
    rng: &mut dyn RngCore,
    person: PersonId,
    spouse_age: Option<u32>,
) -> Option<PersonId> {
    let now = world.current_time;
    let d = world.config.demographics.clone();
    let (age, sex) = {
        let p = world.person(person);
        (p.age(now), partner_sex(p))
    };
    let spouse_age = spouse_age.unwrap_or_else(|| {
        let drawn = gaussian(rng, f64::from(age), 3.0).round() as i64;
        drawn.max(i64::from(AGE_OF_CONSENT)) as u32
    });
    let age_at_marriage = gaussian(rng, d.ex_nihilo_age_at_marriage_mean, d.ex_nihilo_age_at_marriage_sd)
        .max(d.ex_nihilo_age_at_marriage_floor)
        .round() as u32;
    let years_married = age.min(spouse_age).saturating_sub(age_at_marriage);
    if age.min(spouse_age) < age_at_marriage.max(AGE_OF_CONSENT) {
        return None;
    }

    let spouse = person_ex_nihilo(world, rng, Some(sex), spouse_age);
    {
        let own_sex = world.person(person).sex;
        let s = world.person_mut(spouse);
        match own_sex {
            Sex::Male => s.sexuality.attracted_to_men = true,
            Sex::Female => s.sexuality.attracted_to_women = true,
        }
    }

    // 1. The wedding
    let wedding_year = now.year() - years_married;
    world.retcon_time = Some(SimTimestamp::from_year(wedding_year));
    life::marry(world, rng, person, spouse);

    // 2. Replay each year of the marriage
    for year in wedding_year + 1..=now.year() {
        world.retcon_time = Some(SimTimestamp::from_year(year));
        life::family_year(world, rng, person, spouse);
    }
    world.retcon_time = None;
    Some(spouse)
}

/// Youngest age at which a retconned spouse may have married.
const AGE_OF_CONSENT: u32 = 17;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::corpora::Corpora;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::sync::Arc;

    fn world() -> World {
        World::new(Arc::new(Config::default()), Arc::new(Corpora::builtin()))
    }

    #[test]
    fn ex_nihilo_people_have_full_attributes() {
        let mut world = world();
        let mut rng = SmallRng::seed_from_u64(1);
        let id = person_ex_nihilo(&mut world, &mut rng, Some(Sex::Female), 30);
        let p = world.person(id);
        assert_eq!(p.age(world.now()), 30);
        assert!(!p.first_name.is_empty());
        assert!(!p.last_name.is_empty());
        assert!(p.face.features.contains_key(&FacialFeature::HairColor));
        assert!((-1.0..=1.0).contains(&p.personality.openness));
        assert!(p.mind.memory > 0.0);
        assert!(p.ex_nihilo);
        assert!(!p.in_town);
    }

    #[test]
    fn children_inherit_lineage() {
        let mut world = world();
        let mut rng = SmallRng::seed_from_u64(2);
        let mother = person_ex_nihilo(&mut world, &mut rng, Some(Sex::Female), 28);
        let father = person_ex_nihilo(&mut world, &mut rng, Some(Sex::Male), 29);
        let now = world.now();
        let child = create_person(&mut world, &mut rng, None, now, Some(mother), Some(father));
        let c = world.person(child);
        assert_eq!(c.mother, Some(mother));
        assert_eq!(c.biological_father, Some(father));
        assert_eq!(c.last_name, world.person(father).last_name);
        assert!(world.person(mother).legal.kids.contains(&child));
        assert!(!c.ex_nihilo);
    }

    #[test]
    fn retconned_family_is_married_with_backdated_wedding() {
        let mut world = world();
        let mut rng = SmallRng::seed_from_u64(3);
        let person = person_ex_nihilo(&mut world, &mut rng, Some(Sex::Male), 40);
        let spouse = retcon_family(&mut world, &mut rng, person, Some(38)).expect("old enough");
        assert_eq!(world.person(person).spouse, Some(spouse));
        assert_eq!(world.person(spouse).spouse, Some(person));
        assert!(world.retcon_time.is_none());
        let marriage = world.person(person).marriage.expect("marriage event");
        assert!(world.events[&marriage].timestamp.year() < world.now().year());
    }

    #[test]
    fn sexuality_partition_covers_everyone() {
        let world = world();
        let mut rng = SmallRng::seed_from_u64(4);
        let straight = (0..500)
            .map(|_| draw_sexuality(&world, &mut rng, Sex::Male))
            .filter(|s| s.attracted_to_women && !s.attracted_to_men)
            .count();
        assert!(straight > 400);
    }
}
