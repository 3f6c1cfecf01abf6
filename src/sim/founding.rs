//! The town's first day: founding family, first firm, civic institutions.

use rand::RngCore;
use tracing::{info, warn};

use super::{business, housing, life, population};
use crate::id::PersonId;
use crate::model::{BusinessKind, World};

/// The founder and their spouse, married before the town existed.
fn founding_couple(world: &mut World, rng: &mut dyn RngCore) -> (PersonId, PersonId) {
    let founding = world.config.founding.clone();
    let founder = population::person_ex_nihilo(world, rng, None, founding.founder_age);
    world.person_mut(founder).money = founding.founder_money;

    let spouse = match population::retcon_family(world, rng, founder, Some(founding.founder_spouse_age)) {
        Some(spouse) => spouse,
        // Too young for a retconned past; they married just before arriving
        None => {
            let sex = population::partner_sex(world.person(founder));
            let spouse = population::person_ex_nihilo(world, rng, Some(sex), founding.founder_spouse_age);
            life::marry(world, rng, founder, spouse);
            spouse
        }
    };
    (founder, spouse)
}

/// Found the town on a freshly platted layout. Returns the founder.
pub fn found_town(world: &mut World, rng: &mut dyn RngCore) -> PersonId {
    let founding = world.config.founding.clone();

    // 1. Founding family
    let (founder, spouse) = founding_couple(world, rng);
    let mut family = vec![founder, spouse];
    family.extend(
        world
            .person(founder)
            .legal
            .kids
            .iter()
            .copied()
            .filter(|k| world.person(*k).is_alive()),
    );
    housing::arrive(world, &family);
    world.founder = Some(founder);
    info!(
        town = %world.town.name,
        founder = %founder,
        family = family.len(),
        "town founded"
    );

    // 2. The founder's construction firm builds itself
    if business::found_business(world, rng, BusinessKind::ConstructionFirm, Some(founder)).is_none() {
        warn!("no lot for the founder's construction firm");
    }

    // 3. Civic institutions, then businesses immigrants bring with them
    for kind in founding.public_institutions {
        business::found_business(world, rng, kind, None);
    }
    for kind in founding.immigrant_businesses {
        business::found_business(world, rng, kind, None);
    }

    // 4. A home for the founding family
    if housing::secure_home(world, rng, &family, &[founder, spouse]).is_none() {
        warn!(founder = %founder, "founding family found no home");
    }
    founder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::corpora::Corpora;
    use crate::model::OccupationKind;
    use crate::worldgen::plat_town;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::sync::Arc;

    #[test]
    fn founder_owns_the_first_construction_firm() {
        let mut rng = SmallRng::seed_from_u64(0);
        let config = Arc::new(Config::default());
        let corpora = Arc::new(Corpora::builtin());
        let mut world = World::new(config.clone(), corpora.clone());
        world.town = plat_town(&config.world_gen, &corpora, &mut rng);

        let founder = found_town(&mut world, &mut rng);

        let firm = world
            .businesses_of_kind(BusinessKind::ConstructionFirm)
            .next()
            .expect("construction firm")
            .id;
        let owner = world.business(firm).owner.expect("owned");
        assert_eq!(world.occupation(owner).person, founder);
        assert_eq!(world.occupation(owner).kind, OccupationKind::Owner);
        let spouse = world.person(founder).spouse.expect("married founder");
        assert_eq!(world.person(spouse).spouse, Some(founder));
        assert!(world.person(founder).home.is_some());
        for kind in [BusinessKind::CityHall, BusinessKind::Cemetery, BusinessKind::Park, BusinessKind::Hospital] {
            assert!(world.businesses_of_kind(kind).next().is_some(), "{kind} missing");
        }
    }
}
