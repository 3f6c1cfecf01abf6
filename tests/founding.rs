mod common;

use town_gen::model::{BusinessKind, OccupationKind};
use town_gen::sim::generate_world;

#[test]
fn founding_year_establishes_the_town() {
    let sim = generate_world(common::config_for_years(1), 0).expect("generation succeeds");
    let world = &sim.world;
    assert_eq!(world.current_time.year(), world.config.time.year_city_gets_founded + 1);

    let founder = world.founder.expect("a founder");
    let owned_by_founder = world.businesses_of_kind(BusinessKind::ConstructionFirm).any(|firm| {
        firm.owner
            .is_some_and(|o| world.occupation(o).person == founder && world.occupation(o).kind == OccupationKind::Owner)
    });
    assert!(owned_by_founder, "the founder owns a construction firm");

    for kind in [
        BusinessKind::CityHall,
        BusinessKind::Hospital,
        BusinessKind::Cemetery,
        BusinessKind::Park,
    ] {
        assert!(world.businesses_of_kind(kind).next().is_some(), "no {kind} in town");
    }

    let spouse = world.person(founder).spouse.expect("the founder is married");
    assert_eq!(world.person(spouse).spouse, Some(founder));
}

#[test]
fn generation_is_deterministic() {
    let a = generate_world(common::config_for_years(3), 7).expect("generation succeeds");
    let b = generate_world(common::config_for_years(3), 7).expect("generation succeeds");
    let (a, b) = (a.world.snapshot(), b.world.snapshot());
    assert_eq!(a.town, b.town);
    assert_eq!(a.residents, b.residents);
    assert_eq!(a.businesses, b.businesses);
    assert_eq!(a.events, b.events);
}

#[test]
fn every_employee_works_where_they_are_listed() {
    let sim = common::founded(4);
    let world = &sim.world;
    assert!(!world.residents.is_empty());
    for business in world.businesses.values() {
        for occupation in &business.employees {
            let occupation = world.occupation(*occupation);
            assert!(occupation.is_active());
            assert_eq!(occupation.company, business.id);
            assert_eq!(world.person(occupation.person).occupation, Some(occupation.id));
        }
    }
    town_gen::sim::invariants::check_world(world).expect("founding leaves a consistent world");
}
