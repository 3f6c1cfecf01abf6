mod common;

use town_gen::sim::invariants::{check_layout, check_world};

#[test]
fn low_fidelity_years_keep_the_world_consistent() {
    let mut sim = common::founded(8);
    check_layout(&sim.world.town).expect("layout is consistent");
    for _ in 0..4 {
        sim.step().expect("a year passes");
        check_world(&sim.world).expect("world stays consistent");
    }
    assert!(!sim.world.residents.is_empty());
}

#[test]
fn high_fidelity_days_keep_the_world_consistent() {
    let mut config = common::config_for_years(2);
    config.time.high_fidelity_days = 2;
    let mut sim = town_gen::Simulation::new(config, 9).expect("town founded");
    sim.run_to_gameplay().expect("reaches gameplay");
    check_world(&sim.world).expect("world stays consistent");

    // Everyone present has at least reflected on themselves
    let reflecting = sim
        .world
        .residents
        .iter()
        .filter(|p| !sim.world.person(**p).mind.models.is_empty())
        .count();
    assert!(reflecting > 0);
}
