#![allow(dead_code)]

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use town_gen::sim::Simulation;
use town_gen::worldgen::plat_town;
use town_gen::{Config, Corpora, World};

/// The small layout the scenarios run on, simulated `years` past founding
/// with no high-fidelity days.
pub fn config_for_years(years: u32) -> Config {
    let mut config = Config::default();
    config.world_gen.size = 16;
    config.world_gen.loci = 3;
    config.world_gen.samples = 32;
    config.time.year_worldgen_ends = config.time.year_city_gets_founded + years;
    config.time.high_fidelity_days = 0;
    config
}

/// A freshly founded town; no time has passed.
pub fn founded(seed: u64) -> Simulation {
    Simulation::new(config_for_years(0), seed).expect("default config founds a town")
}

/// An empty platted layout with nobody in it.
pub fn platted(seed: u64, config: Config) -> (World, SmallRng) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let config = Arc::new(config);
    let corpora = Arc::new(Corpora::builtin());
    let mut world = World::new(config.clone(), corpora.clone());
    world.town = plat_town(&config.world_gen, &corpora, &mut rng);
    (world, rng)
}

/// Perception never fails, so observed facets start out accurate.
pub fn certain_perception() -> Config {
    let mut config = Config::default();
    config.beliefs.perception_chance_floor = 1.0;
    config.beliefs.perception_chance_cap = 1.0;
    config
}

pub fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
