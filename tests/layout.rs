mod common;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use town_gen::model::{DistanceTable, LotKind};
use town_gen::sim::invariants::check_layout;
use town_gen::worldgen::{paths, plat_town};
use town_gen::Corpora;

fn platted(seed: u64) -> town_gen::model::Town {
    let config = common::config_for_years(0);
    let mut rng = SmallRng::seed_from_u64(seed);
    plat_town(&config.world_gen, &Corpora::builtin(), &mut rng)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn paths_are_symmetric_and_downtown_is_densest(seed in any::<u64>()) {
        let town = platted(seed);
        prop_assert!(check_layout(&town).is_ok());

        for a in &town.blocks {
            prop_assert_eq!(town.paths.get(a.id, a.id), 0);
            for b in &town.blocks {
                prop_assert_eq!(town.paths.get(a.id, b.id), town.paths.get(b.id, a.id));
                if a.neighbors.contains(&b.id) {
                    prop_assert_eq!(town.paths.get(a.id, b.id), 1);
                }
            }
        }

        let downtown = town.downtown.expect("a platted town has parcels");
        prop_assert_eq!(town.lot(downtown).kind, LotKind::Parcel);
        let density = town.tertiary_density(downtown);
        for lot in town.lots.iter().filter(|l| l.kind == LotKind::Parcel) {
            prop_assert!(town.tertiary_density(lot.id) <= density);
        }
    }
}

#[test]
fn shortest_paths_agree_with_the_table() {
    let town = platted(9);
    for a in town.blocks.iter().step_by(3) {
        for b in town.blocks.iter().step_by(5) {
            let hops = paths::shortest_path(&town.blocks, a.id, b.id).unwrap_or(DistanceTable::UNREACHABLE);
            assert_eq!(town.paths.get(a.id, b.id), hops);
        }
    }
}
