pub mod lots;
pub mod paths;
pub mod quadtree;
pub mod streets;

use rand::RngCore;

use crate::config::WorldGenConfig;
use crate::corpora::Corpora;
use crate::model::Town;

/// Plat a town: streets from a quadtree subdivision, lots along every leaf,
/// block distances and the downtown lot.
pub fn plat_town(config: &WorldGenConfig, corpora: &Corpora, rng: &mut dyn RngCore) -> Town {
    // 1. Subdivide the map around clustered sample points
    let points = quadtree::sample_points(config, rng);
    let cells = quadtree::leaves(config.size, &points, config.max_points_per_cell);

    // 2. Leaf edges become blocks, merged into streets
    let mut grid = streets::build_streets(&cells, config, corpora, rng);

    // 3. Lots and tracts with house numbers
    let lots = lots::plat_lots(&cells, &mut grid, config, rng);

    // 4. Distances and downtown
    let paths = paths::all_pairs(&grid.blocks);
    let mut town = Town {
        name: corpora.place_name(rng),
        size: config.size,
        streets: grid.streets,
        blocks: grid.blocks,
        lots,
        paths,
        downtown: None,
    };
    town.downtown = paths::downtown(&town);

    tracing::info!(
        town = %town.name,
        streets = town.streets.len(),
        blocks = town.blocks.len(),
        lots = town.lots.len(),
        "platted town"
    );
    town
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DistanceTable, LotKind};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn town(seed: u64) -> Town {
        let mut rng = SmallRng::seed_from_u64(seed);
        plat_town(&WorldGenConfig::default(), &Corpora::builtin(), &mut rng)
    }

    #[test]
    fn same_seed_same_town() {
        let (a, b) = (town(11), town(11));
        assert_eq!(a.name, b.name);
        assert_eq!(a.lots.len(), b.lots.len());
        let names = |t: &Town| t.streets.iter().map(|s| s.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&a), names(&b));
        assert_eq!(a.downtown, b.downtown);
    }

    #[test]
    fn every_lot_fronts_one_to_four_blocks() {
        let town = town(2);
        for lot in town.lots.iter().filter(|l| l.kind == LotKind::Parcel) {
            assert!((1..=4).contains(&lot.frontages.len()));
            for block in lot.blocks() {
                assert!(town.block(block).lots.contains(&lot.id));
            }
        }
    }

    #[test]
    fn town_is_connected() {
        let town = town(7);
        let first = town.blocks[0].id;
        for block in &town.blocks {
            assert_ne!(town.paths.get(first, block.id), DistanceTable::UNREACHABLE);
        }
        assert!(town.downtown.is_some());
    }
}
