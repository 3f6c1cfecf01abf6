//! Point quadtree whose leaves become the town's city blocks.

use rand::Rng;
use rand::RngCore;

use crate::config::WorldGenConfig;
use crate::sim::random::gaussian;

/// A square cell of the map, `width` grid units on a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
    pub width: u32,
}

impl Cell {
    fn contains(&self, (px, py): (f64, f64)) -> bool {
        let (x, y, w) = (f64::from(self.x), f64::from(self.y), f64::from(self.width));
        px >= x && px < x + w && py >= y && py < y + w
    }

    fn quadrants(&self) -> [Cell; 4] {
        let half = self.width / 2;
        [
            Cell { x: self.x, y: self.y, width: half },
            Cell { x: self.x + half, y: self.y, width: half },
            Cell { x: self.x, y: self.y + half, width: half },
            Cell { x: self.x + half, y: self.y + half, width: half },
        ]
    }
}

/// Scatter sample points around Gaussian loci, clipped to the map.
pub fn sample_points(config: &WorldGenConfig, rng: &mut dyn RngCore) -> Vec<(f64, f64)> {
    let size = f64::from(config.size);
    let sd = size * config.spread;
    let clip = |v: f64| v.clamp(0.0, size - 1.0);

    let loci: Vec<(f64, f64)> = (0..config.loci)
        .map(|_| (gaussian(rng, size / 2.0, sd), gaussian(rng, size / 2.0, sd)))
        .collect();

    (0..config.samples)
        .map(|_| {
            let (cx, cy) = loci[rng.random_range(0..loci.len())];
            (clip(gaussian(rng, cx, sd)), clip(gaussian(rng, cy, sd)))
        })
        .collect()
}

/// Subdivide the map until no cell holds more than `max_points` points or
/// cells reach the minimum width of 2. Leaves tile the map in row-major
/// traversal order.
pub fn leaves(size: u32, points: &[(f64, f64)], max_points: usize) -> Vec<Cell> {
    let mut out = Vec::new();
    subdivide(Cell { x: 0, y: 0, width: size }, points, max_points, &mut out);
    out
}

fn subdivide(cell: Cell, points: &[(f64, f64)], max_points: usize, out: &mut Vec<Cell>) {
    let inside: Vec<(f64, f64)> = points.iter().copied().filter(|p| cell.contains(*p)).collect();
    if inside.len() <= max_points || cell.width <= 2 {
        out.push(cell);
        return;
    }
    for quadrant in cell.quadrants() {
        subdivide(quadrant, &inside, max_points, out);
    }
}
