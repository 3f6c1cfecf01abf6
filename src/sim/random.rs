//! Random draws shared by generation and simulation.

use rand::Rng;
use rand::RngCore;

/// Bernoulli trial. Probabilities outside [0, 1] saturate.
pub fn chance(rng: &mut dyn RngCore, p: f64) -> bool {
    if p <= 0.0 {
        return false;
    }
    rng.random::<f64>() < p
}

/// Normal draw via the Box-Muller transform.
pub fn gaussian(rng: &mut dyn RngCore, mean: f64, sd: f64) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + z * sd
}

/// Pick an item with probability proportional to its weight. Items with
/// non-positive weight are never chosen.
pub fn weighted_choice<T: Clone>(rng: &mut dyn RngCore, items: &[(T, f64)]) -> Option<T> {
    let total: f64 = items.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    let mut roll = rng.random::<f64>() * total;
    for (item, weight) in items {
        let weight = weight.max(0.0);
        if weight <= 0.0 {
            continue;
        }
        if roll < weight {
            return Some(item.clone());
        }
        roll -= weight;
    }
    items
        .iter()
        .rev()
        .find(|(_, w)| *w > 0.0)
        .map(|(item, _)| item.clone())
}

/// Probabilities of picking the best, second and third candidate.
pub const TOP_THREE_WEIGHTS: [f64; 3] = [0.6, 0.3, 0.1];

/// The stochastic choice rule used for homes, hires and contractors: with
/// three or more candidates pick among the top three at 60/30/10, otherwise
/// take the best. Ties keep the candidates' original order.
pub fn select_top_three<T: Clone>(rng: &mut dyn RngCore, mut scored: Vec<(T, f64)>) -> Option<T> {
    if scored.is_empty() {
        return None;
    }
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    if scored.len() < 3 {
        return Some(scored[0].0.clone());
    }
    let roll = rng.random::<f64>();
    let index = if roll < TOP_THREE_WEIGHTS[0] {
        0
    } else if roll < TOP_THREE_WEIGHTS[0] + TOP_THREE_WEIGHTS[1] {
        1
    } else {
        2
    };
    Some(scored[index].0.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn top_three_boundaries() {
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(select_top_three::<u32>(&mut rng, vec![]), None);
        assert_eq!(select_top_three(&mut rng, vec![(7, 1.0)]), Some(7));
        assert_eq!(select_top_three(&mut rng, vec![(1, 1.0), (2, 5.0)]), Some(2));
        for _ in 0..100 {
            let pick = select_top_three(
                &mut rng,
                vec![(1, 1.0), (2, 4.0), (3, 3.0), (4, 2.0), (5, 0.0)],
            );
            assert!(matches!(pick, Some(2 | 3 | 4)), "{pick:?}");
        }
    }

    #[test]
    fn top_three_favors_the_best() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut best = 0;
        for _ in 0..1000 {
            if select_top_three(&mut rng, vec![(1, 3.0), (2, 2.0), (3, 1.0)]) == Some(1) {
                best += 1;
            }
        }
        assert!((500..700).contains(&best), "best picked {best} times");
    }

    #[test]
    fn gaussian_is_centered() {
        let mut rng = SmallRng::seed_from_u64(5);
        let n = 5000;
        let mean: f64 = (0..n).map(|_| gaussian(&mut rng, 10.0, 2.0)).sum::<f64>() / n as f64;
        assert!((mean - 10.0).abs() < 0.2, "mean {mean}");
    }

    #[test]
    fn weighted_choice_skips_zero_weights() {
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..50 {
            assert_eq!(weighted_choice(&mut rng, &[("a", 0.0), ("b", 2.0)]), Some("b"));
        }
        assert_eq!(weighted_choice::<&str>(&mut rng, &[("a", 0.0)]), None);
    }

    #[test]
    fn chance_extremes() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(!chance(&mut rng, 0.0));
        assert!(chance(&mut rng, 1.0));
    }
}
