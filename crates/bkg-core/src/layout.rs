//! Force-directed node placement for the neighbour network chart.
//!
//! Fruchterman-Reingold with a seeded RNG: the same graph and seed always
//! yields the same picture, so the chart doesn't jump between reloads.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Default seed for reproducible layouts.
pub const DEFAULT_SEED: u64 = 42;

const DEFAULT_ITERATIONS: usize = 50;
const MIN_DISTANCE: f64 = 0.01;

/// A node position, scaled into `[-1, 1]` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Spring layout parameters.
#[derive(Debug, Clone, Copy)]
pub struct SpringLayout {
    pub iterations: usize,
    pub seed: u64,
}

impl Default for SpringLayout {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            seed: DEFAULT_SEED,
        }
    }
}

impl SpringLayout {
    /// Place `node_count` nodes connected by undirected `edges` (index pairs).
    /// Edges pointing past `node_count` are ignored.
    pub fn place(&self, node_count: usize, edges: &[(usize, usize)]) -> Vec<Point> {
        match node_count {
            0 => return Vec::new(),
            1 => return vec![Point { x: 0.0, y: 0.0 }],
            _ => {}
        }

        let mut adjacency = vec![vec![false; node_count]; node_count];
        for &(a, b) in edges {
            if a < node_count && b < node_count && a != b {
                adjacency[a][b] = true;
                adjacency[b][a] = true;
            }
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut pos: Vec<(f64, f64)> = (0..node_count)
            .map(|_| (rng.gen::<f64>(), rng.gen::<f64>()))
            .collect();

        let k = (1.0 / node_count as f64).sqrt();
        let mut temperature = 0.1;
        let cooling = temperature / (self.iterations as f64 + 1.0);

        for _ in 0..self.iterations {
            let mut displacement = vec![(0.0f64, 0.0f64); node_count];
            for i in 0..node_count {
                for j in 0..node_count {
                    if i == j {
                        continue;
                    }
                    let dx = pos[i].0 - pos[j].0;
                    let dy = pos[i].1 - pos[j].1;
                    let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                    let attraction = if adjacency[i][j] { dist / k } else { 0.0 };
                    let force = k * k / (dist * dist) - attraction;
                    displacement[i].0 += dx * force;
                    displacement[i].1 += dy * force;
                }
            }

            for (p, (dx, dy)) in pos.iter_mut().zip(displacement) {
                let length = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                p.0 += dx * temperature / length;
                p.1 += dy * temperature / length;
            }
            temperature -= cooling;
        }

        rescale(pos)
    }
}

/// Centre on the mean and scale so the largest coordinate is 1.
fn rescale(pos: Vec<(f64, f64)>) -> Vec<Point> {
    let n = pos.len() as f64;
    let (mx, my) = pos.iter().fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
    let (mx, my) = (mx / n, my / n);

    let centred: Vec<(f64, f64)> = pos.into_iter().map(|(x, y)| (x - mx, y - my)).collect();
    let extent = centred
        .iter()
        .fold(0.0f64, |acc, (x, y)| acc.max(x.abs()).max(y.abs()));
    let scale = if extent > 0.0 { 1.0 / extent } else { 1.0 };

    centred
        .into_iter()
        .map(|(x, y)| Point {
            x: x * scale,
            y: y * scale,
        })
        .collect()
}

/// Edges from node `center` to every other node.
pub fn star_edges(center: usize, node_count: usize) -> Vec<(usize, usize)> {
    (0..node_count)
        .filter(|&i| i != center)
        .map(|i| (center, i))
        .collect()
}
