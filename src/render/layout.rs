//! Seeded Fruchterman–Reingold spring layout.

use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    /// Optimal distance between nodes.
    pub k: f64,
    pub iterations: usize,
    pub seed: u64,
}

impl Default for SpringParams {
    fn default() -> Self {
        SpringParams {
            k: 0.35,
            iterations: 20,
            seed: 3,
        }
    }
}

const MIN_DISTANCE: f64 = 0.01;
const CONVERGENCE: f64 = 1e-4;

/// Positions indexed like the graph's nodes, centred on the origin and
/// scaled so the largest coordinate magnitude is 1. Edge weights act as
/// spring strengths. Same graph and params always give the same layout.
pub fn spring_layout(graph: &UnGraph<String, f64>, params: &SpringParams) -> Vec<[f64; 2]> {
    let n = graph.node_count();
    match n {
        0 => return Vec::new(),
        1 => return vec![[0.0, 0.0]],
        _ => {}
    }

    let mut adjacency = vec![vec![0.0; n]; n];
    for e in graph.edge_references() {
        let (a, b) = (e.source().index(), e.target().index());
        adjacency[a][b] = *e.weight();
        adjacency[b][a] = *e.weight();
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.r#gen(), rng.r#gen()]).collect();

    let span = |axis: usize, pos: &[[f64; 2]]| {
        let (lo, hi) = pos
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p[axis]), hi.max(p[axis]))
            });
        hi - lo
    };
    let mut temperature = span(0, &pos).max(span(1, &pos)) * 0.1;
    let cooling = temperature / (params.iterations as f64 + 1.0);
    let k = params.k;

    for _ in 0..params.iterations {
        let mut moved = 0.0;
        let mut next = pos.clone();
        for i in 0..n {
            let mut disp = [0.0, 0.0];
            for j in 0..n {
                if i == j {
                    continue;
                }
                let delta = [pos[i][0] - pos[j][0], pos[i][1] - pos[j][1]];
                let distance = delta[0].hypot(delta[1]).max(MIN_DISTANCE);
                let force = k * k / (distance * distance) - adjacency[i][j] * distance / k;
                disp[0] += delta[0] * force;
                disp[1] += delta[1] * force;
            }
            let length = disp[0].hypot(disp[1]);
            let length = if length < MIN_DISTANCE { 0.1 } else { length };
            let step = [disp[0] * temperature / length, disp[1] * temperature / length];
            next[i][0] += step[0];
            next[i][1] += step[1];
            moved += step[0] * step[0] + step[1] * step[1];
        }
        pos = next;
        temperature -= cooling;
        if moved.sqrt() / (n as f64) < CONVERGENCE {
            break;
        }
    }

    rescale(&mut pos);
    pos
}

fn rescale(pos: &mut [[f64; 2]]) {
    let n = pos.len() as f64;
    let mean = pos
        .iter()
        .fold([0.0, 0.0], |acc, p| [acc[0] + p[0] / n, acc[1] + p[1] / n]);
    let mut limit: f64 = 0.0;
    for p in pos.iter_mut() {
        p[0] -= mean[0];
        p[1] -= mean[1];
        limit = limit.max(p[0].abs()).max(p[1].abs());
    }
    if limit > 0.0 {
        for p in pos.iter_mut() {
            p[0] /= limit;
            p[1] /= limit;
        }
    }
}
