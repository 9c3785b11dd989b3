use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

const INPUT_NODES: u32 = 4;
const OUTPUT_NODES: u32 = 3;
const MAX_DRAWN_NODES: u32 = 6;
const PARTICLES_PER_CONNECTION: usize = 3;
const LEFT_PADDING: f64 = 40.0;
const CURVE_SAG: f64 = 50.0;
const PARTICLE_SIZE: f64 = 2.0;

const GREEN: (u8, u8, u8) = (34, 197, 94);
const BLUE: (u8, u8, u8) = (59, 130, 246);

/// Drawing surface dimensions, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 300.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    pub layer: usize,
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Connection {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

/// A dot travelling along one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    from: (f64, f64),
    to: (f64, f64),
    x: f64,
    y: f64,
    speed: f64,
    progress: f64,
}

impl Particle {
    fn new<R: Rng + ?Sized>(from: (f64, f64), to: (f64, f64), rng: &mut R) -> Self {
        Self {
            from,
            to,
            x: from.0,
            y: from.1,
            speed: 0.01 + rng.random::<f64>() * 0.01,
            progress: 0.0,
        }
    }

    /// Moves the particle one frame along its curve, wrapping back to the start.
    pub fn update(&mut self) {
        self.progress += self.speed;
        if self.progress >= 1.0 {
            self.progress = 0.0;
        }

        let t = self.progress;
        let (fx, fy) = self.from;
        let (tx, ty) = self.to;
        let cx = (fx + tx) / 2.0;
        let cy = (fy + ty) / 2.0 + CURVE_SAG;

        let a = (1.0 - t).powi(2);
        let b = 2.0 * (1.0 - t) * t;
        let c = t.powi(2);
        self.x = a * fx + b * cx + c * tx;
        self.y = a * fy + b * cy + c * ty;
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Fades in and out over the trip.
    pub fn alpha(&self) -> f64 {
        (self.progress * PI).sin()
    }

    pub fn state(&self) -> ParticleState {
        let alpha = self.alpha();
        ParticleState {
            x: self.x,
            y: self.y,
            alpha,
            radius: PARTICLE_SIZE * alpha,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleState {
    pub x: f64,
    pub y: f64,
    pub alpha: f64,
    pub radius: f64,
}

/// One rendered frame of the data-flow animation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub tick: u64,
    pub color: (u8, u8, u8),
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    pub particles: Vec<ParticleState>,
}

/// The network diagram and the particles flowing through it.
#[derive(Debug, Clone)]
pub struct Scene {
    tick: u64,
    color: (u8, u8, u8),
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    particles: Vec<Particle>,
}

impl Scene {
    /// Lays out a network with `layers` hidden layers of `neurons_per_layer` each.
    ///
    /// Input and output layers are fixed at 4 and 3 nodes; at most 6 nodes per
    /// layer are drawn.
    pub fn build<R: Rng + ?Sized>(
        layers: u32,
        neurons_per_layer: u32,
        accuracy: f64,
        canvas: Canvas,
        rng: &mut R,
    ) -> Self {
        // one entry per column, already capped to what gets drawn
        let sizes: Vec<u32> = std::iter::once(INPUT_NODES)
            .chain(
                std::iter::repeat(neurons_per_layer.min(MAX_DRAWN_NODES)).take(layers as usize),
            )
            .chain(std::iter::once(OUTPUT_NODES))
            .collect();

        let layer_width = canvas.width / (sizes.len() - 1) as f64;
        let column = |i: usize| i as f64 * layer_width + LEFT_PADDING;
        let row = |size: u32, k: u32| {
            let drawn = size.min(MAX_DRAWN_NODES);
            canvas.height / (drawn + 1) as f64 * (k + 1) as f64
        };

        let hidden = layers.max(1) as f64;
        let nodes = sizes
            .iter()
            .enumerate()
            .flat_map(|(i, &size)| {
                let opacity = (0.3 + (i as f64 / hidden) * 0.7).min(1.0);
                (0..size.min(MAX_DRAWN_NODES)).map(move |k| Node {
                    x: column(i),
                    y: row(size, k),
                    layer: i,
                    opacity,
                })
            })
            .collect();

        let mut connections = Vec::new();
        for (i, pair) in sizes.windows(2).enumerate() {
            let (from_size, to_size) = (pair[0], pair[1]);
            for from in 0..from_size.min(MAX_DRAWN_NODES) {
                for to in 0..to_size.min(MAX_DRAWN_NODES) {
                    connections.push(Connection {
                        from: (column(i), row(from_size, from)),
                        to: (column(i + 1), row(to_size, to)),
                    });
                }
            }
        }

        let particles = connections
            .iter()
            .flat_map(|c| std::iter::repeat(c).take(PARTICLES_PER_CONNECTION))
            .map(|c| Particle::new(c.from, c.to, rng))
            .collect();

        Self {
            tick: 0,
            color: if accuracy > 0.8 { GREEN } else { BLUE },
            nodes,
            connections,
            particles,
        }
    }

    /// Advances every particle by one frame.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.particles.iter_mut().for_each(Particle::update);
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn frame(&self) -> Frame {
        Frame {
            tick: self.tick,
            color: self.color,
            nodes: self.nodes.clone(),
            connections: self.connections.clone(),
            particles: self.particles.iter().map(Particle::state).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn scene(layers: u32, neurons: u32, accuracy: f64) -> Scene {
        let mut rng = StdRng::seed_from_u64(7);
        Scene::build(layers, neurons, accuracy, Canvas::default(), &mut rng)
    }

    #[test]
    fn drawn_nodes_are_capped_per_layer() {
        // 4 input, 3 hidden layers of 64 drawn as 6, 3 output
        let scene = scene(3, 64, 0.89);
        assert_eq!(scene.nodes().len(), 4 + 6 * 3 + 3);
        assert_eq!(scene.connections().len(), 4 * 6 + 6 * 6 + 6 * 6 + 6 * 3);
        assert_eq!(scene.particles().len(), scene.connections().len() * 3);
    }

    #[test]
    fn oversized_layers_lay_out_like_capped_ones() {
        let huge = scene(2, u32::MAX, 0.9);
        let capped = scene(2, 6, 0.9);
        assert_eq!(huge.nodes().len(), 4 + 6 * 2 + 3);
        assert_eq!(huge.connections(), capped.connections());
    }

    #[test]
    fn columns_are_evenly_spaced() {
        let scene = scene(1, 2, 0.5);
        // 3 layers over 600px: 300px apart, offset by 40
        let xs: Vec<_> = scene.connections().iter().map(|c| c.from.0).collect();
        assert!(xs.contains(&40.0));
        assert!(xs.contains(&340.0));
        assert!(scene.connections().iter().any(|c| c.to.0 == 640.0));
    }

    #[test]
    fn particle_speeds_are_bounded() {
        for p in scene(2, 8, 0.9).particles() {
            assert!(p.speed() >= 0.01 && p.speed() < 0.02);
        }
    }

    #[test]
    fn particles_wrap_and_stay_in_unit_progress() {
        let mut scene = scene(1, 3, 0.9);
        for _ in 0..250 {
            scene.advance();
            for p in scene.particles() {
                assert!((0.0..1.0).contains(&p.progress()));
                assert!(p.alpha() >= 0.0);
            }
        }
        assert_eq!(scene.tick(), 250);
    }

    #[test]
    fn color_depends_on_accuracy() {
        assert_eq!(scene(1, 3, 0.89).frame().color, GREEN);
        assert_eq!(scene(1, 3, 0.8).frame().color, BLUE);
    }

    #[test]
    fn curve_ends_at_the_target() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = Particle::new((0.0, 0.0), (100.0, 0.0), &mut rng);
        p.progress = 0.5 - p.speed;
        p.update();
        let state = p.state();
        // midpoint of the quadratic sits halfway down the sag
        assert!((state.x - 50.0).abs() < 1e-9);
        assert!((state.y - 25.0).abs() < 1e-9);
        assert!((state.alpha - 1.0).abs() < 1e-9);
    }
}
