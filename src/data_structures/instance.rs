//! Instance placement.
//!
//! Every tree and rock is one [`InstancePosition`] on the ground plane. The set is
//! generated once at startup and iterated unchanged every frame.

use cgmath::Vector3;
use rand::{Rng, distributions::Uniform, prelude::Distribution, rngs::ThreadRng};

/// Where one instance of an asset stands. `y` is always 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstancePosition(pub Vector3<f32>);

impl InstancePosition {
    pub fn new(x: f32, z: f32) -> Self {
        Self(Vector3::new(x, 0.0, z))
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.0)
    }
}

/// Scatters instances uniformly over a square centred on the origin.
///
/// [`PlacementGenerator::new`] draws from the thread-local RNG, so two runs never
/// produce the same forest. Inject a seeded RNG with [`PlacementGenerator::with_rng`]
/// when the layout has to be reproducible.
#[derive(Debug)]
pub struct PlacementGenerator<R: Rng = ThreadRng> {
    rng: R,
}

impl PlacementGenerator<ThreadRng> {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for PlacementGenerator<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> PlacementGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Returns exactly `count` positions with x and z in `[-extent/2, extent/2)`.
    ///
    /// A non-positive or non-finite `extent` collapses every position onto the origin.
    pub fn generate(&mut self, count: usize, extent: f32) -> Vec<InstancePosition> {
        if !(extent.is_finite() && extent > 0.0) {
            log::warn!("Placement extent {extent} is not a positive size; stacking {count} instances at the origin.");
            return vec![InstancePosition::new(0.0, 0.0); count];
        }
        let half = extent / 2.0;
        let uniform = Uniform::new(-half, half);
        (0..count)
            .map(|_| {
                let (x, z) = (uniform.sample(&mut self.rng), uniform.sample(&mut self.rng));
                InstancePosition::new(x, z)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn generates_exactly_count_positions_inside_the_square() {
        let mut placement = PlacementGenerator::with_rng(StdRng::seed_from_u64(7));
        for (count, extent) in [(0, 1.0), (1, 0.5), (30, 200.0), (500, 3.0)] {
            let positions = placement.generate(count, extent);
            assert_eq!(positions.len(), count);
            for InstancePosition(p) in positions {
                assert_eq!(p.y, 0.0);
                assert!(-extent / 2.0 <= p.x && p.x < extent / 2.0, "x = {}", p.x);
                assert!(-extent / 2.0 <= p.z && p.z < extent / 2.0, "z = {}", p.z);
            }
        }
    }

    #[test]
    fn seeded_generators_agree() {
        let a = PlacementGenerator::with_rng(StdRng::seed_from_u64(42)).generate(20, 200.0);
        let b = PlacementGenerator::with_rng(StdRng::seed_from_u64(42)).generate(20, 200.0);
        assert_eq!(a, b);
    }

    #[test]
    fn positions_spread_over_both_axes() {
        let positions =
            PlacementGenerator::with_rng(StdRng::seed_from_u64(3)).generate(200, 200.0);
        assert!(positions.iter().any(|p| p.0.x < 0.0) && positions.iter().any(|p| p.0.x > 0.0));
        assert!(positions.iter().any(|p| p.0.z < 0.0) && positions.iter().any(|p| p.0.z > 0.0));
    }

    #[test]
    fn unseeded_generator_produces_positions() {
        assert_eq!(PlacementGenerator::new().generate(5, 10.0).len(), 5);
    }

    #[test]
    fn degenerate_extent_stacks_at_origin() {
        let positions = PlacementGenerator::new().generate(3, 0.0);
        assert_eq!(positions, vec![InstancePosition::new(0.0, 0.0); 3]);
    }

    #[test]
    fn world_matrix_is_a_pure_translation() {
        let m = InstancePosition::new(4.0, -2.0).to_matrix();
        assert_eq!(m.w.truncate(), Vector3::new(4.0, 0.0, -2.0));
        let mut rest = m;
        rest.w = cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(rest, cgmath::Matrix4::identity());
    }
}
