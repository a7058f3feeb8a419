#![allow(dead_code)]

use pricing_model::{PricingNet, Variant, arch::Layout};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Builds a net with weights drawn uniformly from `[-0.5, 0.5)`.
pub fn random_net(variant: Variant, seed: u64) -> PricingNet {
    let mut rng = StdRng::seed_from_u64(seed);
    let params: Vec<f32> = (0..Layout::of(variant).num_params())
        .map(|_| rng.random_range(-0.5..0.5))
        .collect();

    PricingNet::from_flat(variant, &params).unwrap()
}

/// Draws an input row inside the demo's slider ranges.
pub fn random_input(variant: Variant, rng: &mut impl Rng) -> Vec<f32> {
    let spot = rng.random_range(1.0..200.0);
    let maturity = rng.random_range(0.01..1.0);

    match variant {
        Variant::BlackScholes => vec![spot, maturity],
        Variant::Heston => vec![spot, rng.random_range(0.01..0.5), maturity],
    }
}
