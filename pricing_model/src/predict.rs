use std::path::Path;

use crate::{PricingErr, PricingNet, Result, Variant, loader};

/// Loads the variant's parameters from `path` and prices a single input row.
///
/// The input width is checked before the file is touched, so a malformed request never pays
/// for a load.
///
/// # Errors
/// `PricingErr::InputShapeMismatch` for a row of the wrong width, `PricingErr::Load` if the
/// parameter file can't be loaded.
pub fn predict<P: AsRef<Path>>(variant: Variant, path: P, input: &[f32]) -> Result<f32> {
    let expected = variant.input_dim();
    if input.len() != expected {
        return Err(PricingErr::InputShapeMismatch {
            got: input.len(),
            expected,
        });
    }

    let net = loader::load(variant, path)?;
    evaluate(&net, input)
}

/// Prices a single input row with an already loaded net.
pub fn evaluate(net: &PricingNet, input: &[f32]) -> Result<f32> {
    net.evaluate_one(input)
}
