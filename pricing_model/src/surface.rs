use ndarray::prelude::*;

use crate::{MarketParams, PricingNet, Result, Variant};

/// Evenly spaced sample points between two bounds, both included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridAxis {
    pub min: f32,
    pub max: f32,
    pub points: usize,
}

impl GridAxis {
    pub fn new(min: f32, max: f32, points: usize) -> Self {
        Self { min, max, points }
    }

    pub fn values(&self) -> Array1<f32> {
        Array1::linspace(self.min, self.max, self.points)
    }
}

/// Prices on a spot × maturity grid. `prices[[i, j]]` is the price at `maturities[i]` and
/// `spots[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub spots: Array1<f32>,
    pub maturities: Array1<f32>,
    pub prices: Array2<f32>,
}

impl Surface {
    /// Iterates `(spot, maturity, price)` in row-major grid order.
    pub fn points(&self) -> impl Iterator<Item = (f32, f32, f32)> + '_ {
        self.prices.indexed_iter().map(|((i, j), &price)| {
            (self.spots[j], self.maturities[i], price)
        })
    }
}

/// Prices every point of the spot × maturity grid in a single batch.
///
/// # Arguments
/// * `net` - The model to evaluate.
/// * `spot` - The spot axis.
/// * `maturity` - The maturity axis.
/// * `volatility` - Held fixed across the grid; required by the Heston variant only.
///
/// # Returns
/// The price surface, or an error if the variant needs a volatility that wasn't given.
pub fn surface(
    net: &PricingNet,
    spot: GridAxis,
    maturity: GridAxis,
    volatility: Option<f32>,
) -> Result<Surface> {
    let variant: Variant = net.variant();
    let spots = spot.values();
    let maturities = maturity.values();
    let shape = (maturities.len(), spots.len());

    let mut x = Array2::<f32>::zeros((shape.0 * shape.1, variant.input_dim()));
    let mut rows = x.rows_mut().into_iter();
    for &t in &maturities {
        for &s in &spots {
            let params = MarketParams {
                spot: s,
                maturity: t,
                volatility,
            };
            let input = variant.input_vector(&params)?;
            if let Some(mut row) = rows.next() {
                row.assign(&aview1(&input));
            }
        }
    }

    let flat = net.evaluate(x.view())?;
    let prices = Array2::from_shape_fn(shape, |(i, j)| flat[i * shape.1 + j]);

    Ok(Surface {
        spots,
        maturities,
        prices,
    })
}
