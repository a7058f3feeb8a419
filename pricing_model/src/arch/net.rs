use ndarray::prelude::*;

use super::{Layout, activations::ActFn, layers::Dense};
use crate::{PricingErr, Result, Variant};

/// A parametric pricing model: three dense layers with tanh between them, mapping an input
/// row of the variant's width to a single price.
///
/// The net is immutable once built, so evaluating it never changes its output and a shared
/// reference can be used from several threads at once.
#[derive(Clone, Debug)]
pub struct PricingNet {
    variant: Variant,
    layers: Vec<Dense>,
}

impl PricingNet {
    /// Creates a new `PricingNet` for `variant` with every parameter set to zero.
    pub fn new(variant: Variant) -> Self {
        let layers = Layout::of(variant)
            .layers()
            .iter()
            .map(|shape| Dense::zeros(shape.dim, shape.activated.then(ActFn::tanh)))
            .collect();

        Self { variant, layers }
    }

    /// Creates a new `PricingNet` from a flat parameter slice, layer by layer, each layer
    /// being its `(out, in)` weights followed by its biases.
    ///
    /// # Errors
    /// `PricingErr::ParamCount` if `params` doesn't match the variant's architecture.
    pub fn from_flat(variant: Variant, params: &[f32]) -> Result<Self> {
        let layout = Layout::of(variant);
        let expected = layout.num_params();
        if params.len() != expected {
            return Err(PricingErr::ParamCount {
                got: params.len(),
                expected,
            });
        }

        let mut rest = params;
        let mut layers = Vec::with_capacity(layout.layers().len());
        for shape in layout.layers() {
            let chunk;
            (chunk, rest) = rest.split_at(shape.size());
            layers.push(Dense::from_flat(
                shape.dim,
                shape.activated.then(ActFn::tanh),
                chunk,
            )?);
        }

        Ok(Self { variant, layers })
    }

    /// Assembles a net from layers already checked against the variant's layout.
    pub(crate) fn from_layers(variant: Variant, layers: Vec<Dense>) -> Self {
        Self { variant, layers }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    /// Returns the amount of parameters in the net.
    pub fn num_params(&self) -> usize {
        self.layers.iter().map(Dense::size).sum()
    }

    /// Returns every parameter in the order `from_flat` reads them.
    pub fn to_flat(&self) -> Vec<f32> {
        self.layers
            .iter()
            .flat_map(|layer| {
                let weights = layer.weights();
                let biases = layer.biases();
                weights.iter().chain(biases).copied().collect::<Vec<_>>()
            })
            .collect()
    }

    /// Evaluates a batch of input rows.
    ///
    /// # Arguments
    /// * `x` - One sample per row, one column per input of the variant.
    ///
    /// # Returns
    /// One price per row, or `PricingErr::InputShapeMismatch` if the column count is wrong.
    pub fn evaluate(&self, x: ArrayView2<f32>) -> Result<Array1<f32>> {
        let expected = self.variant.input_dim();
        if x.ncols() != expected {
            return Err(PricingErr::InputShapeMismatch {
                got: x.ncols(),
                expected,
            });
        }

        log::debug!(rows = x.nrows(); "evaluating {} batch", self.variant);

        let a = self
            .layers
            .iter()
            .fold(x.to_owned(), |a, layer| layer.forward(a.view()));

        let prices = a.index_axis_move(Axis(1), 0);
        if prices.iter().any(|p| !p.is_finite()) {
            log::warn!("{} model produced a non-finite price", self.variant);
        }

        Ok(prices)
    }

    /// Evaluates a single input row.
    pub fn evaluate_one(&self, input: &[f32]) -> Result<f32> {
        let x = aview1(input).insert_axis(Axis(0));
        let prices = self.evaluate(x)?;

        Ok(prices[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a net whose every parameter is `value`.
    fn constant_net(variant: Variant, value: f32) -> PricingNet {
        let n = Layout::of(variant).num_params();
        PricingNet::from_flat(variant, &vec![value; n]).unwrap()
    }

    #[test]
    fn zero_net_prices_zero() {
        let net = PricingNet::new(Variant::BlackScholes);

        assert_eq!(net.evaluate_one(&[100.0, 0.5]).unwrap(), 0.0);
        assert_eq!(net.evaluate_one(&[-3.0, 1e6]).unwrap(), 0.0);
    }

    #[test]
    fn constant_net_matches_hand_computation() {
        let c = 0.01_f32;
        let net = constant_net(Variant::BlackScholes, c);
        let (s, t) = (1.0_f32, 0.5_f32);

        let h1 = (c * (s + t) + c).tanh();
        let h2 = (c * 64.0 * h1 + c).tanh();
        let expected = c * 64.0 * h2 + c;

        approx::assert_relative_eq!(net.evaluate_one(&[s, t]).unwrap(), expected, epsilon = 1e-5);
    }

    #[test]
    fn rejects_wrong_input_width() {
        let bs = PricingNet::new(Variant::BlackScholes);
        let heston = PricingNet::new(Variant::Heston);

        assert!(matches!(
            bs.evaluate_one(&[1.0, 0.2, 0.5]),
            Err(PricingErr::InputShapeMismatch {
                got: 3,
                expected: 2
            })
        ));
        assert!(matches!(
            heston.evaluate_one(&[1.0, 0.5]),
            Err(PricingErr::InputShapeMismatch {
                got: 2,
                expected: 3
            })
        ));
    }

    #[test]
    fn flat_round_trip_preserves_layer_order() {
        let n = Layout::of(Variant::Heston).num_params();
        let params: Vec<f32> = (0..n).map(|i| i as f32).collect();

        let net = PricingNet::from_flat(Variant::Heston, &params).unwrap();

        assert_eq!(net.num_params(), n);
        assert_eq!(net.layers()[0].weights()[[0, 1]], 1.0);
        assert_eq!(net.layers()[0].biases()[0], 192.0);
        assert_eq!(net.to_flat(), params);
    }

    #[test]
    fn from_flat_rejects_wrong_count() {
        let err = PricingNet::from_flat(Variant::BlackScholes, &[0.0; 10]).unwrap_err();
        assert!(matches!(err, PricingErr::ParamCount { got: 10, .. }));
    }

    #[test]
    fn batch_runs_through_every_layer_in_order() {
        let n = Layout::of(Variant::BlackScholes).num_params();
        let params: Vec<f32> = (0..n).map(|i| ((i % 7) as f32 - 3.0) * 0.01).collect();
        let net = PricingNet::from_flat(Variant::BlackScholes, &params).unwrap();
        let x = Array2::from_shape_vec((3, 2), vec![100.0, 0.5, 50.0, 0.1, 1.0, 1.0]).unwrap();

        let [l0, l1, l2] = net.layers() else {
            panic!("expected three layers");
        };
        let expected = l2.forward(l1.forward(l0.forward(x.view()).view()).view());
        let prices = net.evaluate(x.view()).unwrap();

        assert_eq!(prices.len(), 3);
        assert_eq!(prices, expected.column(0));
    }

    #[test]
    fn empty_batch_yields_no_prices() {
        let net = constant_net(Variant::Heston, 0.3);
        let x = Array2::<f32>::zeros((0, 3));

        assert_eq!(net.evaluate(x.view()).unwrap().len(), 0);
    }
}
