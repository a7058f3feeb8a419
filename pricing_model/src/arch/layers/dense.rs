use ndarray::{linalg, prelude::*};

use crate::{PricingErr, Result, arch::activations::ActFn};

/// A fully connected layer, `a = act_fn(x · Wᵀ + b)`.
///
/// Weights are stored `(out, in)`, the same orientation trained parameter files use, so a
/// stored tensor maps onto the layer without transposing.
#[derive(Clone, Debug)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
    weights: Array2<f32>,
    biases: Array1<f32>,
}

impl Dense {
    /// Creates a new `Dense` with every weight and bias set to zero.
    ///
    /// # Arguments
    /// * `dim` - The `(in, out)` dimensions of the layer.
    /// * `act_fn` - The activation applied to the layer's output, if any.
    pub fn zeros(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self {
            dim,
            act_fn,
            weights: Array2::zeros((dim.1, dim.0)),
            biases: Array1::zeros(dim.1),
        }
    }

    /// Creates a new `Dense` from a raw parameter slice laid out as the weights in row-major
    /// `(out, in)` order followed by the biases.
    ///
    /// # Errors
    /// `PricingErr::ParamCount` if `params` doesn't hold exactly `size` values.
    pub fn from_flat(dim: (usize, usize), act_fn: Option<ActFn>, params: &[f32]) -> Result<Self> {
        let size = (dim.0 + 1) * dim.1;
        if params.len() != size {
            return Err(PricingErr::ParamCount {
                got: params.len(),
                expected: size,
            });
        }

        let (w_raw, b_raw) = params.split_at(dim.0 * dim.1);
        let weights = Array2::from_shape_fn((dim.1, dim.0), |(o, i)| w_raw[o * dim.0 + i]);

        Ok(Self {
            dim,
            act_fn,
            weights,
            biases: Array1::from(b_raw.to_vec()),
        })
    }

    /// Creates a new `Dense` from already shaped parameters. The caller guarantees that
    /// `weights` is `(out, in)` and `biases` has `out` entries.
    pub(crate) fn from_parts(
        weights: Array2<f32>,
        biases: Array1<f32>,
        act_fn: Option<ActFn>,
    ) -> Self {
        debug_assert_eq!(weights.nrows(), biases.len());

        Self {
            dim: (weights.ncols(), weights.nrows()),
            act_fn,
            weights,
            biases,
        }
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        (self.dim.0 + 1) * self.dim.1
    }

    pub fn weights(&self) -> ArrayView2<'_, f32> {
        self.weights.view()
    }

    pub fn biases(&self) -> ArrayView1<'_, f32> {
        self.biases.view()
    }

    /// Feeds a batch through the layer. `x` must have `dim.0` columns; the net checks that
    /// before the first layer runs.
    pub fn forward(&self, x: ArrayView2<f32>) -> Array2<f32> {
        let mut z = Array2::<f32>::zeros((x.nrows(), self.dim.1));
        linalg::general_mat_mul(1.0, &x, &self.weights.t(), 0.0, &mut z);
        z += &self.biases;

        if let Some(act_fn) = &self.act_fn {
            z.mapv_inplace(|z| act_fn.f(z));
        }

        z
    }
}
