use crate::Variant;

/// Width of both hidden layers.
pub const HIDDEN_DIM: usize = 64;

/// The shape of one dense layer and the names its tensors are stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerShape {
    /// State-dict prefix of the layer, e.g. `net.0`.
    pub prefix: &'static str,
    /// `(in, out)` dimensions.
    pub dim: (usize, usize),
    /// Whether a tanh follows the layer.
    pub activated: bool,
}

impl LayerShape {
    pub fn weight_name(&self) -> String {
        format!("{}.weight", self.prefix)
    }

    pub fn bias_name(&self) -> String {
        format!("{}.bias", self.prefix)
    }

    /// Stored weight shape, `[out, in]`.
    pub fn weight_shape(&self) -> Vec<usize> {
        vec![self.dim.1, self.dim.0]
    }

    pub fn bias_shape(&self) -> Vec<usize> {
        vec![self.dim.1]
    }

    pub fn size(&self) -> usize {
        (self.dim.0 + 1) * self.dim.1
    }
}

/// The fixed architecture of a variant: `d → 64 (tanh) → 64 (tanh) → 1`.
///
/// Prefixes skip the odd indices because the trained models were exported from a sequential
/// container where those slots hold the activations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    layers: [LayerShape; 3],
}

impl Layout {
    pub fn of(variant: Variant) -> Self {
        let d = variant.input_dim();

        Self {
            layers: [
                LayerShape {
                    prefix: "net.0",
                    dim: (d, HIDDEN_DIM),
                    activated: true,
                },
                LayerShape {
                    prefix: "net.2",
                    dim: (HIDDEN_DIM, HIDDEN_DIM),
                    activated: true,
                },
                LayerShape {
                    prefix: "net.4",
                    dim: (HIDDEN_DIM, 1),
                    activated: false,
                },
            ],
        }
    }

    pub fn layers(&self) -> &[LayerShape] {
        &self.layers
    }

    /// Returns every stored tensor name with its expected shape, weights before biases,
    /// layer by layer.
    pub fn tensors(&self) -> Vec<(String, Vec<usize>)> {
        self.layers
            .iter()
            .flat_map(|layer| {
                [
                    (layer.weight_name(), layer.weight_shape()),
                    (layer.bias_name(), layer.bias_shape()),
                ]
            })
            .collect()
    }

    /// Returns the total amount of parameters in the architecture.
    pub fn num_params(&self) -> usize {
        self.layers.iter().map(LayerShape::size).sum()
    }
}
