//! Reading and writing parameter files.
//!
//! A parameter file is a safetensors blob holding exactly the six tensors of one variant's
//! [`Layout`], keyed by their state-dict names (`net.0.weight`, `net.0.bias`, ...). Any
//! missing, extra or misshaped tensor rejects the whole file.

use std::{collections::HashMap, fs, io, path::Path};

use half::{bf16, f16};
use ndarray::{Array1, Array2};
use safetensors::{Dtype, SafeTensors, tensor::TensorView};

use crate::{
    PricingNet, Variant,
    arch::{LayerShape, Layout, activations::ActFn, layers::Dense},
    error::{LoadError, Mismatch},
};

/// Loads the trained parameters at `path` into a fresh net of the given variant.
///
/// The file is read fully and closed before the net is built.
///
/// # Errors
/// * `LoadError::NotFound` if the file can't be read.
/// * `LoadError::InvalidFormat` if it isn't a safetensors blob.
/// * `LoadError::ShapeMismatch` if its tensors don't fit the variant's architecture.
/// * `LoadError::UnsupportedDtype` if a tensor isn't stored as floats.
pub fn load<P: AsRef<Path>>(variant: Variant, path: P) -> Result<PricingNet, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LoadError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;

    let net = from_bytes(variant, &bytes)?;
    log::info!(
        "loaded {variant} model from '{}' ({} parameters)",
        path.display(),
        net.num_params()
    );

    Ok(net)
}

/// Builds a net of the given variant from an in-memory parameter blob.
pub fn from_bytes(variant: Variant, bytes: &[u8]) -> Result<PricingNet, LoadError> {
    let tensors =
        SafeTensors::deserialize(bytes).map_err(|e| LoadError::InvalidFormat(e.to_string()))?;
    let layout = Layout::of(variant);

    reject_unexpected(&tensors, &layout)?;

    let layers = layout
        .layers()
        .iter()
        .map(|shape| read_layer(&tensors, shape))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PricingNet::from_layers(variant, layers))
}

/// Writes the net's parameters to `path` in the layout `load` reads.
pub fn save<P: AsRef<Path>>(net: &PricingNet, path: P) -> io::Result<()> {
    let path = path.as_ref();
    fs::write(path, to_bytes(net)?)?;
    log::info!("saved {} model to '{}'", net.variant(), path.display());
    Ok(())
}

/// Serializes the net's parameters as a safetensors blob of f32 tensors.
pub fn to_bytes(net: &PricingNet) -> io::Result<Vec<u8>> {
    let layout = Layout::of(net.variant());
    let buffers: Vec<(String, Vec<usize>, Vec<f32>)> = layout
        .layers()
        .iter()
        .zip(net.layers())
        .flat_map(|(shape, layer)| {
            [
                (
                    shape.weight_name(),
                    shape.weight_shape(),
                    layer.weights().iter().copied().collect(),
                ),
                (
                    shape.bias_name(),
                    shape.bias_shape(),
                    layer.biases().to_vec(),
                ),
            ]
        })
        .collect();

    let views = buffers
        .iter()
        .map(|(name, shape, data)| {
            TensorView::new(Dtype::F32, shape.clone(), bytemuck::cast_slice(data.as_slice()))
                .map(|view| (name.as_str(), view))
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| io::Error::other(e.to_string()))?;

    let metadata = HashMap::from([("variant".to_string(), net.variant().to_string())]);
    safetensors::serialize(views, &Some(metadata)).map_err(|e| io::Error::other(e.to_string()))
}

/// Describes one tensor stored in a parameter file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorInfo {
    pub name: String,
    pub dtype: String,
    pub shape: Vec<usize>,
}

/// What a parameter file holds and which variants can load it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub tensors: Vec<TensorInfo>,
    pub compatible: Vec<Variant>,
}

/// Lists the tensors in the file at `path` and checks it against every variant.
pub fn inspect<P: AsRef<Path>>(path: P) -> Result<Inspection, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LoadError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;

    let stored =
        SafeTensors::deserialize(&bytes).map_err(|e| LoadError::InvalidFormat(e.to_string()))?;
    let mut tensors: Vec<TensorInfo> = stored
        .tensors()
        .into_iter()
        .map(|(name, view)| TensorInfo {
            name,
            dtype: format!("{:?}", view.dtype()),
            shape: view.shape().to_vec(),
        })
        .collect();
    tensors.sort_by(|a, b| a.name.cmp(&b.name));

    let compatible = Variant::ALL
        .into_iter()
        .filter(|variant| match from_bytes(*variant, &bytes) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("not a {variant} parameter file: {e}");
                false
            }
        })
        .collect();

    Ok(Inspection {
        tensors,
        compatible,
    })
}

fn reject_unexpected(tensors: &SafeTensors, layout: &Layout) -> Result<(), LoadError> {
    let expected: Vec<String> = layout.tensors().into_iter().map(|(name, _)| name).collect();

    let mut names = tensors.names();
    names.sort();

    match names.into_iter().find(|name| !expected.contains(*name)) {
        Some(name) => Err(LoadError::ShapeMismatch {
            tensor: name.clone(),
            mismatch: Mismatch::Unexpected {
                got: tensors
                    .tensor(name)
                    .map(|view| view.shape().to_vec())
                    .unwrap_or_default(),
            },
        }),
        None => Ok(()),
    }
}

fn read_layer(tensors: &SafeTensors, shape: &LayerShape) -> Result<Dense, LoadError> {
    let weight_name = shape.weight_name();
    let w = read_tensor(tensors, &weight_name, &shape.weight_shape())?;
    let (n_in, n_out) = shape.dim;
    let weights = Array2::from_shape_fn((n_out, n_in), |(o, i)| w[o * n_in + i]);

    let b = read_tensor(tensors, &shape.bias_name(), &shape.bias_shape())?;
    let biases = Array1::from(b);

    Ok(Dense::from_parts(
        weights,
        biases,
        shape.activated.then(ActFn::tanh),
    ))
}

fn read_tensor(
    tensors: &SafeTensors,
    name: &str,
    expected: &[usize],
) -> Result<Vec<f32>, LoadError> {
    let view = tensors.tensor(name).map_err(|_| LoadError::ShapeMismatch {
        tensor: name.to_string(),
        mismatch: Mismatch::Missing {
            expected: expected.to_vec(),
        },
    })?;

    if view.shape() != expected {
        return Err(LoadError::ShapeMismatch {
            tensor: name.to_string(),
            mismatch: Mismatch::Dims {
                got: view.shape().to_vec(),
                expected: expected.to_vec(),
            },
        });
    }

    log::debug!("tensor '{name}' {:?} {:?}", view.dtype(), view.shape());
    decode(name, view.dtype(), view.data())
}

/// Reads little-endian float data of any supported width as f32.
fn decode(name: &str, dtype: Dtype, data: &[u8]) -> Result<Vec<f32>, LoadError> {
    let values = match dtype {
        Dtype::F32 => data
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned::<f32>)
            .collect(),
        Dtype::F64 => data
            .chunks_exact(8)
            .map(|c| bytemuck::pod_read_unaligned::<f64>(c) as f32)
            .collect(),
        Dtype::F16 => data
            .chunks_exact(2)
            .map(|c| bytemuck::pod_read_unaligned::<f16>(c).to_f32())
            .collect(),
        Dtype::BF16 => data
            .chunks_exact(2)
            .map(|c| bytemuck::pod_read_unaligned::<bf16>(c).to_f32())
            .collect(),
        other => {
            return Err(LoadError::UnsupportedDtype {
                tensor: name.to_string(),
                dtype: format!("{other:?}"),
            });
        }
    };

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(entries: &[(&str, Vec<usize>, Vec<f32>)]) -> Vec<u8> {
        let views: Vec<_> = entries
            .iter()
            .map(|(name, shape, data)| {
                let bytes = bytemuck::cast_slice(data.as_slice());
                let view = TensorView::new(Dtype::F32, shape.clone(), bytes).unwrap();
                (*name, view)
            })
            .collect();

        safetensors::serialize(views, &None).unwrap()
    }

    fn layout_entries(variant: Variant, value: f32) -> Vec<(String, Vec<usize>, Vec<f32>)> {
        Layout::of(variant)
            .tensors()
            .into_iter()
            .map(|(name, shape)| {
                let len = shape.iter().product();
                (name, shape, vec![value; len])
            })
            .collect()
    }

    fn as_refs(entries: &[(String, Vec<usize>, Vec<f32>)]) -> Vec<(&str, Vec<usize>, Vec<f32>)> {
        entries
            .iter()
            .map(|(n, s, d)| (n.as_str(), s.clone(), d.clone()))
            .collect()
    }

    #[test]
    fn loads_a_complete_blob() {
        let entries = layout_entries(Variant::BlackScholes, 0.25);
        let bytes = blob(&as_refs(&entries));

        let net = from_bytes(Variant::BlackScholes, &bytes).unwrap();

        assert_eq!(net.variant(), Variant::BlackScholes);
        assert!(net.to_flat().iter().all(|&p| p == 0.25));
    }

    #[test]
    fn blob_for_one_variant_does_not_fit_the_other() {
        let entries = layout_entries(Variant::Heston, 0.0);
        let bytes = blob(&as_refs(&entries));

        let err = from_bytes(Variant::BlackScholes, &bytes).unwrap_err();

        assert!(matches!(
            err,
            LoadError::ShapeMismatch { ref tensor, mismatch: Mismatch::Dims { .. } }
                if tensor == "net.0.weight"
        ));
    }

    #[test]
    fn missing_bias_is_a_shape_mismatch() {
        let entries: Vec<_> = layout_entries(Variant::Heston, 0.0)
            .into_iter()
            .filter(|(name, ..)| name != "net.2.bias")
            .collect();
        let bytes = blob(&as_refs(&entries));

        let err = from_bytes(Variant::Heston, &bytes).unwrap_err();

        assert!(matches!(
            err,
            LoadError::ShapeMismatch { ref tensor, mismatch: Mismatch::Missing { .. } }
                if tensor == "net.2.bias"
        ));
    }

    #[test]
    fn garbage_is_an_invalid_format() {
        let err = from_bytes(Variant::Heston, b"definitely not tensors").unwrap_err();
        assert!(matches!(err, LoadError::InvalidFormat(_)));
    }

    #[test]
    fn decodes_half_and_double_precision() {
        let halves: Vec<u8> = [1.5_f32, -2.0]
            .iter()
            .flat_map(|&x| f16::from_f32(x).to_le_bytes())
            .collect();
        let doubles: Vec<u8> = [0.125_f64, 3.0].iter().flat_map(|x| x.to_le_bytes()).collect();

        assert_eq!(decode("h", Dtype::F16, &halves).unwrap(), vec![1.5, -2.0]);
        assert_eq!(decode("d", Dtype::F64, &doubles).unwrap(), vec![0.125, 3.0]);
    }

    #[test]
    fn loads_a_bfloat16_blob() {
        let entries = layout_entries(Variant::Heston, 0.375);
        let raw: Vec<Vec<u8>> = entries
            .iter()
            .map(|(_, _, data)| {
                data.iter()
                    .flat_map(|&x| bf16::from_f32(x).to_le_bytes())
                    .collect()
            })
            .collect();
        let views: Vec<_> = entries
            .iter()
            .zip(&raw)
            .map(|((name, shape, _), bytes)| {
                let view = TensorView::new(Dtype::BF16, shape.clone(), bytes).unwrap();
                (name.as_str(), view)
            })
            .collect();
        let bytes = safetensors::serialize(views, &None).unwrap();

        let net = from_bytes(Variant::Heston, &bytes).unwrap();

        assert!(net.to_flat().iter().all(|&p| p == 0.375));
    }

    #[test]
    fn transposed_weight_reports_the_stored_shape() {
        let mut entries = layout_entries(Variant::BlackScholes, 0.0);
        entries[0] = ("net.0.weight".to_string(), vec![2, 64], vec![0.0; 128]);
        let bytes = blob(&as_refs(&entries));

        let err = from_bytes(Variant::BlackScholes, &bytes).unwrap_err();

        match err {
            LoadError::ShapeMismatch {
                tensor,
                mismatch: Mismatch::Dims { got, expected },
            } => {
                assert_eq!(tensor, "net.0.weight");
                assert_eq!(got, vec![2, 64]);
                assert_eq!(expected, vec![64, 2]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn weights_keep_their_stored_orientation() {
        let mut entries = layout_entries(Variant::BlackScholes, 0.0);
        let w: Vec<f32> = (0..128).map(|i| i as f32).collect();
        entries[0] = ("net.0.weight".to_string(), vec![64, 2], w.clone());
        let bytes = blob(&as_refs(&entries));

        let net = from_bytes(Variant::BlackScholes, &bytes).unwrap();

        assert_eq!(net.to_flat()[..128], w[..]);
    }

    #[test]
    fn integer_tensors_are_rejected() {
        let err = decode("net.0.weight", Dtype::I64, &[0; 16]).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedDtype { ref dtype, .. } if dtype == "I64"));
    }
}
