use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

use crate::Variant;

/// The result type used in the entire pricing model crate.
pub type Result<T> = std::result::Result<T, PricingErr>;

/// How a stored tensor disagrees with the architecture it is loaded into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// The architecture needs the tensor but the blob doesn't have it.
    Missing { expected: Vec<usize> },
    /// The blob has a tensor the architecture has no slot for.
    Unexpected { got: Vec<usize> },
    /// Both sides know the tensor but disagree on its dimensions.
    Dims { got: Vec<usize>, expected: Vec<usize> },
}

/// Errors produced while restoring a network from a parameter blob.
#[derive(Debug)]
pub enum LoadError {
    /// The parameter file doesn't exist or couldn't be read.
    NotFound { path: PathBuf, source: io::Error },
    /// The bytes are not a parameter blob at all.
    InvalidFormat(String),
    /// The stored tensors don't fit the variant's architecture.
    ShapeMismatch { tensor: String, mismatch: Mismatch },
    /// A tensor is stored with a dtype that can't be read as floats.
    UnsupportedDtype { tensor: String, dtype: String },
}

impl Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NotFound { path, source } => {
                write!(f, "cannot read parameter file '{}': {source}", path.display())
            }
            LoadError::InvalidFormat(reason) => write!(f, "invalid parameter file: {reason}"),
            LoadError::ShapeMismatch { tensor, mismatch } => match mismatch {
                Mismatch::Missing { expected } => {
                    write!(f, "tensor '{tensor}' is missing, expected shape {expected:?}")
                }
                Mismatch::Unexpected { got } => {
                    write!(f, "unexpected tensor '{tensor}' with shape {got:?}")
                }
                Mismatch::Dims { got, expected } => {
                    write!(f, "tensor '{tensor}' has shape {got:?}, expected {expected:?}")
                }
            },
            LoadError::UnsupportedDtype { tensor, dtype } => {
                write!(f, "tensor '{tensor}' has unsupported dtype {dtype}")
            }
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::NotFound { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The pricing model crate's error type.
#[derive(Debug)]
pub enum PricingErr {
    Load(LoadError),
    InputShapeMismatch {
        got: usize,
        expected: usize,
    },
    ParamCount {
        got: usize,
        expected: usize,
    },
    MissingInput {
        variant: Variant,
        feature: &'static str,
    },
    NoModelPath(Variant),
}

impl Display for PricingErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PricingErr::Load(e) => format!("failed to load model: {e}"),
            PricingErr::InputShapeMismatch { got, expected } => format!(
                "The input has {got} column(s) but the model expects exactly {expected}"
            ),
            PricingErr::ParamCount { got, expected } => format!(
                "Got {got} parameters but the architecture holds {expected}"
            ),
            PricingErr::MissingInput { variant, feature } => {
                format!("The {variant} model needs a value for '{feature}'")
            }
            PricingErr::NoModelPath(variant) => {
                format!("There's no parameter file configured for the {variant} model")
            }
        };

        write!(f, "{s}")
    }
}

impl Error for PricingErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PricingErr::Load(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LoadError> for PricingErr {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}
