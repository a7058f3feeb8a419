use std::{error::Error, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{PricingErr, Result};

/// One of the two fixed network architectures. They share every layer shape except the
/// width of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Black-Scholes surrogate, inputs `[spot, maturity]`.
    BlackScholes,
    /// Heston surrogate, inputs `[spot, volatility, maturity]`.
    Heston,
}
use Variant::*;

impl Variant {
    pub const ALL: [Variant; 2] = [BlackScholes, Heston];

    /// Returns the names of the input columns, in the order the network consumes them.
    pub fn features(self) -> &'static [&'static str] {
        match self {
            BlackScholes => &["spot", "maturity"],
            Heston => &["spot", "volatility", "maturity"],
        }
    }

    /// Returns the number of columns an input row must have.
    pub fn input_dim(self) -> usize {
        self.features().len()
    }

    pub fn name(self) -> &'static str {
        match self {
            BlackScholes => "black-scholes",
            Heston => "heston",
        }
    }

    /// Lays out the market parameters as an input row for this variant.
    ///
    /// # Arguments
    /// * `params` - The market parameters entered by the user.
    ///
    /// # Returns
    /// The input row, or an error if the variant needs a value that wasn't given.
    /// A volatility given to the Black-Scholes variant is ignored.
    pub fn input_vector(self, params: &MarketParams) -> Result<Vec<f32>> {
        match self {
            BlackScholes => Ok(vec![params.spot, params.maturity]),
            Heston => {
                let volatility = params.volatility.ok_or(PricingErr::MissingInput {
                    variant: self,
                    feature: "volatility",
                })?;

                Ok(vec![params.spot, volatility, params.maturity])
            }
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A variant name that doesn't match any known architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown model variant '{}'", self.0)
    }
}

impl Error for UnknownVariant {}

impl FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "black-scholes" | "black_scholes" | "bs" => Ok(BlackScholes),
            "heston" => Ok(Heston),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// The market parameters a user can enter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketParams {
    pub spot: f32,
    pub maturity: f32,
    pub volatility: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_vector_follows_feature_order() {
        let params = MarketParams {
            spot: 100.0,
            maturity: 0.5,
            volatility: Some(0.04),
        };

        assert_eq!(BlackScholes.input_vector(&params).unwrap(), vec![100.0, 0.5]);
        assert_eq!(Heston.input_vector(&params).unwrap(), vec![100.0, 0.04, 0.5]);
    }

    #[test]
    fn heston_without_volatility_is_rejected() {
        let params = MarketParams {
            spot: 100.0,
            maturity: 0.5,
            volatility: None,
        };

        let err = Heston.input_vector(&params).unwrap_err();
        assert!(matches!(
            err,
            PricingErr::MissingInput {
                variant: Heston,
                feature: "volatility"
            }
        ));
    }

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("black-scholes".parse::<Variant>().unwrap(), BlackScholes);
        assert_eq!("BS".parse::<Variant>().unwrap(), BlackScholes);
        assert_eq!("Heston".parse::<Variant>().unwrap(), Heston);
        assert!("sabr".parse::<Variant>().is_err());

        for variant in Variant::ALL {
            assert_eq!(variant.to_string().parse::<Variant>().unwrap(), variant);
        }
    }

    #[test]
    fn input_dims() {
        assert_eq!(BlackScholes.input_dim(), 2);
        assert_eq!(Heston.input_dim(), 3);
    }
}
