pub mod activations;
pub mod layers;
mod layout;
mod net;

pub use layout::{HIDDEN_DIM, LayerShape, Layout};
pub use net::PricingNet;
