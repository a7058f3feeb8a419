use super::Tanh;

/// The nonlinearity applied after a layer's affine map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActFn {
    Tanh(Tanh),
}

impl ActFn {
    pub fn tanh() -> Self {
        ActFn::Tanh(Tanh::new())
    }

    pub fn f(&self, x: f32) -> f32 {
        match self {
            ActFn::Tanh(a) => a.f(x),
        }
    }
}
