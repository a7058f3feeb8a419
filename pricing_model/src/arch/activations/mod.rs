mod act_fn;
mod tanh;

pub use act_fn::ActFn;
pub use tanh::Tanh;
