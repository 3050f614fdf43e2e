mod kind;
mod layer;

pub use kind::LayerKind;
pub use layer::BoundaryLayer;
