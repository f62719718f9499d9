mod affine;
pub mod loss;
mod model;
mod params;

pub use affine::Affine;
pub use model::Model;
pub use params::Params;
