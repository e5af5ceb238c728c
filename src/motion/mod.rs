pub mod direction;
pub mod sampler;

pub use direction::Direction;
pub use sampler::{MotionSampler, PointerSource};
