pub mod controller;
pub mod frames;

pub use controller::AnimationController;
