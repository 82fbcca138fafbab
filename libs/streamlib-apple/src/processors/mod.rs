//! Apple platform processor implementations

pub mod camera;
pub mod display;

pub use camera::AppleCameraProcessor;
pub use display::AppleDisplayProcessor;
