
pub mod display;
pub mod audio_output;

pub use display::{DisplayProcessor, WindowId, DisplayConfig};
pub use audio_output::{AudioOutputProcessor, AudioDevice, AudioOutputConfig};
