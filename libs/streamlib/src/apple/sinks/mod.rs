
pub mod display;
pub mod audio_output;

pub use display::AppleDisplayProcessor;
pub use audio_output::AppleAudioOutputProcessor;
