
pub mod camera;
pub mod audio_capture;

pub use camera::AppleCameraProcessor;
pub use audio_capture::AppleAudioCaptureProcessor;
