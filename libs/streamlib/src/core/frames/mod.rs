
pub mod video_frame;
pub mod audio_frame;
pub mod data_frame;
pub mod metadata;

pub use video_frame::VideoFrame;
pub use audio_frame::AudioFrame;
pub use data_frame::DataFrame;
pub use metadata::MetadataValue;
