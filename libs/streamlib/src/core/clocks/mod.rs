
mod clock_trait;
mod software_clock;
mod audio_clock;
mod video_clock;
mod ptp_clock;
mod genlock_clock;

pub use clock_trait::Clock;
pub use software_clock::SoftwareClock;
pub use audio_clock::AudioClock;
pub use video_clock::VideoClock;
pub use ptp_clock::PTPClock;
pub use genlock_clock::GenlockClock;
