
mod gpu_context;
mod audio_context;
mod runtime_context;

pub use gpu_context::GpuContext;
pub use audio_context::AudioContext;
pub use runtime_context::RuntimeContext;
