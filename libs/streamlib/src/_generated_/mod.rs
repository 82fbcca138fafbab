// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Generated schema types. DO NOT EDIT.

pub mod com_streamlib_api_server_config;
pub mod com_streamlib_clap_effect_config;
pub mod com_streamlib_webrtc_whep_config;
pub mod com_streamlib_webrtc_whip_config;
pub mod com_tatolab_audio_capture_config;
pub mod com_tatolab_audio_channel_converter_config;
pub mod com_tatolab_audio_mixer_config;
pub mod com_tatolab_audio_output_config;
pub mod com_tatolab_audio_resampler_config;
pub mod com_tatolab_audioframe;
pub mod com_tatolab_buffer_rechunker_config;
pub mod com_tatolab_camera_config;
pub mod com_tatolab_chord_generator_config;
pub mod com_tatolab_display_config;
pub mod com_tatolab_encodedvideoframe;
pub mod com_tatolab_mp4_writer_config;
pub mod com_tatolab_simple_passthrough_config;
pub mod com_tatolab_videoframe;

pub use com_streamlib_api_server_config::ApiServerConfig;
pub use com_streamlib_clap_effect_config::EffectConfig;
pub use com_streamlib_webrtc_whep_config::WebrtcWhepConfig;
pub use com_streamlib_webrtc_whip_config::WebrtcWhipConfig;
pub use com_tatolab_audio_capture_config::AudioCaptureConfig;
pub use com_tatolab_audio_channel_converter_config::AudioChannelConverterConfig;
pub use com_tatolab_audio_mixer_config::AudioMixerConfig;
pub use com_tatolab_audio_output_config::AudioOutputConfig;
pub use com_tatolab_audio_resampler_config::AudioResamplerConfig;
pub use com_tatolab_audioframe::Audioframe;
pub use com_tatolab_buffer_rechunker_config::BufferRechunkerConfig;
pub use com_tatolab_camera_config::CameraConfig;
pub use com_tatolab_chord_generator_config::ChordGeneratorConfig;
pub use com_tatolab_display_config::DisplayConfig;
pub use com_tatolab_encodedvideoframe::Encodedvideoframe;
pub use com_tatolab_mp4_writer_config::Mp4WriterConfig;
pub use com_tatolab_simple_passthrough_config::SimplePassthroughConfig;
pub use com_tatolab_videoframe::Videoframe;
