// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Apple MP4 muxer using AVAssetWriter with passthrough video.

use crate::core::codec::Mp4MuxerConfig;
use crate::core::{EncodedAudioFrame, EncodedVideoFrame, Result, RuntimeContext, StreamError};

/// Apple MP4 muxer using AVAssetWriter.
///
/// Muxes pre-encoded H.264 video and AAC/Opus audio into MP4 container.
/// Uses AVAssetWriter with passthrough mode for video.
pub struct AppleMp4Muxer {
    _config: Mp4MuxerConfig,
    // TODO: AVAssetWriter fields
    // writer: Option<Retained<AVAssetWriter>>,
    // video_input: Option<Retained<AVAssetWriterInput>>,
    // audio_input: Option<Retained<AVAssetWriterInput>>,
}

impl AppleMp4Muxer {
    /// Create a new Apple MP4 muxer.
    pub fn new(_config: Mp4MuxerConfig, _ctx: &RuntimeContext) -> Result<Self> {
        // TODO: Initialize AVAssetWriter with passthrough video
        // - Create AVAssetWriter with output URL
        // - Create video input with passthrough format description
        // - Create audio input (if audio configured)
        // - Start writing session
        Err(StreamError::Configuration(
            "Apple MP4 muxer not yet implemented".into(),
        ))
    }

    /// Write an encoded video frame.
    pub fn write_video(&mut self, _frame: &EncodedVideoFrame) -> Result<()> {
        // TODO: Wrap encoded data in CMSampleBuffer
        // - Create CMBlockBuffer from frame.data
        // - Create CMSampleBuffer with format description
        // - Append to video input
        Err(StreamError::Configuration(
            "Apple MP4 muxer not yet implemented".into(),
        ))
    }

    /// Write an encoded audio frame.
    pub fn write_audio(&mut self, _frame: &EncodedAudioFrame) -> Result<()> {
        // TODO: Wrap encoded audio in CMSampleBuffer
        // - Create CMBlockBuffer from frame.data
        // - Create CMSampleBuffer with audio format description
        // - Append to audio input
        Err(StreamError::Configuration(
            "Apple MP4 muxer not yet implemented".into(),
        ))
    }

    /// Finalize and close the MP4 file.
    pub fn finalize(&mut self) -> Result<()> {
        // TODO: Finish writing
        // - Mark inputs as finished
        // - Finish writing session
        // - Wait for completion
        Err(StreamError::Configuration(
            "Apple MP4 muxer not yet implemented".into(),
        ))
    }

    /// Get the muxer configuration.
    #[allow(dead_code)]
    pub fn config(&self) -> &Mp4MuxerConfig {
        &self._config
    }
}

// AppleMp4Muxer is Send because AVAssetWriter can be used from any thread
// (with proper main thread dispatch for finalization)
unsafe impl Send for AppleMp4Muxer {}
