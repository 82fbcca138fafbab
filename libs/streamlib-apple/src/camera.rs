//! AVFoundation camera capture
//!
//! Provides camera capture using AVFoundation.
//! Works on both macOS and iOS with platform-specific features.


// Shared camera functionality for both platforms

#[cfg(target_os = "ios")]
pub mod ios {
    //! iOS-specific camera features (multi-camera, wide-angle, etc.)
    use super::*;
}

#[cfg(target_os = "macos")]
pub mod macos {
    //! macOS-specific camera features (Continuity Camera, etc.)
    
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_enumeration() {
        // Test will be implemented
    }
}
