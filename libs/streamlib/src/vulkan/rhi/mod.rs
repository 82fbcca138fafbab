// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Vulkan RHI implementation.
//!
//! This module provides stub implementations for the Vulkan backend.
//! Full implementation is pending.

mod vulkan_command_buffer;
mod vulkan_command_queue;
mod vulkan_device;
mod vulkan_sync;
mod vulkan_texture;

pub use vulkan_command_buffer::VulkanCommandBuffer;
pub use vulkan_command_queue::VulkanCommandQueue;
pub use vulkan_device::VulkanDevice;
#[allow(unused_imports)]
pub use vulkan_sync::{VulkanFence, VulkanSemaphore};
pub use vulkan_texture::VulkanTexture;
