// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

mod component_map;
mod execution_lightweight_component;
mod execution_main_thread_component;
mod execution_rayon_pool_component;
mod json_component_trait;
mod link_state_component;
mod link_type_info_component;
mod pending_deletion_component;
mod processor_audio_converter_component;
mod processor_instance_component;
mod processor_metrics;
mod processor_pause_gate_component;
mod processor_ready_barrier_component;
mod shutdown_channel_component;
mod state_component;
mod thread_handle_component;

pub use component_map::*;
pub use execution_lightweight_component::*;
pub use execution_main_thread_component::*;
pub use execution_rayon_pool_component::*;
pub use json_component_trait::*;
pub use link_state_component::*;
pub use link_type_info_component::*;
pub use pending_deletion_component::*;
pub use processor_audio_converter_component::*;
pub use processor_instance_component::*;
pub use processor_metrics::*;
pub use processor_pause_gate_component::*;
pub use processor_ready_barrier_component::*;
pub use shutdown_channel_component::*;
pub use state_component::*;
pub use thread_handle_component::*;
