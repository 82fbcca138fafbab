// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Graph-related types for processors.

pub mod processor_state_ecs_component;

pub use processor_state_ecs_component::{ProcessorState, ProcessorStateComponent};
