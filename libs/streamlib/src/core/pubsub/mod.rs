// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

mod bus;
mod events;

pub use bus::{PubSub, PUBSUB};
pub use events::{
    topics, Event, EventListener, KeyCode, KeyState, LinkPortDirection, Modifiers, MouseButton,
    MouseState, ProcessorEvent, ProcessorState, RuntimeEvent, WindowEventType,
};
