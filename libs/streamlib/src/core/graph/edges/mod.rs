mod link;
mod link_capacity;
mod link_direction;
mod link_endpoint;
mod link_unique_id;
mod link_port_markers;
mod link_port_ref;
mod link_state;

pub use link::Link;
pub use link_capacity::LinkCapacity;
pub use link_direction::LinkDirection;
pub use link_endpoint::LinkEndpoint;
pub use link_unique_id::LinkUniqueId;
pub use link_port_markers::{input, output, InputPortMarker, OutputPortMarker, PortMarker};
pub use link_port_ref::{IntoLinkPortRef, LinkPortRef};
pub use link_state::LinkState;
