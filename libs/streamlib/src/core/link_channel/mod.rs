pub mod link_channel;
pub mod link_channel_connections;
pub mod link_channel_manager;
pub mod link_id;
pub mod link_owned_channel;
pub mod link_plugs;
pub mod link_ports;
pub mod link_wakeup;

pub use link_channel::LinkChannel;
pub use link_channel_connections::{LinkInputConnection, LinkOutputConnection};
pub use link_channel_manager::LinkChannelManager;
pub use link_id::{LinkId, LinkIdError};
pub use link_owned_channel::{create_link_channel, LinkOwnedConsumer, LinkOwnedProducer};
pub use link_plugs::{LinkDisconnectedConsumer, LinkDisconnectedProducer};
pub use link_ports::{
    ConsumptionStrategy, LinkInput, LinkOutput, LinkPortAddress, LinkPortMessage, LinkPortType,
};
pub use link_wakeup::LinkWakeupEvent;
