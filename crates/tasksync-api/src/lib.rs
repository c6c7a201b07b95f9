// tasksync-api: Async REST + WebSocket gateway for the tasksync service.

pub mod bus;
pub mod error;
pub mod push;
pub mod rest;
pub mod transport;
pub mod wire;

pub use bus::{EventBus, HandlerId};
pub use error::Error;
pub use push::{ConnectionState, PushChannel, topic};
pub use rest::RestClient;
pub use transport::TransportConfig;
pub use wire::{CreateTask, PushEnvelope, UpdateTask, WireGroup, WireTask};
