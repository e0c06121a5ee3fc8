//! # Device Transport
//!
//! This crate defines what the path view needs from a device session, and
//! provides in-process implementations of it.
//!
//! ## Philosophy
//!
//! - **Handles only**: a transport knows nothing about paths
//! - **One serial channel**: every primitive takes `&mut self` and blocks
//! - **Testable without hardware**: [`SimulatedDevice`] models a device's
//!   flat handle graph, [`FailingTransport`] injects faults on top of any
//!   transport
//!
//! ## Design
//!
//! - [`ObjectTransport`]: list children, fetch metadata/size, create, delete,
//!   rename
//! - [`TransportError`]: device-reported failure kinds

pub mod failing_transport;
pub mod sim_device;
pub mod transport;

pub use failing_transport::{FailingTransport, FailurePolicy};
pub use sim_device::{
    CallStats, DeviceFixture, FixtureError, FixtureNode, FixtureStorage, SimulatedDevice,
};
pub use transport::{ObjectTransport, TransportError};
