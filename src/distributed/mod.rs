//! One-time distributed runtime initialization.
//!
//! Every process calls a [`Bootstrap`] exactly once before training. The outcome is the
//! process's place in the group, the training loop itself never talks to its peers.

mod bootstrap;
mod device;
mod handshake;
mod rendezvous;

pub use bootstrap::{Bootstrap, ProcessInfo, Standalone};
pub use device::{devices, local_devices, Device};
pub use handshake::{Handshake, HandshakeChannel};
pub use rendezvous::{coordinate, join, Rendezvous};
