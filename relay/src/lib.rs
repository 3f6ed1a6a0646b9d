//! Runtime half of the relay: the datagram endpoint, command handlers, broadcast
//! fan-out, the sweeper task, and the server loop that ties them together. Split out
//! of `main.rs` as a library so integration tests can drive a real `Server` over a
//! loopback socket without shelling out to the built binary.

pub mod broadcast;
pub mod config;
pub mod endpoint;
pub mod handlers;
pub mod server;
pub mod sweeper;

pub use config::Cli;
pub use server::Server;
