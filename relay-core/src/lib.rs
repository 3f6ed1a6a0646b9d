//! Core, runtime-agnostic pieces of the group relay: the wire codec, the data model,
//! and the single-writer registry. Nothing in this crate touches a socket or an
//! async runtime — that's `relay`'s job.

pub mod config;
pub mod errors;
pub mod ids;
pub mod model;
pub mod protocol;
pub mod registry;

pub use config::RegistryConfig;
pub use errors::{ErrorCode, RelayError, RelayResult};
pub use ids::GroupId;
pub use model::ClientAddr;
pub use protocol::{classify, parse_command, reply, Classification, Command, MAX_DATAGRAM_BYTES};
pub use registry::{Registry, SweepReport};
