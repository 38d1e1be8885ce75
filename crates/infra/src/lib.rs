//! Infrastructure layer: oracle backends reached over HTTP, plus an in-memory
//! backend for dev/test wiring.

pub mod envelope;
pub mod http;
pub mod in_memory;

pub use http::{HttpOracleClient, OracleEndpoints};
pub use in_memory::{AccountRecord, StaticOracle};
