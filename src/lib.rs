//! Ledger gateway client library.
//!
//! Connects to a permissioned ledger through a gateway peer, signs with an
//! X.509 identity and drives transactions through
//! propose → endorse → submit → commit status.

pub mod assets;
pub mod config;
pub mod gateway;
pub mod http;
pub mod identity;
pub mod net;
pub mod observability;

pub use assets::{Asset, AssetService};
pub use config::schema::ClientConfig;
pub use gateway::{Contract, Gateway, GatewayError, GatewayResult, Network};
pub use http::HttpServer;
