//! # hbconnect net
//!
//! HTTP transport and the retrying GraphQL query client.
//!
//! ## Overview
//!
//! Everything that talks to the network goes through [`HttpTransport`], a
//! minimal "send request, get response" seam. [`ReqwestTransport`] is the
//! production implementation; [`MemoryTransport`] replays scripted
//! responses for tests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hbconnect_net::{GqlClient, GqlConfig, ReqwestTransport};
//!
//! async fn example() -> hbconnect_net::Result<()> {
//!     let gql = GqlClient::new(GqlConfig::default().with_retries(2), ReqwestTransport::new())?;
//!     let res = gql.run("query { transactions(first: 1) { edges { node { id } } } }", None).await?;
//!     println!("{res}");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod graphql;
pub mod transport;

pub use error::{NetError, Result, TransportError};
pub use graphql::{
    is_graphql_endpoint, GqlClient, GqlConfig, ARWEAVE_GRAPHQL_URL, GOLDSKY_GRAPHQL_URL,
};
pub use transport::{
    memory::MemoryTransport, HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport,
};
