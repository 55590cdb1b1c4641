//! Segstream-Common: Shared error type and origin URL layout.
//!
//! This crate provides functionality used across segstream:
//!
//! - **Error Handling**: The error taxonomy shared by parsing, fetching and
//!   socket delivery, plus a result alias
//! - **URL Layout**: Builders for the manifest and track URLs on the origin
//!
//! # Examples
//!
//! ```
//! use segstream_common::{Error, Result};
//! use segstream_common::urls::manifest_url;
//!
//! assert_eq!(
//!     manifest_url("http://origin:8080", "demo"),
//!     "http://origin:8080/movies/demo/manifest.txt"
//! );
//!
//! fn example() -> Result<()> {
//!     Err(Error::transfer("range ignored"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod urls;

pub use error::{is_peer_disconnect, Error, Result};
