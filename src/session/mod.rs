//! Session identity.
//!
//! Every mounted chat widget owns exactly one [`SessionToken`]. The token is
//! sent with every realtime message and with both auxiliary requests so the
//! backend can correlate them with its own session state.
//!
//! # Example
//!
//! ```rust
//! use krypto_chat::session::SessionToken;
//!
//! let token = SessionToken::generate();
//! assert!(token.as_str().chars().all(|c| c.is_ascii_digit()));
//! ```

mod token;

pub use token::SessionToken;
