//! Microsoft Entra ID client for conditional access policy sync.
//!
//! Two pieces: [`Authenticator`] performs the OAuth2 client-credentials
//! exchange against the Microsoft identity platform, and [`GraphClient`]
//! drives the conditional access policy collection on the Graph API with the
//! resulting token. The client implements [`capsync_core::PolicyStore`] so
//! the core applier can drive it.

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

mod auth;
mod client;
mod error;

pub use auth::*;
pub use client::*;
pub use error::*;
