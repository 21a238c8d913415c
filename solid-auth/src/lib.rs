//! # solid-auth
//!
//! Pluggable OAuth2 authentication for web applications:
//! - A session contract with flash values, backed by any [`SessionStorage`]
//! - The [`Strategy`] capability and a generic authorization-code [`OAuth2Strategy`]
//! - Providers for Discord, GitHub, Google, Facebook and Microsoft
//! - An [`Authenticator`] registry dispatching requests to strategies by name
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use solid_auth::{
//!     oauth::{providers::discord, OAuth2Options, OAuth2Strategy, VerifyParams},
//!     Authenticator, AuthenticateOptions, MemorySessionStorage,
//! };
//!
//! let mut authenticator = Authenticator::new(Arc::new(MemorySessionStorage::new()));
//! authenticator.use_strategy(
//!     OAuth2Strategy::new(
//!         OAuth2Options::new(client_id, client_secret, callback_url),
//!         discord::Provider::new(),
//!         |params: VerifyParams| async move { Ok(params.profile) },
//!     )?,
//!     None,
//! );
//! let outcome = authenticator
//!     .authenticate("discord", &request, AuthenticateOptions::default())
//!     .await?;
//! ```

pub mod authenticator;
pub mod error;
pub mod http;
pub mod oauth;
pub mod request;
pub mod session;
pub mod strategy;

// Re-export commonly used types
pub use authenticator::{AuthRedirects, AuthState, Authenticator, AuthenticatorOptions, LogoutOptions};
pub use error::{Error, ErrorKind};
pub use request::AuthRequest;
pub use session::{MemorySessionStorage, Session, SessionStorage};
pub use strategy::{AuthenticateOptions, Outcome, Redirect, Strategy, StrategyOptions};
