//! OAuth 2.0 authentication infrastructure.
//!
//! Provides the authorization-code flow as a [`Strategy`](crate::strategy::Strategy),
//! with the provider-specific pieces behind the [`Provider`] trait.

mod profile;
mod provider;
mod state;
mod strategy;

pub mod providers;
pub mod token;

pub use profile::{Profile, ProfileName, ProfileValue};
pub use provider::{Endpoints, Provider, ProviderKind};
pub use state::{generate_state, SESSION_STATE_KEY};
pub use strategy::{OAuth2Options, OAuth2Strategy, Verify, VerifyParams};
pub use token::TokenSet;
