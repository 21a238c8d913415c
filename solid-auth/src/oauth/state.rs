//! CSRF state tokens for OAuth flows.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;

/// Session key the state token is flashed under between the two legs.
pub const SESSION_STATE_KEY: &str = "oauth2:state";

/// Generate a cryptographically random, URL-safe state token.
pub fn generate_state() -> String {
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(random_bytes)
}
