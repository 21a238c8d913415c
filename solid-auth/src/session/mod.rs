//! Session contract consumed by strategies and the authenticator.
//!
//! A [`Session`] is a key/value bag with flash semantics. Persisting it is the job
//! of a [`SessionStorage`] implementation, addressed by the request's cookie header.

mod data;
mod memory;
mod storage;

pub use data::{Session, SessionData};
pub use memory::{MemorySessionStorage, DEFAULT_COOKIE_NAME};
pub use storage::SessionStorage;
