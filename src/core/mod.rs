//! OIDC Core Components
//!
//! Collaborator capabilities (transport, clock, randomness, response cache, dispatch) and
//! the protocol building blocks shared by every operation.

pub mod cache;
pub mod clock;
pub mod discovery;
pub mod dispatch;
pub mod form;
pub mod pkce;
pub mod random;
pub mod transport;

pub use cache::*;
pub use clock::*;
pub use discovery::*;
pub use dispatch::*;
pub use form::*;
pub use pkce::*;
pub use random::*;
pub use transport::*;
