//! Adapters: concrete implementations of the domain ports.

pub mod executor;
pub mod identity;
pub mod sqlite;

pub use executor::StubExecutor;
pub use identity::StaticIdentityProvider;
