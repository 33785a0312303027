//! Identity storage.
//!
//! The authentication pipeline consumes identities through the
//! [`IdentityStore`] trait and never touches storage directly. The bundled
//! [`MemoryIdentityStore`] keeps everything in process; a persistent backend
//! only has to implement the trait.

pub mod memory;
pub mod seed;
pub mod traits;

pub use memory::MemoryIdentityStore;
pub use seed::{seed_identities, SeedIdentity};
pub use traits::{Identity, IdentityStore, IdentityUpdate, NewIdentity, Role};

#[cfg(test)]
pub use traits::MockIdentityStore;
