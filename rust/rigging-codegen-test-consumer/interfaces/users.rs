// The `users` unit; build.rs generates its bindings.

use rigging::Failure;
use serde::{Deserialize, Serialize};

/// A stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
}

/// User storage.
pub trait Api: Send + Sync {
    /// Stores a user under a fresh id.
    /// @results id
    fn set(&self, ctx: rigging::Context, name: String) -> Result<i64, Failure>;

    fn get(&self, ctx: rigging::Context, id: i64) -> Result<User, Failure>;

    /// Renames a user, returning whether it existed and its previous name.
    /// @results renamed, previous
    fn rename(
        &self,
        ctx: rigging::Context,
        id: i64,
        name: String,
    ) -> Result<(bool, String), Failure>;

    fn count(&self) -> u64;

    /// Number of users, largest id, and whether the store is empty.
    fn stats(&self) -> (u64, i64, bool);

    fn clear(&self, ctx: rigging::Context) -> Result<(), Failure>;

    /// Milliseconds left before the caller's deadline.
    fn budget(&self, ctx: rigging::Context) -> Result<u64, Failure>;

    /// Borrowed parameters cannot cross a transport, so this has no handler.
    /// The local client forwards it; the remote client keeps this body.
    fn find(&self, prefix: &str) -> Option<User> {
        let _ = prefix;
        None
    }

    /// Number of users whose name contains any of `filter`. Never bound.
    fn search(&self, filter: Vec<String>) -> u8;

    /// Never bound either, but it can report why.
    fn export(&self, ctx: rigging::Context, ids: &[i64]) -> Result<Vec<User>, Failure>;
}
