use rigging::{Context, Failure};

/// User storage.
pub trait Api {
    /// Looks a user up by id.
    fn get(&self, ctx: rigging::Context, id: i64) -> Result<unit::User, Failure>;

    /// Stores a user.
    /// @results id
    fn set(&self, ctx: rigging::Context, user: unit::User) -> Result<i64, Failure>;

    fn list(&self) -> (u32, String);
}
