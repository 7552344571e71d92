use std::sync::{Mutex, MutexGuard, PoisonError};

use rigging::{Context, Failure};

use crate::users::dependencies::{Dependencies, Injector};
use crate::users::{Api, User};

/// In-memory implementation of [`Api`].
pub struct Store {
    users: Mutex<Vec<User>>,
    deps: Dependencies,
}

impl Store {
    pub fn new(deps: Dependencies) -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            deps,
        }
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.deps
    }

    fn users(&self) -> MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Api for Store {
    fn set(&self, ctx: Context, name: String) -> Result<i64, Failure> {
        ctx.check()?;
        if name.is_empty() {
            return Err(Failure::msg("name must not be empty"));
        }
        let mut users = self.users();
        let id = users.last().map_or(1, |user| user.id + 1);
        self.deps.audit().record(format!("set {id} {name}"));
        users.push(User { id, name });
        Ok(id)
    }

    fn get(&self, _ctx: Context, id: i64) -> Result<User, Failure> {
        self.users()
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or_else(|| Failure::msg(format!("no user with id {id}")))
    }

    fn rename(&self, _ctx: Context, id: i64, name: String) -> Result<(bool, String), Failure> {
        let mut users = self.users();
        match users.iter_mut().find(|user| user.id == id) {
            Some(user) => {
                self.deps.audit().record(format!("rename {id} {name}"));
                Ok((true, std::mem::replace(&mut user.name, name)))
            }
            None => Ok((false, String::new())),
        }
    }

    fn count(&self) -> u64 {
        self.users().len() as u64
    }

    fn stats(&self) -> (u64, i64, bool) {
        let users = self.users();
        let largest = users.iter().map(|user| user.id).max().unwrap_or(0);
        (users.len() as u64, largest, users.is_empty())
    }

    fn clear(&self, ctx: Context) -> Result<(), Failure> {
        ctx.check()?;
        self.users().clear();
        self.deps.audit().record("clear");
        Ok(())
    }

    fn budget(&self, ctx: Context) -> Result<u64, Failure> {
        let left = ctx.remaining().ok_or_else(|| Failure::msg("no deadline"))?;
        Ok(u64::try_from(left.as_millis()).unwrap_or(u64::MAX))
    }

    fn find(&self, prefix: &str) -> Option<User> {
        self.users()
            .iter()
            .find(|user| user.name.starts_with(prefix))
            .cloned()
    }

    fn search(&self, filter: Vec<String>) -> u8 {
        let hits = self
            .users()
            .iter()
            .filter(|user| filter.iter().any(|part| user.name.contains(part.as_str())))
            .count();
        u8::try_from(hits).unwrap_or(u8::MAX)
    }

    fn export(&self, ctx: Context, ids: &[i64]) -> Result<Vec<User>, Failure> {
        ctx.check()?;
        Ok(self
            .users()
            .iter()
            .filter(|user| ids.contains(&user.id))
            .cloned()
            .collect())
    }
}
