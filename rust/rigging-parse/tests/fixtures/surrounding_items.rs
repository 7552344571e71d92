use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Record {
    pub key: String,
    pub fields: HashMap<String, String>,
}

impl Record {
    pub fn new(key: String) -> Self {
        Self { key, fields: HashMap::new() }
    }
}

trait NotExported {
    fn hidden(&self);
}

pub(crate) trait CrateOnly {
    fn internal(&self);
}

pub trait Store: Send + Sync {
    fn put(&self, key: String, value: String) -> Result<(), rigging::Failure>;
}

pub trait Audit {}

pub fn helper() -> u8 {
    1
}
