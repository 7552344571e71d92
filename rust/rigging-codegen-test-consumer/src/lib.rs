//! Test consumer crate that compiles the bindings build.rs generates.

pub mod audit {
    use std::sync::{Mutex, PoisonError};

    /// Append-only record of what the store did.
    #[derive(Debug, Default)]
    pub struct Log {
        entries: Mutex<Vec<String>>,
    }

    impl Log {
        pub fn record(&self, entry: impl Into<String>) {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(entry.into());
        }

        pub fn entries(&self) -> Vec<String> {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }
}

pub mod users {
    include!("../interfaces/users.rs");

    pub mod server {
        pub mod http_gen {
            include!(concat!(env!("OUT_DIR"), "/users/server/http_gen.rs"));
        }

        mod store;

        pub use self::store::Store;
    }

    pub mod client {
        pub mod http_gen {
            include!(concat!(env!("OUT_DIR"), "/users/client/http_gen.rs"));
        }

        pub mod local_gen {
            include!(concat!(env!("OUT_DIR"), "/users/client/local_gen.rs"));
        }
    }

    pub mod dependencies {
        include!(concat!(
            env!("OUT_DIR"),
            "/users/dependencies/dependencies_gen.rs"
        ));
    }
}
