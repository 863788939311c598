/// Per-request store sessions.
///
/// A `Session` is opened at the start of a request and released when it is
/// dropped, whichever way the handler returns. Sessions are never shared
/// between requests; each one comes fresh from a `SessionFactory`.

use std::ops::{Deref, DerefMut};
use std::time::Instant;

use crate::error::Result;
use crate::store::{ClimateStore, MemoryStore, PgStore};

/// Source of fresh store sessions. Lives for the whole process inside the
/// application context.
pub trait SessionFactory: Send + Sync {
    fn open_store(&self) -> Result<Box<dyn ClimateStore>>;
}

/// Opens one PostgreSQL connection per session.
pub struct PgSessionFactory {
    db_url: String,
}

impl PgSessionFactory {
    pub fn new(db_url: impl Into<String>) -> Self {
        Self { db_url: db_url.into() }
    }
}

impl SessionFactory for PgSessionFactory {
    fn open_store(&self) -> Result<Box<dyn ClimateStore>> {
        Ok(Box::new(PgStore::connect(&self.db_url)?))
    }
}

impl SessionFactory for MemoryStore {
    fn open_store(&self) -> Result<Box<dyn ClimateStore>> {
        Ok(Box::new(self.clone()))
    }
}

/// A store handle scoped to one request.
pub struct Session {
    store: Box<dyn ClimateStore>,
    opened_at: Instant,
}

impl Session {
    pub fn open(factory: &dyn SessionFactory) -> Result<Self> {
        let store = factory.open_store()?;
        log::debug!("Store session opened");
        Ok(Self {
            store,
            opened_at: Instant::now(),
        })
    }
}

impl Deref for Session {
    type Target = dyn ClimateStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.store.as_mut()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        log::debug!("Store session closed after {:?}", self.opened_at.elapsed());
    }
}
