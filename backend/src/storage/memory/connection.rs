//! In-memory storage connection.
//!
//! Holds the three record collections behind `RwLock`s so repositories can be
//! cloned freely across services. This gives single-writer semantics only;
//! there is no cross-operation transactionality.

use std::sync::{Arc, RwLock};

use crate::domain::models::{Arrival, KitEvent, Member};

#[derive(Clone, Default)]
pub struct MemoryConnection {
    pub(crate) members: Arc<RwLock<Vec<Member>>>,
    pub(crate) events: Arc<RwLock<Vec<KitEvent>>>,
    pub(crate) arrivals: Arc<RwLock<Vec<Arrival>>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }
}
