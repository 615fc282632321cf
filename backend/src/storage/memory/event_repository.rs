//! In-memory kit event repository.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use std::sync::Arc;

use super::connection::MemoryConnection;
use crate::domain::models::KitEvent;
use crate::storage::traits::EventStorage;

#[derive(Clone)]
pub struct EventRepository {
    connection: Arc<MemoryConnection>,
}

impl EventRepository {
    pub fn new(connection: Arc<MemoryConnection>) -> Self {
        Self { connection }
    }
}

impl EventStorage for EventRepository {
    fn store_event(&self, event: &KitEvent) -> Result<()> {
        let mut events = self
            .connection
            .events
            .write()
            .map_err(|_| anyhow!("event store lock poisoned"))?;
        if events.iter().any(|e| e.date == event.date) {
            return Err(anyhow!("event already exists on {}", event.date));
        }
        events.push(event.clone());
        Ok(())
    }

    fn get_event(&self, date: NaiveDate) -> Result<Option<KitEvent>> {
        let events = self
            .connection
            .events
            .read()
            .map_err(|_| anyhow!("event store lock poisoned"))?;
        Ok(events.iter().find(|e| e.date == date).cloned())
    }

    fn list_events(&self) -> Result<Vec<KitEvent>> {
        let events = self
            .connection
            .events
            .read()
            .map_err(|_| anyhow!("event store lock poisoned"))?;
        let mut listed = events.clone();
        listed.sort_by_key(|e| e.date);
        Ok(listed)
    }

    fn update_event(&self, event: &KitEvent) -> Result<()> {
        let mut events = self
            .connection
            .events
            .write()
            .map_err(|_| anyhow!("event store lock poisoned"))?;
        match events.iter_mut().find(|e| e.date == event.date) {
            Some(existing) => {
                *existing = event.clone();
                Ok(())
            }
            None => Err(anyhow!("event not found on {}", event.date)),
        }
    }

    fn update_events(&self, updated: &[KitEvent]) -> Result<()> {
        let mut events = self
            .connection
            .events
            .write()
            .map_err(|_| anyhow!("event store lock poisoned"))?;
        for event in updated {
            match events.iter_mut().find(|e| e.date == event.date) {
                Some(existing) => *existing = event.clone(),
                None => return Err(anyhow!("event not found on {}", event.date)),
            }
        }
        Ok(())
    }

    fn delete_event(&self, date: NaiveDate) -> Result<bool> {
        let mut events = self
            .connection
            .events
            .write()
            .map_err(|_| anyhow!("event store lock poisoned"))?;
        let before = events.len();
        events.retain(|e| e.date != date);
        Ok(events.len() < before)
    }
}
