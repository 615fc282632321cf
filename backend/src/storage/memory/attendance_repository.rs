//! In-memory arrival repository.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use std::sync::Arc;

use super::connection::MemoryConnection;
use crate::domain::models::Arrival;
use crate::storage::traits::AttendanceStorage;

#[derive(Clone)]
pub struct AttendanceRepository {
    connection: Arc<MemoryConnection>,
}

impl AttendanceRepository {
    pub fn new(connection: Arc<MemoryConnection>) -> Self {
        Self { connection }
    }
}

impl AttendanceStorage for AttendanceRepository {
    fn upsert_arrival(&self, arrival: &Arrival) -> Result<()> {
        let mut arrivals = self
            .connection
            .arrivals
            .write()
            .map_err(|_| anyhow!("arrival store lock poisoned"))?;
        match arrivals.iter_mut().find(|a| a.id == arrival.id) {
            Some(existing) => *existing = arrival.clone(),
            None => arrivals.push(arrival.clone()),
        }
        Ok(())
    }

    fn get_arrival(&self, event_date: NaiveDate, member_id: &str) -> Result<Option<Arrival>> {
        let arrivals = self
            .connection
            .arrivals
            .read()
            .map_err(|_| anyhow!("arrival store lock poisoned"))?;
        Ok(arrivals
            .iter()
            .find(|a| a.event_date == event_date && a.member_id == member_id)
            .cloned())
    }

    fn list_arrivals_for_event(&self, event_date: NaiveDate) -> Result<Vec<Arrival>> {
        let arrivals = self
            .connection
            .arrivals
            .read()
            .map_err(|_| anyhow!("arrival store lock poisoned"))?;
        Ok(arrivals
            .iter()
            .filter(|a| a.event_date == event_date)
            .cloned()
            .collect())
    }

    fn delete_arrivals_for_event(&self, event_date: NaiveDate) -> Result<u32> {
        let mut arrivals = self
            .connection
            .arrivals
            .write()
            .map_err(|_| anyhow!("arrival store lock poisoned"))?;
        let before = arrivals.len();
        arrivals.retain(|a| a.event_date != event_date);
        Ok((before - arrivals.len()) as u32)
    }

    fn delete_arrivals_for_member(&self, member_id: &str) -> Result<u32> {
        let mut arrivals = self
            .connection
            .arrivals
            .write()
            .map_err(|_| anyhow!("arrival store lock poisoned"))?;
        let before = arrivals.len();
        arrivals.retain(|a| a.member_id != member_id);
        Ok((before - arrivals.len()) as u32)
    }
}
