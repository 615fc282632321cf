//! In-memory member repository.

use anyhow::{anyhow, Result};
use std::sync::Arc;

use super::connection::MemoryConnection;
use crate::domain::models::Member;
use crate::storage::traits::MemberStorage;

#[derive(Clone)]
pub struct MemberRepository {
    connection: Arc<MemoryConnection>,
}

impl MemberRepository {
    pub fn new(connection: Arc<MemoryConnection>) -> Self {
        Self { connection }
    }
}

impl MemberStorage for MemberRepository {
    fn store_member(&self, member: &Member) -> Result<()> {
        let mut members = self
            .connection
            .members
            .write()
            .map_err(|_| anyhow!("member store lock poisoned"))?;
        if members.iter().any(|m| m.id == member.id) {
            return Err(anyhow!("member already exists: {}", member.id));
        }
        members.push(member.clone());
        Ok(())
    }

    fn get_member(&self, member_id: &str) -> Result<Option<Member>> {
        let members = self
            .connection
            .members
            .read()
            .map_err(|_| anyhow!("member store lock poisoned"))?;
        Ok(members.iter().find(|m| m.id == member_id).cloned())
    }

    fn list_members(&self) -> Result<Vec<Member>> {
        let members = self
            .connection
            .members
            .read()
            .map_err(|_| anyhow!("member store lock poisoned"))?;
        Ok(members.clone())
    }

    fn update_member(&self, member: &Member) -> Result<()> {
        let mut members = self
            .connection
            .members
            .write()
            .map_err(|_| anyhow!("member store lock poisoned"))?;
        match members.iter_mut().find(|m| m.id == member.id) {
            Some(existing) => {
                *existing = member.clone();
                Ok(())
            }
            None => Err(anyhow!("member not found: {}", member.id)),
        }
    }

    fn update_members(&self, updated: &[Member]) -> Result<()> {
        let mut members = self
            .connection
            .members
            .write()
            .map_err(|_| anyhow!("member store lock poisoned"))?;
        for member in updated {
            match members.iter_mut().find(|m| m.id == member.id) {
                Some(existing) => *existing = member.clone(),
                None => return Err(anyhow!("member not found: {}", member.id)),
            }
        }
        Ok(())
    }

    fn delete_member(&self, member_id: &str) -> Result<bool> {
        let mut members = self
            .connection
            .members
            .write()
            .map_err(|_| anyhow!("member store lock poisoned"))?;
        let before = members.len();
        members.retain(|m| m.id != member_id);
        Ok(members.len() < before)
    }

    fn max_order(&self) -> Result<i32> {
        let members = self
            .connection
            .members
            .read()
            .map_err(|_| anyhow!("member store lock poisoned"))?;
        Ok(members.iter().map(|m| m.order).max().unwrap_or(0))
    }
}
