//! # In-Memory Stores

use std::sync::Arc;

use anyhow::Result;
use credibil_badge::Error;
use credibil_badge::achievement::AchievementStatus;
use credibil_badge::issuance::{IssuanceLine, LineKey};
use credibil_badge::registry::IssuerConfiguration;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Issuer configurations keyed by id.
#[derive(Debug, Default)]
pub struct IssuerTable {
    issuers: DashMap<String, IssuerConfiguration>,
}

impl IssuerTable {
    pub fn put(&self, issuer: &IssuerConfiguration) {
        self.issuers.insert(issuer.issuer_id.clone(), issuer.clone());
    }

    pub fn get(&self, issuer_id: &str) -> Option<IssuerConfiguration> {
        self.issuers.get(issuer_id).map(|r| r.value().clone())
    }

    /// All issuers in creation order.
    pub fn list(&self) -> Vec<IssuerConfiguration> {
        let mut all = self.issuers.iter().map(|r| r.value().clone()).collect::<Vec<_>>();
        all.sort_by_key(|i| i.created);
        all
    }

    pub fn delete(&self, issuer_id: &str) {
        self.issuers.remove(issuer_id);
    }
}

/// Issuance lines partitioned by issuer, one lock per issuer.
#[derive(Debug, Default)]
pub struct LineTable {
    partitions: DashMap<String, Arc<Mutex<Vec<IssuanceLine>>>>,
    owners: DashMap<Uuid, String>,
}

impl LineTable {
    fn partition(&self, issuer_id: &str) -> Arc<Mutex<Vec<IssuanceLine>>> {
        self.partitions.entry(issuer_id.to_string()).or_default().clone()
    }

    pub async fn get(&self, uuid: &Uuid) -> Option<IssuanceLine> {
        let issuer_id = self.owners.get(uuid).map(|r| r.value().clone())?;
        let partition = self.partition(&issuer_id);
        let lines = partition.lock().await;
        lines.iter().find(|l| l.uuid == *uuid).cloned()
    }

    pub async fn get_or_create<F>(&self, key: &LineKey, create: F) -> Result<(IssuanceLine, bool)>
    where
        F: FnOnce(&[IssuanceLine]) -> IssuanceLine + Send,
    {
        let partition = self.partition(&key.issuer_id);
        let mut lines = partition.lock().await;

        if let Some(line) = lines.iter().find(|l| key.matches(l)) {
            return Ok((line.clone(), false));
        }

        let line = create(&lines);
        check_index(&lines, &line)?;
        self.owners.insert(line.uuid, line.issuer_id.clone());
        lines.push(line.clone());
        drop(lines);

        Ok((line, true))
    }

    pub async fn update<F>(&self, uuid: &Uuid, update: F) -> Result<Option<IssuanceLine>>
    where
        F: FnOnce(&mut IssuanceLine) + Send,
    {
        let Some(issuer_id) = self.owners.get(uuid).map(|r| r.value().clone()) else {
            return Ok(None);
        };
        let partition = self.partition(&issuer_id);
        let mut lines = partition.lock().await;

        let Some(pos) = lines.iter().position(|l| l.uuid == *uuid) else {
            return Ok(None);
        };
        let mut line = lines[pos].clone();
        update(&mut line);
        check_index(&lines, &line)?;
        lines[pos] = line.clone();
        drop(lines);

        Ok(Some(line))
    }

    pub async fn lines(&self, issuer_id: &str) -> Vec<IssuanceLine> {
        let partition = self.partition(issuer_id);
        let lines = partition.lock().await;
        lines.clone()
    }

    pub async fn update_status(&self, achievement: &Uuid, status: AchievementStatus) -> usize {
        let partitions = self.partitions.iter().map(|r| r.value().clone()).collect::<Vec<_>>();

        let mut updated = 0;
        for partition in partitions {
            let mut lines = partition.lock().await;
            for line in lines.iter_mut().filter(|l| l.achievement.as_ref() == Some(achievement)) {
                line.status = Some(status);
                updated += 1;
            }
        }
        updated
    }
}

// (issuer_id, status_index) is unique
fn check_index(lines: &[IssuanceLine], line: &IssuanceLine) -> Result<()> {
    let Some(index) = line.status_index else {
        return Ok(());
    };
    if lines.iter().any(|l| l.uuid != line.uuid && l.status_index == Some(index)) {
        return Err(anyhow::Error::new(Error::Conflict(format!(
            "status index {index} is already taken for issuer {}",
            line.issuer_id
        ))));
    }
    Ok(())
}
