use std::path::PathBuf;
use tokio::fs;

use super::StoreError;
use crate::models::Expert;

/// Expert records live in a single `experts.yaml` in registration order; that
/// order is the directory's natural listing order. Writes happen only through
/// the onboarding/import path.
#[derive(Clone)]
pub struct ExpertStore {
    base_path: PathBuf,
}

impl ExpertStore {
    pub fn new(data_path: PathBuf) -> Self {
        Self {
            base_path: data_path,
        }
    }

    fn experts_file(&self) -> PathBuf {
        self.base_path.join("experts.yaml")
    }

    pub async fn init(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    /// All experts in registration order. A missing file is an empty
    /// directory; an unreadable file is a store failure, never an empty
    /// result.
    pub async fn list(&self) -> Result<Vec<Expert>, StoreError> {
        let path = self.experts_file();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).await?;
        let experts: Vec<Expert> = serde_yaml::from_str(&content)?;
        Ok(experts)
    }

    pub async fn get(&self, expert_id: &str) -> Result<Option<Expert>, StoreError> {
        Ok(self.list().await?.into_iter().find(|e| e.id == expert_id))
    }

    pub async fn save_all(&self, experts: &[Expert]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base_path).await?;
        let content = serde_yaml::to_string(experts)?;
        fs::write(self.experts_file(), content).await?;
        Ok(())
    }
}
