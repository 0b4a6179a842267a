use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::sync::Mutex;

use super::StoreError;
use crate::models::{Consultation, ConsultationStatus};

const LOCK_RETRY_DELAY: Duration = Duration::from_millis(10);
const LOCK_STALE_AFTER: Duration = Duration::from_secs(5);

/// Exclusive lock over the consultations directory, honored across processes.
/// `create_new` is an atomic create-or-fail on every platform, so whichever
/// caller creates the file owns the critical section; release removes it. A
/// lock file left behind by a dead process is broken once its mtime goes
/// stale.
struct FsLock {
    path: PathBuf,
}

impl FsLock {
    async fn acquire(path: PathBuf) -> Result<Self, StoreError> {
        loop {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if let Ok(modified) =
                        fs::metadata(&path).await.and_then(|m| m.modified())
                    {
                        if modified.elapsed().unwrap_or_default() > LOCK_STALE_AFTER {
                            let _ = fs::remove_file(&path).await;
                            continue;
                        }
                    }
                    tokio::time::sleep(LOCK_RETRY_DELAY).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for FsLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Result of the conditional claim write.
#[derive(Debug)]
pub enum ClaimOutcome {
    /// The caller won: consultant bound and status moved to scheduled.
    Claimed(Consultation),
    Missing,
    /// A consultant is already bound; another claim landed first.
    AlreadyClaimed,
    /// Unbound but not claimable (cancelled before anyone claimed it).
    NotClaimable(ConsultationStatus),
}

#[derive(Debug)]
pub enum TransitionOutcome {
    Applied(Consultation),
    Missing,
    Rejected { from: ConsultationStatus },
}

#[derive(Debug)]
pub enum SessionOutcome {
    Recorded(String),
    Existing(String),
    Missing,
    Ineligible(ConsultationStatus),
}

/// Consultation records, one yaml file per record under
/// `<data>/consultations/`.
///
/// Every write that touches the `consultant_id`/`status` pair re-reads the
/// precondition and writes the record back inside one critical section, so a
/// claim is a genuine conditional update and never a read-then-write pair
/// with a race window in between. The section is guarded twice: an async
/// mutex serializes tasks sharing this instance, and an on-disk [`FsLock`]
/// serializes separate instances over the same data directory — each CLI
/// invocation constructs its own store, so the claim guarantee has to hold
/// between processes, not just between tasks.
#[derive(Clone)]
pub struct ConsultationStore {
    base_path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl ConsultationStore {
    pub fn new(data_path: PathBuf) -> Self {
        Self {
            base_path: data_path,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn consultations_path(&self) -> PathBuf {
        self.base_path.join("consultations")
    }

    fn consultation_file(&self, id: &str) -> PathBuf {
        self.consultations_path().join(format!("{id}.yaml"))
    }

    fn lock_file(&self) -> PathBuf {
        self.consultations_path().join(".lock")
    }

    pub async fn init(&self) -> Result<(), StoreError> {
        fs::create_dir_all(self.consultations_path()).await?;
        Ok(())
    }

    async fn read_record(&self, id: &str) -> Result<Option<Consultation>, StoreError> {
        let path = self.consultation_file(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).await?;
        let consultation: Consultation = serde_yaml::from_str(&content)?;
        Ok(Some(consultation))
    }

    async fn write_record(&self, consultation: &Consultation) -> Result<(), StoreError> {
        let path = self.consultation_file(&consultation.id);
        let content = serde_yaml::to_string(consultation)?;
        fs::write(&path, content).await?;
        Ok(())
    }

    pub async fn insert(&self, consultation: &Consultation) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let _lock = FsLock::acquire(self.lock_file()).await?;
        let path = self.consultation_file(&consultation.id);
        if path.exists() {
            return Err(StoreError::Duplicate(consultation.id.clone()));
        }
        self.write_record(consultation).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Consultation>, StoreError> {
        self.read_record(id).await
    }

    /// All pending consultations, oldest first. Individual unreadable files
    /// are logged and skipped so one bad record does not hide the queue.
    pub async fn list_pending(&self) -> Result<Vec<Consultation>, StoreError> {
        let mut pending = Vec::new();
        let dir = self.consultations_path();

        if !dir.exists() {
            return Ok(pending);
        }

        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "yaml") {
                match fs::read_to_string(&path).await {
                    Ok(content) => match serde_yaml::from_str::<Consultation>(&content) {
                        Ok(c) => {
                            if c.status == ConsultationStatus::Pending {
                                pending.push(c);
                            }
                        }
                        Err(e) => {
                            tracing::error!(
                                "Failed to parse consultation file {}: {}",
                                path.display(),
                                e
                            );
                        }
                    },
                    Err(e) => {
                        tracing::error!(
                            "Failed to read consultation file {}: {}",
                            path.display(),
                            e
                        );
                    }
                }
            }
        }

        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(pending)
    }

    /// The load-bearing conditional update: bind `consultant_id` and move the
    /// record to `scheduled`, applied only if the record is still pending and
    /// unbound at the moment of the write. Exactly one of N concurrent
    /// claimers observes `Claimed`, whether they share this instance or run
    /// in separate processes.
    pub async fn try_claim(
        &self,
        id: &str,
        consultant_id: &str,
    ) -> Result<ClaimOutcome, StoreError> {
        let _guard = self.write_lock.lock().await;
        let _lock = FsLock::acquire(self.lock_file()).await?;

        let mut consultation = match self.read_record(id).await? {
            Some(c) => c,
            None => return Ok(ClaimOutcome::Missing),
        };

        if consultation.consultant_id.is_some() {
            return Ok(ClaimOutcome::AlreadyClaimed);
        }
        if consultation.status != ConsultationStatus::Pending {
            return Ok(ClaimOutcome::NotClaimable(consultation.status));
        }

        consultation.consultant_id = Some(consultant_id.to_string());
        consultation.status = ConsultationStatus::Scheduled;
        self.write_record(&consultation).await?;

        Ok(ClaimOutcome::Claimed(consultation))
    }

    /// Status-only update, validated against the transition table inside the
    /// critical section. Only the closing statuses are accepted as targets:
    /// moving to `scheduled` binds a consultant and is `try_claim`'s job. A
    /// cancelled record keeps any bound consultant for audit.
    pub async fn apply_transition(
        &self,
        id: &str,
        to: ConsultationStatus,
    ) -> Result<TransitionOutcome, StoreError> {
        let _guard = self.write_lock.lock().await;
        let _lock = FsLock::acquire(self.lock_file()).await?;

        let mut consultation = match self.read_record(id).await? {
            Some(c) => c,
            None => return Ok(TransitionOutcome::Missing),
        };

        if !matches!(
            to,
            ConsultationStatus::Completed | ConsultationStatus::Cancelled
        ) {
            return Ok(TransitionOutcome::Rejected {
                from: consultation.status,
            });
        }
        if !consultation.status.can_transition_to(to) {
            return Ok(TransitionOutcome::Rejected {
                from: consultation.status,
            });
        }

        consultation.status = to;
        self.write_record(&consultation).await?;

        Ok(TransitionOutcome::Applied(consultation))
    }

    /// Set-if-absent write for the call session handle. Returns the handle
    /// already on record when one exists, so session minting stays idempotent
    /// under concurrent initiation.
    pub async fn record_session_handle(
        &self,
        id: &str,
        handle: &str,
    ) -> Result<SessionOutcome, StoreError> {
        let _guard = self.write_lock.lock().await;
        let _lock = FsLock::acquire(self.lock_file()).await?;

        let mut consultation = match self.read_record(id).await? {
            Some(c) => c,
            None => return Ok(SessionOutcome::Missing),
        };

        if let Some(existing) = consultation.session_handle {
            return Ok(SessionOutcome::Existing(existing));
        }

        if !matches!(
            consultation.status,
            ConsultationStatus::Scheduled | ConsultationStatus::InProgress
        ) {
            return Ok(SessionOutcome::Ineligible(consultation.status));
        }

        consultation.session_handle = Some(handle.to_string());
        self.write_record(&consultation).await?;

        Ok(SessionOutcome::Recorded(handle.to_string()))
    }
}
