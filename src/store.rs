use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Account, Db, Profile, Task, TaskDraft};

pub const DEFAULT_DB_PATH: &str = "data/db.json";

// JSON file backed store.
// Every load-modify-save cycle holds `lock`, so concurrent requests
// never interleave writes. Task operations are always scoped by owner.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // A missing file is an empty database
    fn load_db(&self) -> Result<Db, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Db::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&text)?)
    }

    fn save_db(&self, db: &Db) -> Result<(), StoreError> {
        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let text = serde_json::to_string_pretty(db)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&tmp_path, text)?;
        fs::rename(&tmp_path, &self.path)?;
        tracing::debug!(path = %self.path.display(), tasks = db.tasks.len(), "db saved");
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&Db) -> T) -> Result<T, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let db = self.load_db()?;
        Ok(f(&db))
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut Db) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut db = self.load_db()?;
        let out = f(&mut db)?;
        self.save_db(&db)?;
        Ok(out)
    }

    // -----------------------------
    // Tasks
    // -----------------------------

    // All tasks of one user, newest first
    pub fn list_tasks_for_user(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        self.read(|db| {
            let mut tasks: Vec<Task> = db
                .tasks
                .iter()
                .filter(|t| t.user_id == user_id)
                .cloned()
                .collect();
            tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            tasks
        })
    }

    pub fn create_task(
        &self,
        user_id: Uuid,
        draft: TaskDraft,
        now: DateTime<FixedOffset>,
    ) -> Result<Task, StoreError> {
        let task = Task {
            id: Uuid::new_v4(),
            user_id,
            subject: draft.subject,
            title: draft.title,
            due_date: draft.due_date,
            priority: draft.priority,
            notes: draft.notes,
            done: false,
            created_at: now,
            updated_at: now,
        };

        self.write(|db| {
            db.tasks.push(task.clone());
            Ok(())
        })?;
        tracing::debug!(task_id = %task.id, %user_id, "task created");
        Ok(task)
    }

    // Replaces the editable fields; `done` is left as is
    pub fn update_task(
        &self,
        user_id: Uuid,
        id: Uuid,
        draft: TaskDraft,
        now: DateTime<FixedOffset>,
    ) -> Result<Task, StoreError> {
        self.write(|db| {
            let t = owned_task_mut(db, user_id, id)?;
            t.subject = draft.subject;
            t.title = draft.title;
            t.due_date = draft.due_date;
            t.priority = draft.priority;
            t.notes = draft.notes;
            t.updated_at = now;
            Ok(t.clone())
        })
    }

    pub fn set_done(
        &self,
        user_id: Uuid,
        id: Uuid,
        done: bool,
        now: DateTime<FixedOffset>,
    ) -> Result<Task, StoreError> {
        self.write(|db| {
            let t = owned_task_mut(db, user_id, id)?;
            t.done = done;
            t.updated_at = now;
            Ok(t.clone())
        })
    }

    pub fn toggle_done(
        &self,
        user_id: Uuid,
        id: Uuid,
        now: DateTime<FixedOffset>,
    ) -> Result<Task, StoreError> {
        self.write(|db| {
            let t = owned_task_mut(db, user_id, id)?;
            t.done = !t.done;
            t.updated_at = now;
            Ok(t.clone())
        })
    }

    pub fn delete_task(&self, user_id: Uuid, id: Uuid) -> Result<(), StoreError> {
        self.write(|db| {
            let before = db.tasks.len();
            db.tasks.retain(|t| !(t.id == id && t.user_id == user_id));
            if db.tasks.len() == before {
                return Err(StoreError::TaskNotFound(id));
            }
            Ok(())
        })?;
        tracing::debug!(task_id = %id, %user_id, "task deleted");
        Ok(())
    }

    // -----------------------------
    // Profiles & accounts
    // -----------------------------

    pub fn upsert_profile(
        &self,
        id: Uuid,
        email: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<Profile, StoreError> {
        self.write(|db| Ok(put_profile(db, id, email, now)))
    }

    pub fn profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        self.read(|db| db.profiles.iter().find(|p| p.id == id).cloned())
    }

    pub fn find_account(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.read(|db| db.accounts.iter().find(|a| a.email == email).cloned())
    }

    // Account and its profile land in the same save, or neither does
    pub fn register_account(
        &self,
        account: Account,
        now: DateTime<FixedOffset>,
    ) -> Result<Profile, StoreError> {
        self.write(|db| {
            if db.accounts.iter().any(|a| a.email == account.email) {
                return Err(StoreError::EmailTaken(account.email));
            }
            let profile = put_profile(db, account.user_id, &account.email, now);
            db.accounts.push(account);
            Ok(profile)
        })
    }
}

fn put_profile(db: &mut Db, id: Uuid, email: &str, now: DateTime<FixedOffset>) -> Profile {
    let profile = Profile {
        id,
        email: email.to_string(),
        updated_at: now,
    };
    match db.profiles.iter_mut().find(|p| p.id == id) {
        Some(existing) => *existing = profile.clone(),
        None => db.profiles.push(profile.clone()),
    }
    profile
}

fn owned_task_mut(db: &mut Db, user_id: Uuid, id: Uuid) -> Result<&mut Task, StoreError> {
    db.tasks
        .iter_mut()
        .find(|t| t.id == id && t.user_id == user_id)
        .ok_or(StoreError::TaskNotFound(id))
}
