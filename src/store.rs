/*
Task persistence.
TaskStore is the contract the scheduling core relies on; JsonFileStore keeps
every owner's tasks in one JSON document.
*/

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, FixedOffset};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Db, Task, TaskEdit, TaskPatch};
use crate::state::calculate_next_task_state;
use crate::sweep::sweep_missed;

pub trait TaskStore: Send + Sync {
    /// All tasks of one owner, in insertion order.
    fn list_tasks(&self, owner: Uuid) -> Result<Vec<Task>>;

    fn get_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>>;

    fn create_task(&self, task: Task) -> Result<Task>;

    /// Replace the patched state fields of a task; `None` if the task does
    /// not exist for this owner.
    fn update_task(&self, id: Uuid, owner: Uuid, patch: &TaskPatch) -> Result<Option<Task>>;

    fn edit_task(&self, id: Uuid, owner: Uuid, edit: TaskEdit) -> Result<Option<Task>>;

    /// `false` if nothing was removed.
    fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<bool>;

    /// Apply `allocated` units of work to a task and persist the new state.
    ///
    /// The default reads and writes in separate steps, like
    /// `list_tasks_swept`.
    fn advance_task(
        &self,
        id: Uuid,
        owner: Uuid,
        allocated: Option<f64>,
        now: DateTime<FixedOffset>,
    ) -> Result<Option<Task>> {
        let Some(task) = self.get_task(id, owner)? else {
            return Ok(None);
        };
        let patch = TaskPatch::from(calculate_next_task_state(&task, allocated, now));
        self.update_task(id, owner, &patch)
    }

    /// List an owner's tasks after flagging overdue ones as missed.
    ///
    /// This default reads and writes back in separate steps; stores that can
    /// do better should override it.
    fn list_tasks_swept(&self, owner: Uuid, now: DateTime<FixedOffset>) -> Result<Vec<Task>> {
        let mut tasks = self.list_tasks(owner)?;
        for (id, patch) in sweep_missed(&mut tasks, now) {
            self.update_task(id, owner, &patch)?;
        }
        Ok(tasks)
    }
}

// JSON file backed store.
//
// Every operation loads, modifies and saves the document under one mutex,
// so read-modify-write sequences (progress and the missed sweep) never interleave.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_db(&self) -> Result<Db> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Db::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&text)?)
    }

    fn save_db(&self, db: &Db) -> Result<()> {
        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let text = serde_json::to_string_pretty(db)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&tmp_path, text)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    // Run `f` against the document while holding the lock.
    // The document is saved only when `f` reports a change.
    fn with_db<R>(&self, f: impl FnOnce(&mut Db) -> (R, bool)) -> Result<R> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut db = self.load_db()?;
        let (out, dirty) = f(&mut db);
        if dirty {
            self.save_db(&db)?;
        }
        Ok(out)
    }
}

impl TaskStore for JsonFileStore {
    fn list_tasks(&self, owner: Uuid) -> Result<Vec<Task>> {
        self.with_db(|db| {
            let tasks = db.tasks.iter().filter(|t| t.owner_id == owner).cloned().collect();
            (tasks, false)
        })
    }

    fn get_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>> {
        self.with_db(|db| {
            let task = db.tasks.iter().find(|t| t.id == id && t.owner_id == owner).cloned();
            (task, false)
        })
    }

    fn create_task(&self, task: Task) -> Result<Task> {
        self.with_db(|db| {
            db.tasks.push(task.clone());
            (task, true)
        })
    }

    fn update_task(&self, id: Uuid, owner: Uuid, patch: &TaskPatch) -> Result<Option<Task>> {
        self.with_db(|db| {
            match db.tasks.iter_mut().find(|t| t.id == id && t.owner_id == owner) {
                Some(t) => {
                    t.apply_patch(patch);
                    (Some(t.clone()), true)
                }
                None => (None, false),
            }
        })
    }

    fn edit_task(&self, id: Uuid, owner: Uuid, edit: TaskEdit) -> Result<Option<Task>> {
        self.with_db(|db| {
            match db.tasks.iter_mut().find(|t| t.id == id && t.owner_id == owner) {
                Some(t) => {
                    t.apply_edit(edit);
                    (Some(t.clone()), true)
                }
                None => (None, false),
            }
        })
    }

    fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        self.with_db(|db| {
            let before = db.tasks.len();
            db.tasks.retain(|t| !(t.id == id && t.owner_id == owner));
            let removed = db.tasks.len() != before;
            (removed, removed)
        })
    }

    // Compute and store the next state in a single locked pass.
    fn advance_task(
        &self,
        id: Uuid,
        owner: Uuid,
        allocated: Option<f64>,
        now: DateTime<FixedOffset>,
    ) -> Result<Option<Task>> {
        self.with_db(|db| {
            match db.tasks.iter_mut().find(|t| t.id == id && t.owner_id == owner) {
                Some(t) => {
                    let patch = TaskPatch::from(calculate_next_task_state(t, allocated, now));
                    t.apply_patch(&patch);
                    (Some(t.clone()), true)
                }
                None => (None, false),
            }
        })
    }

    // Read, sweep and write back in a single locked pass.
    fn list_tasks_swept(&self, owner: Uuid, now: DateTime<FixedOffset>) -> Result<Vec<Task>> {
        self.with_db(|db| {
            let mut tasks: Vec<Task> =
                db.tasks.iter().filter(|t| t.owner_id == owner).cloned().collect();
            let patches = sweep_missed(&mut tasks, now);

            for (id, patch) in &patches {
                if let Some(t) = db.tasks.iter_mut().find(|t| t.id == *id) {
                    t.apply_patch(patch);
                }
            }
            if !patches.is_empty() {
                debug!(%owner, flagged = patches.len(), "persisting missed sweep");
            }

            let dirty = !patches.is_empty();
            (tasks, dirty)
        })
    }
}
