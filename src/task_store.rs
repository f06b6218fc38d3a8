use crate::error::{Result, TaskError};
use crate::task::{self, Status, Task};
use std::{
    ffi::OsString,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

pub const DEFAULT_FILE: &str = "tasks.json";

/// The task collection together with the JSON file it mirrors.
///
/// Every mutating operation rewrites the whole file before returning.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Reads the task file, creating it with an empty array first if it is missing.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| TaskError::storage(parent, e))?;
            }
            let store = Self {
                path,
                tasks: Vec::new(),
            };
            store.save_to_file()?;
            debug!(path = %store.path.display(), "created empty task file");
            return Ok(store);
        }

        let data = fs::read_to_string(&path).map_err(|e| TaskError::storage(&path, e))?;
        let tasks: Vec<Task> = serde_json::from_str(&data).map_err(|source| TaskError::Parse {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), count = tasks.len(), "loaded tasks");
        Ok(Self { path, tasks })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tasks with the given status, or all of them, in creation order.
    pub fn list(&self, filter: Option<Status>) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| filter.map_or(true, |status| t.status == status))
            .collect()
    }

    /// One past the highest id in use. An id freed by deleting a lower task is not handed
    /// out again, but deleting the highest task makes its id available to the next add.
    pub fn next_id(&self) -> Result<u32> {
        match self.tasks.iter().map(|t| t.id).max() {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or_else(|| {
                TaskError::validation(format!("no task ID left after {max}"))
            }),
        }
    }

    pub fn add_task(&mut self, description: &str) -> Result<&Task> {
        let description = validate_description(description)?;
        let task = Task::new(self.next_id()?, description, task::now());
        debug!(id = task.id, "adding task");
        self.tasks.push(task);
        self.save_to_file()?;
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    pub fn update_task(&mut self, id: u32, description: &str) -> Result<()> {
        let description = validate_description(description)?;
        let task = self.find_mut(id)?;
        task.description = description;
        task.updated_at = task::now();
        debug!(id, "updated task description");
        self.save_to_file()
    }

    /// Removes the task with `id`, keeping the others in order.
    pub fn delete_task(&mut self, id: u32) -> Result<Task> {
        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            warn!(id, "delete of unknown task");
            return Err(TaskError::NotFound(id));
        };
        let removed = self.tasks.remove(index);
        debug!(id, "deleted task");
        self.save_to_file()?;
        Ok(removed)
    }

    /// Drops every task; returns how many were removed.
    pub fn clear(&mut self) -> Result<usize> {
        let removed = self.tasks.len();
        self.tasks.clear();
        debug!(removed, "cleared tasks");
        self.save_to_file()?;
        Ok(removed)
    }

    pub fn set_status(&mut self, id: u32, status: Status) -> Result<()> {
        let task = self.find_mut(id)?;
        task.status = status;
        task.updated_at = task::now();
        debug!(id, %status, "changed task status");
        self.save_to_file()
    }

    /// Overwrites the task file with the current collection.
    ///
    /// The JSON is written to a sibling temp file which is then renamed over the target,
    /// so a failed write never leaves a truncated task file behind.
    pub fn save_to_file(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.tasks)
            .map_err(|e| TaskError::storage(&self.path, e.into()))?;

        let tmp_path = self.tmp_path();
        let mut tmp_file = File::create(&tmp_path).map_err(|e| TaskError::storage(&tmp_path, e))?;
        let written = tmp_file
            .write_all(json.as_bytes())
            .and_then(|()| tmp_file.sync_all())
            .map_err(|e| TaskError::storage(&tmp_path, e))
            .and_then(|()| {
                fs::rename(&tmp_path, &self.path).map_err(|e| TaskError::storage(&self.path, e))
            });
        if let Err(err) = written {
            // Best-effort cleanup of the staging file.
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }

        debug!(path = %self.path.display(), count = self.tasks.len(), "saved tasks");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from(DEFAULT_FILE));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn find_mut(&mut self, id: u32) -> Result<&mut Task> {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => Ok(task),
            None => {
                warn!(id, "unknown task id");
                Err(TaskError::NotFound(id))
            }
        }
    }
}

/// Parses a task id given on the command line.
pub fn parse_id(raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            TaskError::validation(format!("invalid ID '{raw}', ID has to be an integer"))
        })
}

fn validate_description(description: &str) -> Result<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(TaskError::validation("task description cannot be empty"));
    }
    Ok(description.to_string())
}
