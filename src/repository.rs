// Todo repository: owns the list, persists it through a key-value store

use crate::error::{TodoError, TodoResult};
use crate::models::{Clock, SystemClock, Todo, TodoPatch, TodoType};
use crate::notify::NotificationBus;
use crate::store::KeyValueStore;
use chrono::{DateTime, TimeDelta, Utc};
use eyre::Context;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_STORAGE_KEY: &str = "todos";

const TEXT_REQUIRED: &str = "Todo text is required.";

/// Shortest id fragment `resolve_id` accepts
pub const MIN_ID_FRAGMENT: usize = 4;

/// In-memory todo list backed by one key of a `KeyValueStore`
///
/// Every mutation builds a new list, flushes it, and only then replaces the
/// owned list, so a failed flush leaves the repository as it was.
pub struct TodoRepository<S: KeyValueStore> {
    store: S,
    key: String,
    todos: Vec<Todo>,
    bus: NotificationBus,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> TodoRepository<S> {
    /// Open the repository and load whatever is stored under `key`
    pub fn open(store: S, key: impl Into<String>, bus: NotificationBus) -> Self {
        Self::with_clock(store, key, bus, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: S,
        key: impl Into<String>,
        bus: NotificationBus,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut repo = Self {
            store,
            key: key.into(),
            todos: Vec::new(),
            bus,
            clock,
        };
        repo.todos = repo.load();
        repo
    }

    /// Read the persisted list
    ///
    /// Never fails: an absent key, an unreadable store or a malformed document
    /// all yield an empty list.
    pub fn load(&self) -> Vec<Todo> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "No stored todo list, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(
                    key = %self.key,
                    error = ?e,
                    "Failed to read stored todo list, starting empty"
                );
                return Vec::new();
            }
        };

        match parse_list(&raw) {
            Ok(todos) => {
                info!(key = %self.key, count = todos.len(), "Loaded todo list");
                todos
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Ignoring malformed todo list");
                Vec::new()
            }
        }
    }

    /// Reload the owned list from the store, discarding in-memory state
    pub fn reload(&mut self) {
        self.todos = self.load();
    }

    /// Flush the current list
    pub fn save(&mut self) -> TodoResult<()> {
        let todos = self.todos.clone();
        self.commit(todos)
    }

    /// Todos in stored order (newest created first)
    pub fn list(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Full id for a whole id, or for an unambiguous prefix or suffix of one
    ///
    /// Fragments shorter than `MIN_ID_FRAGMENT` characters only match a whole id.
    pub fn resolve_id(&self, fragment: &str) -> TodoResult<String> {
        let fragment = fragment.trim();
        if self.get(fragment).is_some() {
            return Ok(fragment.to_string());
        }
        if fragment.chars().count() < MIN_ID_FRAGMENT {
            return Err(TodoError::NotFound(fragment.to_string()));
        }

        let mut matches = self
            .todos
            .iter()
            .filter(|t| t.id.starts_with(fragment) || t.id.ends_with(fragment));
        match (matches.next(), matches.next()) {
            (Some(todo), None) => Ok(todo.id.clone()),
            _ => Err(TodoError::NotFound(fragment.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn add(&mut self, text: &str, todo_type: TodoType) -> TodoResult<Todo> {
        let text = self.validated_text(text)?;

        let now = self.clock.now();
        let todo = Todo {
            id: Uuid::now_v7().to_string(),
            text,
            completed: false,
            time_created: now,
            time_modified: now,
            target_date: None,
            todo_type,
        };

        let mut next = Vec::with_capacity(self.todos.len() + 1);
        next.push(todo.clone());
        next.extend(self.todos.iter().cloned());
        self.commit(next)?;

        info!(id = %todo.id, todo_type = %todo.todo_type, "Added todo");
        self.bus.success("Todo added", Some(todo.text.clone()));
        Ok(todo)
    }

    pub fn update(&mut self, id: &str, patch: TodoPatch) -> TodoResult<Todo> {
        let index = self.position(id)?;

        let text = match &patch.text {
            Some(text) => Some(self.validated_text(text)?),
            None => None,
        };

        let mut todo = self.todos[index].clone();
        if let Some(text) = text {
            todo.text = text;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        if let Some(todo_type) = patch.todo_type {
            todo.todo_type = todo_type;
        }
        if let Some(target_date) = patch.target_date {
            todo.target_date = target_date;
        }
        todo.time_modified = self.next_modified(&todo);

        let mut next = self.todos.clone();
        next[index] = todo.clone();
        self.commit(next)?;

        debug!(id, completed = todo.completed, "Updated todo");
        Ok(todo)
    }

    /// Flip the completion flag
    pub fn toggle_completed(&mut self, id: &str) -> TodoResult<Todo> {
        let completed = self.todos[self.position(id)?].completed;
        self.update(id, TodoPatch::completed(!completed))
    }

    /// Remove a todo
    ///
    /// The caller is responsible for having obtained the user's consent.
    pub fn delete(&mut self, id: &str) -> TodoResult<Todo> {
        let index = self.position(id)?;

        let mut next = self.todos.clone();
        let removed = next.remove(index);
        self.commit(next)?;

        info!(id, "Deleted todo");
        self.bus.info("Todo deleted", Some(removed.text.clone()));
        Ok(removed)
    }

    /// Get a reference to the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn position(&self, id: &str) -> TodoResult<usize> {
        self.todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TodoError::NotFound(id.to_string()))
    }

    fn validated_text(&self, text: &str) -> TodoResult<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.bus.error(TEXT_REQUIRED, None);
            return Err(TodoError::Validation(TEXT_REQUIRED.to_string()));
        }
        Ok(trimmed.to_string())
    }

    /// Modification time for an edit, always strictly after the previous one
    fn next_modified(&self, todo: &Todo) -> DateTime<Utc> {
        let now = self.clock.now();
        if now > todo.time_modified {
            now
        } else {
            todo.time_modified + TimeDelta::milliseconds(1)
        }
    }

    fn commit(&mut self, next: Vec<Todo>) -> TodoResult<()> {
        let flushed = serde_json::to_string(&next)
            .context("Failed to serialize todo list")
            .and_then(|json| self.store.set(&self.key, &json));

        if let Err(e) = flushed {
            warn!(key = %self.key, error = ?e, "Failed to persist todo list");
            self.bus.error("Could not save todos", Some(format!("{:#}", e)));
            return Err(TodoError::Storage(e));
        }

        self.todos = next;
        Ok(())
    }
}

/// Decode a stored list, dropping later duplicates of an id
pub fn parse_list(raw: &str) -> TodoResult<Vec<Todo>> {
    let todos: Vec<Todo> =
        serde_json::from_str(raw).map_err(|e| TodoError::StorageRead(e.to_string()))?;

    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::with_capacity(todos.len());
    for todo in todos {
        if seen.insert(todo.id.clone()) {
            unique.push(todo);
        } else {
            warn!(id = %todo.id, "Skipping duplicate todo id");
        }
    }
    Ok(unique)
}
