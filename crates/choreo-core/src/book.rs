//! User-facing chore operations over a [`TaskStore`].
//!
//! Every mutation loads the user's document, changes it in memory and saves
//! the whole field back. Two sessions editing at once will overwrite each other.

use chrono::{DateTime, Utc};
use log::info;
use uuid::Uuid;

use crate::agenda::{self, AgendaFilter};
use crate::error::CoreError;
use crate::models::{
    canonical_timestamp, NewTask, Occurrence, Task, UpdateTask, DEFAULT_SECTION,
};
use crate::recurrence::{is_occurrence, ExpandOptions};
use crate::store::{validate_user_id, TaskStore};

/// Chores and sections of one user.
pub struct ChoreBook<S: TaskStore> {
    store: S,
    user_id: String,
}

impl<S: TaskStore> ChoreBook<S> {
    pub fn new(store: S, user_id: impl Into<String>) -> Result<Self, CoreError> {
        let user_id = user_id.into();
        validate_user_id(&user_id)?;
        Ok(Self { store, user_id })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub async fn list(&self) -> Result<Vec<Task>, CoreError> {
        self.store.load_tasks(&self.user_id).await
    }

    /// Looks a task up by a prefix of its id (at least two characters).
    pub async fn find(&self, id_prefix: &str) -> Result<Task, CoreError> {
        let tasks = self.list().await?;
        let index = resolve_index(&tasks, id_prefix)?;
        Ok(tasks[index].clone())
    }

    pub async fn add(&self, data: NewTask) -> Result<Task, CoreError> {
        let name = data.name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidInput("Task name cannot be empty.".to_string()));
        }
        let section = self.known_section(data.section.as_deref()).await?;

        let mut task = Task::new(name, data.date_time, data.repeat).with_section(section);
        task.description = data.description.filter(|d| !d.trim().is_empty());

        let mut tasks = self.list().await?;
        tasks.push(task.clone());
        self.store.save_tasks(&self.user_id, &tasks).await?;
        info!(
            "event=chore_added module=book user={} id={} repeat={}",
            self.user_id, task.id, task.repeat
        );
        Ok(task)
    }

    /// Changes series fields. Override sets are left as they are.
    pub async fn edit(&self, id_prefix: &str, data: UpdateTask) -> Result<Task, CoreError> {
        let section = match data.section.as_deref() {
            Some(section) => Some(self.known_section(Some(section)).await?),
            None => None,
        };

        let mut tasks = self.list().await?;
        let index = resolve_index(&tasks, id_prefix)?;
        let task = &mut tasks[index];

        if let Some(name) = data.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(CoreError::InvalidInput("Task name cannot be empty.".to_string()));
            }
            task.name = name.to_string();
        }
        if let Some(date_time) = data.date_time {
            task.date_time = date_time.map(canonical_timestamp);
        }
        if let Some(repeat) = data.repeat {
            task.repeat = repeat;
        }
        if let Some(section) = section {
            task.section = section;
        }
        if let Some(description) = data.description {
            task.description = description;
        }

        let updated = task.clone();
        self.store.save_tasks(&self.user_id, &tasks).await?;
        info!("event=chore_edited module=book user={} id={}", self.user_id, updated.id);
        Ok(updated)
    }

    /// Removes the task and with it every occurrence.
    pub async fn delete_all(&self, id_prefix: &str) -> Result<Task, CoreError> {
        let mut tasks = self.list().await?;
        let index = resolve_index(&tasks, id_prefix)?;
        let removed = tasks.remove(index);
        self.store.save_tasks(&self.user_id, &tasks).await?;
        info!("event=chore_deleted module=book user={} id={}", self.user_id, removed.id);
        Ok(removed)
    }

    /// Removes one occurrence, leaving the rest of the series in place.
    pub async fn delete_occurrence(
        &self,
        id_prefix: &str,
        instant: DateTime<Utc>,
        options: &ExpandOptions,
    ) -> Result<Task, CoreError> {
        self.update_occurrence(id_prefix, instant, options, |task| {
            task.delete_occurrence(instant);
            Ok(())
        })
        .await
    }

    pub async fn restore_occurrence(
        &self,
        id_prefix: &str,
        instant: DateTime<Utc>,
        options: &ExpandOptions,
    ) -> Result<Task, CoreError> {
        self.update_occurrence(id_prefix, instant, options, |task| {
            task.restore_occurrence(instant);
            Ok(())
        })
        .await
    }

    /// Flips the done state of one occurrence. Returns the new state.
    ///
    /// A deleted occurrence is rejected; it has to be restored first.
    pub async fn toggle_done(
        &self,
        id_prefix: &str,
        instant: DateTime<Utc>,
        options: &ExpandOptions,
    ) -> Result<bool, CoreError> {
        let task = self
            .update_occurrence(id_prefix, instant, options, |task| {
                if task.is_deleted_at(instant) {
                    return Err(CoreError::InvalidInput(format!(
                        "{} of '{}' is deleted; restore it first",
                        canonical_timestamp(instant),
                        task.name
                    )));
                }
                task.toggle_done(instant);
                Ok(())
            })
            .await?;
        Ok(task.is_done_at(instant))
    }

    async fn update_occurrence(
        &self,
        id_prefix: &str,
        instant: DateTime<Utc>,
        options: &ExpandOptions,
        apply: impl FnOnce(&mut Task) -> Result<(), CoreError>,
    ) -> Result<Task, CoreError> {
        let mut tasks = self.list().await?;
        let index = resolve_index(&tasks, id_prefix)?;
        let task = &mut tasks[index];

        if !is_occurrence(task, instant, options) {
            return Err(CoreError::InvalidInput(format!(
                "{} is not an occurrence of '{}'",
                canonical_timestamp(instant),
                task.name
            )));
        }
        apply(&mut *task)?;

        let updated = task.clone();
        self.store.save_tasks(&self.user_id, &tasks).await?;
        info!(
            "event=occurrence_updated module=book user={} id={} occurrence={}",
            self.user_id,
            updated.id,
            canonical_timestamp(instant)
        );
        Ok(updated)
    }

    pub async fn sections(&self) -> Result<Vec<String>, CoreError> {
        self.store.load_sections(&self.user_id).await
    }

    pub async fn add_section(&self, name: &str) -> Result<String, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidInput("Section name cannot be empty.".to_string()));
        }
        if name.eq_ignore_ascii_case(DEFAULT_SECTION) {
            return Err(CoreError::ReservedSection(name.to_string()));
        }
        let mut sections = self.sections().await?;
        if sections.iter().any(|s| s == name) {
            return Err(CoreError::SectionExists(name.to_string()));
        }
        sections.push(name.to_string());
        self.store.save_sections(&self.user_id, &sections).await?;
        info!("event=section_added module=book user={} section={}", self.user_id, name);
        Ok(name.to_string())
    }

    /// Removes a section and moves its tasks to the default section.
    /// Returns how many tasks were moved.
    pub async fn delete_section(&self, name: &str) -> Result<usize, CoreError> {
        if name.eq_ignore_ascii_case(DEFAULT_SECTION) {
            return Err(CoreError::ReservedSection(name.to_string()));
        }
        let mut sections = self.sections().await?;
        let Some(position) = sections.iter().position(|s| s == name) else {
            return Err(CoreError::NotFound(format!("No section named '{}'", name)));
        };
        sections.remove(position);

        let mut tasks = self.list().await?;
        let mut moved = 0;
        for task in tasks.iter_mut().filter(|t| t.section == name) {
            task.section = DEFAULT_SECTION.to_string();
            moved += 1;
        }
        if moved > 0 {
            self.store.save_tasks(&self.user_id, &tasks).await?;
        }
        self.store.save_sections(&self.user_id, &sections).await?;
        info!(
            "event=section_deleted module=book user={} section={} reassigned={}",
            self.user_id, name, moved
        );
        Ok(moved)
    }

    /// Drops override entries older than `cutoff` from every task.
    pub async fn compact(&self, cutoff: DateTime<Utc>) -> Result<usize, CoreError> {
        let mut tasks = self.list().await?;
        let removed: usize = tasks.iter_mut().map(|t| t.compact_overrides(cutoff)).sum();
        if removed > 0 {
            self.store.save_tasks(&self.user_id, &tasks).await?;
        }
        info!(
            "event=overrides_compacted module=book user={} removed={} cutoff={}",
            self.user_id,
            removed,
            canonical_timestamp(cutoff)
        );
        Ok(removed)
    }

    pub async fn calendar(
        &self,
        options: &ExpandOptions,
        now: DateTime<Utc>,
        filter: &AgendaFilter,
    ) -> Result<Vec<Occurrence>, CoreError> {
        let tasks = self.list().await?;
        Ok(agenda::expand_all(&tasks, options, now, filter))
    }

    pub async fn today(
        &self,
        options: &ExpandOptions,
        now: DateTime<Utc>,
    ) -> Result<Vec<Occurrence>, CoreError> {
        let tasks = self.list().await?;
        Ok(agenda::today(&tasks, options, now))
    }

    /// Maps a requested section onto one the user actually has.
    async fn known_section(&self, requested: Option<&str>) -> Result<String, CoreError> {
        let Some(requested) = requested.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(DEFAULT_SECTION.to_string());
        };
        let sections = self.sections().await?;
        if sections.iter().any(|s| s == requested) {
            Ok(requested.to_string())
        } else {
            Ok(DEFAULT_SECTION.to_string())
        }
    }
}

fn resolve_index(tasks: &[Task], id_prefix: &str) -> Result<usize, CoreError> {
    let id_prefix = id_prefix.trim().to_lowercase();
    if id_prefix.len() < 2 {
        return Err(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string(),
        ));
    }
    if let Ok(id) = id_prefix.parse::<Uuid>() {
        if let Some(index) = tasks.iter().position(|t| t.id == id) {
            return Ok(index);
        }
    }

    let matches: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.id.to_string().starts_with(&id_prefix))
        .map(|(i, _)| i)
        .collect();
    match matches.as_slice() {
        [index] => Ok(*index),
        [] => Err(CoreError::NotFound(format!(
            "No task found with ID prefix '{}'",
            id_prefix
        ))),
        _ => Err(CoreError::AmbiguousId(
            matches
                .iter()
                .map(|&i| (tasks[i].id.to_string(), tasks[i].name.clone()))
                .collect(),
        )),
    }
}
