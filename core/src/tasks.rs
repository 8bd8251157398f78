//! Task-domain command handler.
//!
//! Reference resolution is id-first: a purely numeric identifier that hits a
//! record always wins, even when the same text would also match names. The
//! substring fallback refuses to guess — more than one match reports
//! candidates and asks for an id.

use chrono::NaiveDate;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::dates::{self, DateFallback};
use crate::intent::TaskIntent;
use crate::outcome::CommandOutcome;
use crate::records::{OptionTag, Priority, Task, TaskQuery};
use crate::store::{StoreError, TaskStore};

/// How many candidates an ambiguity report enumerates.
pub const AMBIGUITY_PREVIEW: usize = 5;
/// How many tasks a listing shows before summarizing the rest.
const LIST_CAP: usize = 10;

const UNKNOWN_HELP: &str = "I didn't understand that. Try commands like:\n\
                            • 'delete buy milk'\n\
                            • 'complete task 5'\n\
                            • 'add finish report tomorrow'\n\
                            • 'show my tasks'\n\
                            • 'clear completed tasks'";

/// An identifier that is purely digits resolves by id first.
pub(crate) fn numeric_id(identifier: &str) -> Option<i64> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

pub struct TaskCommands<'a, S: TaskStore + ?Sized> {
    store: &'a S,
    user_id: Uuid,
}

impl<'a, S: TaskStore + ?Sized> TaskCommands<'a, S> {
    pub fn new(store: &'a S, user_id: Uuid) -> Self {
        Self { store, user_id }
    }

    /// Dispatch one resolved intent. `today` anchors all date arithmetic so
    /// callers (and tests) control the clock.
    pub async fn execute(
        &self,
        intent: TaskIntent,
        today: NaiveDate,
    ) -> Result<CommandOutcome, StoreError> {
        match intent {
            TaskIntent::Add {
                name,
                due_date,
                priority,
                option,
            } => {
                // Task due dates stay unset on parse failure; a silently
                // wrong date is worse than none.
                let due = dates::parse(due_date.as_deref(), today, DateFallback::Unset);
                self.add(name, due, priority, option).await
            }
            TaskIntent::Delete { identifier } => self.delete(&identifier).await,
            TaskIntent::Complete { identifier } => self.set_completed(&identifier, true).await,
            TaskIntent::Uncomplete { identifier } => self.set_completed(&identifier, false).await,
            TaskIntent::List { query } => self.list(query, today).await,
            TaskIntent::ClearCompleted => self.clear_completed().await,
            TaskIntent::Unknown { raw } => {
                tracing::debug!(payload = %raw, "unrecognized task command");
                Ok(CommandOutcome::fail(UNKNOWN_HELP))
            }
        }
    }

    async fn add(
        &self,
        name: String,
        due_date: Option<NaiveDate>,
        priority: Priority,
        option: OptionTag,
    ) -> Result<CommandOutcome, StoreError> {
        let task = self
            .store
            .create_task(
                self.user_id,
                crate::records::NewTask {
                    name,
                    due_date,
                    priority,
                    option,
                },
            )
            .await?;
        Ok(CommandOutcome::ok_with(
            format!("Added new task successfully: '{}'", task.name),
            json!({ "task": task }),
        ))
    }

    async fn delete(&self, identifier: &str) -> Result<CommandOutcome, StoreError> {
        if let Some(id) = numeric_id(identifier) {
            if let Some(task) = self.store.task_by_id(self.user_id, id).await? {
                self.store.delete_task(self.user_id, id).await?;
                return Ok(CommandOutcome::ok(format!(
                    "Deleted task successfully: '{}'",
                    task.name
                )));
            }
        }

        let matches = self.store.find_tasks(self.user_id, identifier, None).await?;
        match matches.as_slice() {
            [] => Ok(CommandOutcome::fail(format!(
                "No task found matching '{identifier}'"
            ))),
            [task] => {
                self.store.delete_task(self.user_id, task.id).await?;
                Ok(CommandOutcome::ok(format!(
                    "Deleted task successfully: '{}'",
                    task.name
                )))
            }
            _ => Ok(ambiguous(&matches, "Multiple tasks found")),
        }
    }

    async fn set_completed(
        &self,
        identifier: &str,
        completed: bool,
    ) -> Result<CommandOutcome, StoreError> {
        // Id lookup intentionally skips the state filter below.
        if let Some(id) = numeric_id(identifier) {
            if let Some(task) = self
                .store
                .set_task_completed(self.user_id, id, completed)
                .await?
            {
                return Ok(CommandOutcome::ok(done_message(&task.name, completed)));
            }
        }

        // Only tasks in the opposite state are sensible targets here.
        let matches = self
            .store
            .find_tasks(self.user_id, identifier, Some(!completed))
            .await?;
        let state = if completed { "pending" } else { "completed" };
        match matches.as_slice() {
            [] => Ok(CommandOutcome::fail(format!(
                "No {state} task found matching '{identifier}'"
            ))),
            [task] => {
                self.store
                    .set_task_completed(self.user_id, task.id, completed)
                    .await?;
                Ok(CommandOutcome::ok(done_message(&task.name, completed)))
            }
            _ => Ok(ambiguous(
                &matches,
                &format!("Multiple {state} tasks found"),
            )),
        }
    }

    async fn list(&self, query: TaskQuery, today: NaiveDate) -> Result<CommandOutcome, StoreError> {
        let tasks = self.store.list_tasks(self.user_id, query, today).await?;
        if tasks.is_empty() {
            return Ok(CommandOutcome::ok_with(
                "No tasks found.",
                json!({ "tasks": [] }),
            ));
        }

        let mut message = String::from("Your tasks:\n");
        let mut shown: Vec<Value> = Vec::new();
        for task in tasks.iter().take(LIST_CAP) {
            let marker = if task.is_completed { "[x]" } else { "[ ]" };
            let due = task
                .due_date
                .map(|d| format!(" (due: {d})"))
                .unwrap_or_default();
            message.push_str(&format!("  {marker} '{}'{due}\n", task.name));
            shown.push(json!({
                "id": task.id,
                "name": task.name,
                "completed": task.is_completed,
                "due_date": task.due_date,
            }));
        }
        if tasks.len() > LIST_CAP {
            message.push_str(&format!(
                "  ... and {} more tasks",
                tasks.len() - LIST_CAP
            ));
        }

        Ok(CommandOutcome::ok_with(message, json!({ "tasks": shown })))
    }

    async fn clear_completed(&self) -> Result<CommandOutcome, StoreError> {
        let count = self.store.delete_completed_tasks(self.user_id).await?;
        let plural = if count == 1 { "" } else { "s" };
        Ok(CommandOutcome::ok(format!(
            "Deleted {count} completed task{plural}"
        )))
    }
}

fn done_message(name: &str, completed: bool) -> String {
    if completed {
        format!("Completed task successfully: '{name}'")
    } else {
        format!("Reopened task: '{name}'")
    }
}

fn ambiguous(matches: &[Task], headline: &str) -> CommandOutcome {
    let preview = matches
        .iter()
        .take(AMBIGUITY_PREVIEW)
        .map(|t| format!("  • ID {}: '{}'", t.id, t.name))
        .collect::<Vec<_>>()
        .join("\n");
    CommandOutcome::fail(format!(
        "{headline}. Please be more specific:\n{preview}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::records::TaskStatusFilter;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    fn user() -> Uuid {
        Uuid::now_v7()
    }

    async fn add_task(store: &MemoryStore, user: Uuid, name: &str, due: Option<&str>) {
        let commands = TaskCommands::new(store, user);
        let outcome = commands
            .execute(
                TaskIntent::Add {
                    name: name.to_string(),
                    due_date: due.map(str::to_string),
                    priority: Priority::Medium,
                    option: OptionTag::Option1,
                },
                today(),
            )
            .await
            .unwrap();
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn numeric_identifier_resolves_by_id_before_name() {
        let store = MemoryStore::new();
        let user = user();
        // Task named "1" would also match "1" as a substring; id must win.
        add_task(&store, user, "call plumber", None).await; // id 1
        add_task(&store, user, "task 1 review", None).await; // id 2

        let commands = TaskCommands::new(&store, user);
        let outcome = commands
            .execute(
                TaskIntent::Delete {
                    identifier: "1".to_string(),
                },
                today(),
            )
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.message, "Deleted task successfully: 'call plumber'");
        assert!(store.task_by_id(user, 2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn ambiguous_delete_reports_candidates_and_mutates_nothing() {
        let store = MemoryStore::new();
        let user = user();
        add_task(&store, user, "buy milk", None).await;
        add_task(&store, user, "buy milk powder", None).await;

        let commands = TaskCommands::new(&store, user);
        let outcome = commands
            .execute(
                TaskIntent::Delete {
                    identifier: "milk".to_string(),
                },
                today(),
            )
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.message.contains("Multiple tasks found"));
        assert!(outcome.message.contains("ID 1: 'buy milk'"));
        assert!(outcome.message.contains("ID 2: 'buy milk powder'"));
        assert_eq!(store.find_tasks(user, "milk", None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_with_no_match_fails_with_message() {
        let store = MemoryStore::new();
        let user = user();
        let commands = TaskCommands::new(&store, user);
        let outcome = commands
            .execute(
                TaskIntent::Delete {
                    identifier: "ghost".to_string(),
                },
                today(),
            )
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "No task found matching 'ghost'");
    }

    #[tokio::test]
    async fn complete_only_searches_pending_tasks_by_name() {
        let store = MemoryStore::new();
        let user = user();
        add_task(&store, user, "write report", None).await;
        store.set_task_completed(user, 1, true).await.unwrap();

        let commands = TaskCommands::new(&store, user);
        let outcome = commands
            .execute(
                TaskIntent::Complete {
                    identifier: "report".to_string(),
                },
                today(),
            )
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "No pending task found matching 'report'");

        // Uncomplete searches the completed side and finds it.
        let outcome = commands
            .execute(
                TaskIntent::Uncomplete {
                    identifier: "report".to_string(),
                },
                today(),
            )
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message, "Reopened task: 'write report'");
    }

    #[tokio::test]
    async fn complete_by_id_ignores_state_filter() {
        let store = MemoryStore::new();
        let user = user();
        add_task(&store, user, "water plants", None).await;
        store.set_task_completed(user, 1, true).await.unwrap();

        let commands = TaskCommands::new(&store, user);
        let outcome = commands
            .execute(
                TaskIntent::Complete {
                    identifier: "1".to_string(),
                },
                today(),
            )
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(
            outcome.message,
            "Completed task successfully: 'water plants'"
        );
    }

    #[tokio::test]
    async fn list_caps_at_ten_and_reports_remainder() {
        let store = MemoryStore::new();
        let user = user();
        for i in 0..12 {
            add_task(&store, user, &format!("task number {i}"), None).await;
        }

        let commands = TaskCommands::new(&store, user);
        let outcome = commands
            .execute(
                TaskIntent::List {
                    query: TaskQuery::default(),
                },
                today(),
            )
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.message.contains("... and 2 more tasks"));
        assert_eq!(outcome.payload["tasks"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn overdue_means_pending_and_strictly_before_today() {
        let store = MemoryStore::new();
        let user = user();
        add_task(&store, user, "late", Some("2024-05-14")).await;
        add_task(&store, user, "due today", Some("2024-05-15")).await;
        add_task(&store, user, "future", Some("2024-05-20")).await;
        add_task(&store, user, "late but done", Some("2024-05-01")).await;
        store.set_task_completed(user, 4, true).await.unwrap();

        let commands = TaskCommands::new(&store, user);
        let outcome = commands
            .execute(
                TaskIntent::List {
                    query: TaskQuery {
                        status: Some(TaskStatusFilter::Overdue),
                        ..Default::default()
                    },
                },
                today(),
            )
            .await
            .unwrap();

        let tasks = outcome.payload["tasks"].as_array().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0]["name"], "late");
    }

    #[tokio::test]
    async fn clear_completed_counts_and_pluralizes() {
        let store = MemoryStore::new();
        let user = user();
        add_task(&store, user, "one", None).await;
        add_task(&store, user, "two", None).await;
        add_task(&store, user, "keep", None).await;
        store.set_task_completed(user, 1, true).await.unwrap();

        let commands = TaskCommands::new(&store, user);
        let outcome = commands.execute(TaskIntent::ClearCompleted, today()).await.unwrap();
        assert_eq!(outcome.message, "Deleted 1 completed task");

        store.set_task_completed(user, 2, true).await.unwrap();
        store.set_task_completed(user, 3, true).await.unwrap();
        let outcome = commands.execute(TaskIntent::ClearCompleted, today()).await.unwrap();
        assert_eq!(outcome.message, "Deleted 2 completed tasks");
    }

    #[tokio::test]
    async fn add_parses_relative_due_date_against_injected_today() {
        let store = MemoryStore::new();
        let user = user();
        add_task(&store, user, "pay rent", Some("in 3 days")).await;

        let task = store.task_by_id(user, 1).await.unwrap().unwrap();
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 5, 18));

        // Unparseable due dates stay unset in the task domain.
        add_task(&store, user, "vague", Some("whenever")).await;
        let task = store.task_by_id(user, 2).await.unwrap().unwrap();
        assert_eq!(task.due_date, None);
    }

    #[tokio::test]
    async fn unknown_intent_returns_help_without_touching_store() {
        let store = MemoryStore::new();
        let user = user();
        let commands = TaskCommands::new(&store, user);
        let outcome = commands
            .execute(
                TaskIntent::Unknown {
                    raw: json!({"action": "dance"}),
                },
                today(),
            )
            .await
            .unwrap();
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("I didn't understand that."));
    }

    #[tokio::test]
    async fn operations_are_scoped_to_the_requesting_user() {
        let store = MemoryStore::new();
        let alice = user();
        let mallory = user();
        add_task(&store, alice, "secret plan", None).await;

        let commands = TaskCommands::new(&store, mallory);
        let outcome = commands
            .execute(
                TaskIntent::Delete {
                    identifier: "1".to_string(),
                },
                today(),
            )
            .await
            .unwrap();
        assert!(!outcome.success);
        assert!(store.task_by_id(alice, 1).await.unwrap().is_some());
    }
}
