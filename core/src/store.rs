//! The record-store seam. Storage itself is an external collaborator; the
//! command handlers only ever talk to these traits. Every operation is
//! scoped to the owning user — there is no way to reach another user's
//! records through this interface.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::records::{
    Category, Expense, Income, NewExpense, NewIncome, NewTask, Task, TaskQuery,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, user_id: Uuid, task: NewTask) -> Result<Task, StoreError>;

    async fn task_by_id(&self, user_id: Uuid, id: i64) -> Result<Option<Task>, StoreError>;

    /// Case-insensitive substring match on the task name, creation order.
    /// `completed` narrows to one completion state when given.
    async fn find_tasks(
        &self,
        user_id: Uuid,
        name_contains: &str,
        completed: Option<bool>,
    ) -> Result<Vec<Task>, StoreError>;

    /// Filtered listing in creation order. `today` anchors the overdue
    /// computation.
    async fn list_tasks(
        &self,
        user_id: Uuid,
        query: TaskQuery,
        today: NaiveDate,
    ) -> Result<Vec<Task>, StoreError>;

    async fn set_task_completed(
        &self,
        user_id: Uuid,
        id: i64,
        completed: bool,
    ) -> Result<Option<Task>, StoreError>;

    async fn delete_task(&self, user_id: Uuid, id: i64) -> Result<bool, StoreError>;

    /// Deletes all completed tasks; returns how many went away.
    async fn delete_completed_tasks(&self, user_id: Uuid) -> Result<u64, StoreError>;

    /// Most recently created first. Export endpoint only.
    async fn recent_tasks(&self, user_id: Uuid, limit: i64) -> Result<Vec<Task>, StoreError>;
}

#[async_trait]
pub trait BudgetStore: Send + Sync {
    async fn create_income(&self, user_id: Uuid, income: NewIncome) -> Result<Income, StoreError>;
    async fn create_expense(&self, user_id: Uuid, expense: NewExpense)
        -> Result<Expense, StoreError>;

    async fn income_by_id(&self, user_id: Uuid, id: i64) -> Result<Option<Income>, StoreError>;
    async fn expense_by_id(&self, user_id: Uuid, id: i64) -> Result<Option<Expense>, StoreError>;

    /// Case-insensitive substring match on the source, creation order.
    async fn find_incomes(
        &self,
        user_id: Uuid,
        source_contains: &str,
    ) -> Result<Vec<Income>, StoreError>;

    /// Case-insensitive substring match on the description, creation order.
    async fn find_expenses(
        &self,
        user_id: Uuid,
        description_contains: &str,
    ) -> Result<Vec<Expense>, StoreError>;

    async fn delete_income(&self, user_id: Uuid, id: i64) -> Result<bool, StoreError>;
    async fn delete_expense(&self, user_id: Uuid, id: i64) -> Result<bool, StoreError>;

    /// Most recent by date, ties broken by highest id.
    async fn latest_income(&self, user_id: Uuid) -> Result<Option<Income>, StoreError>;
    async fn latest_expense(&self, user_id: Uuid) -> Result<Option<Expense>, StoreError>;

    /// Records with `from <= date <= to`; open bounds when `None`.
    async fn incomes_between(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Income>, StoreError>;
    async fn expenses_between(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Expense>, StoreError>;

    /// Most recent first (date desc, id desc), capped at `limit`.
    async fn recent_incomes(&self, user_id: Uuid, limit: i64) -> Result<Vec<Income>, StoreError>;
    async fn recent_expenses(&self, user_id: Uuid, limit: i64)
        -> Result<Vec<Expense>, StoreError>;

    /// Case-insensitive substring match on the category name, creation order.
    async fn find_categories(
        &self,
        user_id: Uuid,
        name_contains: &str,
    ) -> Result<Vec<Category>, StoreError>;

    async fn create_category(&self, user_id: Uuid, name: &str) -> Result<Category, StoreError>;

    /// All expenses in one category, most recent first.
    async fn expenses_in_category(
        &self,
        user_id: Uuid,
        category_id: i64,
    ) -> Result<Vec<Expense>, StoreError>;
}
