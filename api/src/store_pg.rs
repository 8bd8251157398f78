//! Postgres backend for the record-store traits. Queries follow the
//! `query_as::<_, Row>` + `FromRow` style used across the service; name
//! matching is ILIKE on an escaped substring pattern.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use daybook_core::money::Money;
use daybook_core::records::{
    Category, CategoryRef, Expense, Income, NewExpense, NewIncome, NewTask, Task, TaskQuery,
    TaskStatusFilter,
};
use daybook_core::store::{BudgetStore, StoreError, TaskStore};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// `%substring%` pattern with LIKE metacharacters escaped; used with
/// `ILIKE … ESCAPE '\'`.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    user_id: Uuid,
    name: String,
    is_completed: bool,
    due_date: Option<NaiveDate>,
    priority: String,
    option_tag: String,
    created_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_task(self) -> Task {
        Task {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            is_completed: self.is_completed,
            due_date: self.due_date,
            priority: daybook_core::records::Priority::parse(&self.priority).unwrap_or_default(),
            option: daybook_core::records::OptionTag::parse(&self.option_tag).unwrap_or_default(),
            created_at: self.created_at,
        }
    }
}

const TASK_COLUMNS: &str =
    "id, user_id, name, is_completed, due_date, priority, option_tag, created_at";

#[derive(sqlx::FromRow)]
struct IncomeRow {
    id: i64,
    user_id: Uuid,
    amount_cents: i64,
    source: String,
    date: NaiveDate,
    note: String,
}

impl IncomeRow {
    fn into_income(self) -> Income {
        Income {
            id: self.id,
            user_id: self.user_id,
            amount: Money::from_cents(self.amount_cents),
            source: self.source,
            date: self.date,
            note: self.note,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ExpenseRow {
    id: i64,
    user_id: Uuid,
    amount_cents: i64,
    description: String,
    date: NaiveDate,
    category_id: Option<i64>,
    category_name: Option<String>,
}

impl ExpenseRow {
    fn into_expense(self) -> Expense {
        let category = match (self.category_id, self.category_name) {
            (Some(id), Some(name)) => Some(CategoryRef { id, name }),
            _ => None,
        };
        Expense {
            id: self.id,
            user_id: self.user_id,
            amount: Money::from_cents(self.amount_cents),
            description: self.description,
            date: self.date,
            category,
        }
    }
}

const EXPENSE_SELECT: &str = "SELECT e.id, e.user_id, e.amount_cents, e.description, e.date, \
     c.id AS category_id, c.name AS category_name \
     FROM expenses e LEFT JOIN categories c ON c.id = e.category_id";

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    user_id: Uuid,
    name: String,
}

impl CategoryRow {
    fn into_category(self) -> Category {
        Category {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
        }
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, user_id: Uuid, task: NewTask) -> Result<Task, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "INSERT INTO tasks (user_id, name, is_completed, due_date, priority, option_tag) \
             VALUES ($1, $2, FALSE, $3, $4, $5) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&task.name)
        .bind(task.due_date)
        .bind(task.priority.as_str())
        .bind(task.option.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.into_task())
    }

    async fn task_by_id(&self, user_id: Uuid, id: i64) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 AND id = $2"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(TaskRow::into_task))
    }

    async fn find_tasks(
        &self,
        user_id: Uuid,
        name_contains: &str,
        completed: Option<bool>,
    ) -> Result<Vec<Task>, StoreError> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = "));
        builder.push_bind(user_id);
        builder.push(" AND name ILIKE ");
        builder.push_bind(like_pattern(name_contains));
        builder.push(" ESCAPE '\\'");
        if let Some(completed) = completed {
            builder.push(" AND is_completed = ");
            builder.push_bind(completed);
        }
        builder.push(" ORDER BY id");

        let rows: Vec<TaskRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        Ok(rows.into_iter().map(TaskRow::into_task).collect())
    }

    async fn list_tasks(
        &self,
        user_id: Uuid,
        query: TaskQuery,
        today: NaiveDate,
    ) -> Result<Vec<Task>, StoreError> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = "));
        builder.push_bind(user_id);
        match query.status {
            None => {}
            Some(TaskStatusFilter::Pending) => {
                builder.push(" AND is_completed = FALSE");
            }
            Some(TaskStatusFilter::Completed) => {
                builder.push(" AND is_completed = TRUE");
            }
            Some(TaskStatusFilter::Overdue) => {
                builder.push(" AND is_completed = FALSE AND due_date < ");
                builder.push_bind(today);
            }
        }
        if let Some(priority) = query.priority {
            builder.push(" AND priority = ");
            builder.push_bind(priority.as_str());
        }
        if let Some(option) = query.option {
            builder.push(" AND option_tag = ");
            builder.push_bind(option.as_str());
        }
        builder.push(" ORDER BY id");

        let rows: Vec<TaskRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        Ok(rows.into_iter().map(TaskRow::into_task).collect())
    }

    async fn set_task_completed(
        &self,
        user_id: Uuid,
        id: i64,
        completed: bool,
    ) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "UPDATE tasks SET is_completed = $3 WHERE user_id = $1 AND id = $2 \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(user_id)
        .bind(id)
        .bind(completed)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(TaskRow::into_task))
    }

    async fn delete_task(&self, user_id: Uuid, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_completed_tasks(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE user_id = $1 AND is_completed = TRUE")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected())
    }

    async fn recent_tasks(&self, user_id: Uuid, limit: i64) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(TaskRow::into_task).collect())
    }
}

#[async_trait]
impl BudgetStore for PgStore {
    async fn create_income(&self, user_id: Uuid, income: NewIncome) -> Result<Income, StoreError> {
        let row = sqlx::query_as::<_, IncomeRow>(
            "INSERT INTO incomes (user_id, amount_cents, source, date, note) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, user_id, amount_cents, source, date, note",
        )
        .bind(user_id)
        .bind(income.amount.cents())
        .bind(&income.source)
        .bind(income.date)
        .bind(&income.note)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.into_income())
    }

    async fn create_expense(
        &self,
        user_id: Uuid,
        expense: NewExpense,
    ) -> Result<Expense, StoreError> {
        let inserted: i64 = sqlx::query_scalar(
            "INSERT INTO expenses (user_id, amount_cents, description, date, category_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(user_id)
        .bind(expense.amount.cents())
        .bind(&expense.description)
        .bind(expense.date)
        .bind(expense.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        self.expense_by_id(user_id, inserted)
            .await?
            .ok_or_else(|| StoreError::Backend("inserted expense not found".to_string()))
    }

    async fn income_by_id(&self, user_id: Uuid, id: i64) -> Result<Option<Income>, StoreError> {
        let row = sqlx::query_as::<_, IncomeRow>(
            "SELECT id, user_id, amount_cents, source, date, note FROM incomes \
             WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(IncomeRow::into_income))
    }

    async fn expense_by_id(&self, user_id: Uuid, id: i64) -> Result<Option<Expense>, StoreError> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            "{EXPENSE_SELECT} WHERE e.user_id = $1 AND e.id = $2"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(ExpenseRow::into_expense))
    }

    async fn find_incomes(
        &self,
        user_id: Uuid,
        source_contains: &str,
    ) -> Result<Vec<Income>, StoreError> {
        let rows = sqlx::query_as::<_, IncomeRow>(
            "SELECT id, user_id, amount_cents, source, date, note FROM incomes \
             WHERE user_id = $1 AND source ILIKE $2 ESCAPE '\\' ORDER BY id",
        )
        .bind(user_id)
        .bind(like_pattern(source_contains))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(IncomeRow::into_income).collect())
    }

    async fn find_expenses(
        &self,
        user_id: Uuid,
        description_contains: &str,
    ) -> Result<Vec<Expense>, StoreError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            "{EXPENSE_SELECT} WHERE e.user_id = $1 AND e.description ILIKE $2 ESCAPE '\\' \
             ORDER BY e.id"
        ))
        .bind(user_id)
        .bind(like_pattern(description_contains))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(ExpenseRow::into_expense).collect())
    }

    async fn delete_income(&self, user_id: Uuid, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM incomes WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expense(&self, user_id: Uuid, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM expenses WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn latest_income(&self, user_id: Uuid) -> Result<Option<Income>, StoreError> {
        let row = sqlx::query_as::<_, IncomeRow>(
            "SELECT id, user_id, amount_cents, source, date, note FROM incomes \
             WHERE user_id = $1 ORDER BY date DESC, id DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(IncomeRow::into_income))
    }

    async fn latest_expense(&self, user_id: Uuid) -> Result<Option<Expense>, StoreError> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            "{EXPENSE_SELECT} WHERE e.user_id = $1 ORDER BY e.date DESC, e.id DESC LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(ExpenseRow::into_expense))
    }

    async fn incomes_between(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Income>, StoreError> {
        let rows = sqlx::query_as::<_, IncomeRow>(
            "SELECT id, user_id, amount_cents, source, date, note FROM incomes \
             WHERE user_id = $1 \
               AND ($2::date IS NULL OR date >= $2) \
               AND ($3::date IS NULL OR date <= $3) \
             ORDER BY id",
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(IncomeRow::into_income).collect())
    }

    async fn expenses_between(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Expense>, StoreError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            "{EXPENSE_SELECT} WHERE e.user_id = $1 \
               AND ($2::date IS NULL OR e.date >= $2) \
               AND ($3::date IS NULL OR e.date <= $3) \
             ORDER BY e.id"
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(ExpenseRow::into_expense).collect())
    }

    async fn recent_incomes(&self, user_id: Uuid, limit: i64) -> Result<Vec<Income>, StoreError> {
        let rows = sqlx::query_as::<_, IncomeRow>(
            "SELECT id, user_id, amount_cents, source, date, note FROM incomes \
             WHERE user_id = $1 ORDER BY date DESC, id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(IncomeRow::into_income).collect())
    }

    async fn recent_expenses(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Expense>, StoreError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            "{EXPENSE_SELECT} WHERE e.user_id = $1 ORDER BY e.date DESC, e.id DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(ExpenseRow::into_expense).collect())
    }

    async fn find_categories(
        &self,
        user_id: Uuid,
        name_contains: &str,
    ) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, user_id, name FROM categories \
             WHERE user_id = $1 AND name ILIKE $2 ESCAPE '\\' ORDER BY id",
        )
        .bind(user_id)
        .bind(like_pattern(name_contains))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(CategoryRow::into_category).collect())
    }

    async fn create_category(&self, user_id: Uuid, name: &str) -> Result<Category, StoreError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (user_id, name) VALUES ($1, $2) \
             RETURNING id, user_id, name",
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.into_category())
    }

    async fn expenses_in_category(
        &self,
        user_id: Uuid,
        category_id: i64,
    ) -> Result<Vec<Expense>, StoreError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            "{EXPENSE_SELECT} WHERE e.user_id = $1 AND e.category_id = $2 \
             ORDER BY e.date DESC, e.id DESC"
        ))
        .bind(user_id)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(ExpenseRow::into_expense).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("lunch"), "%lunch%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c\\d"), "%c\\\\d%");
    }
}
