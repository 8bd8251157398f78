//! In-memory store backend. Backs the handler test suites and local
//! development without Postgres; the production backend lives in the API
//! crate.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::records::{
    Category, CategoryRef, Expense, Income, NewExpense, NewIncome, NewTask, Task, TaskQuery,
    TaskStatusFilter,
};
use crate::store::{BudgetStore, StoreError, TaskStore};

#[derive(Default)]
struct Inner {
    tasks: Vec<Task>,
    incomes: Vec<Income>,
    expenses: Vec<Expense>,
    categories: Vec<Category>,
    next_task_id: i64,
    next_income_id: i64,
    next_expense_id: i64,
    next_category_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, user_id: Uuid, task: NewTask) -> Result<Task, StoreError> {
        let mut inner = self.lock()?;
        inner.next_task_id += 1;
        let task = Task {
            id: inner.next_task_id,
            user_id,
            name: task.name,
            is_completed: false,
            due_date: task.due_date,
            priority: task.priority,
            option: task.option,
            created_at: Utc::now(),
        };
        inner.tasks.push(task.clone());
        Ok(task)
    }

    async fn task_by_id(&self, user_id: Uuid, id: i64) -> Result<Option<Task>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .tasks
            .iter()
            .find(|t| t.user_id == user_id && t.id == id)
            .cloned())
    }

    async fn find_tasks(
        &self,
        user_id: Uuid,
        name_contains: &str,
        completed: Option<bool>,
    ) -> Result<Vec<Task>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id && contains_ci(&t.name, name_contains))
            .filter(|t| completed.is_none_or(|c| t.is_completed == c))
            .cloned()
            .collect())
    }

    async fn list_tasks(
        &self,
        user_id: Uuid,
        query: TaskQuery,
        today: NaiveDate,
    ) -> Result<Vec<Task>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter(|t| match query.status {
                None => true,
                Some(TaskStatusFilter::Pending) => !t.is_completed,
                Some(TaskStatusFilter::Completed) => t.is_completed,
                Some(TaskStatusFilter::Overdue) => {
                    !t.is_completed && t.due_date.is_some_and(|due| due < today)
                }
            })
            .filter(|t| query.priority.is_none_or(|p| t.priority == p))
            .filter(|t| query.option.is_none_or(|o| t.option == o))
            .cloned()
            .collect())
    }

    async fn set_task_completed(
        &self,
        user_id: Uuid,
        id: i64,
        completed: bool,
    ) -> Result<Option<Task>, StoreError> {
        let mut inner = self.lock()?;
        let task = inner
            .tasks
            .iter_mut()
            .find(|t| t.user_id == user_id && t.id == id);
        Ok(task.map(|t| {
            t.is_completed = completed;
            t.clone()
        }))
    }

    async fn delete_task(&self, user_id: Uuid, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        let before = inner.tasks.len();
        inner.tasks.retain(|t| !(t.user_id == user_id && t.id == id));
        Ok(inner.tasks.len() < before)
    }

    async fn delete_completed_tasks(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut inner = self.lock()?;
        let before = inner.tasks.len();
        inner
            .tasks
            .retain(|t| !(t.user_id == user_id && t.is_completed));
        Ok((before - inner.tasks.len()) as u64)
    }

    async fn recent_tasks(&self, user_id: Uuid, limit: i64) -> Result<Vec<Task>, StoreError> {
        let inner = self.lock()?;
        let mut tasks: Vec<Task> = inner
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        tasks.truncate(limit.max(0) as usize);
        Ok(tasks)
    }
}

#[async_trait]
impl BudgetStore for MemoryStore {
    async fn create_income(&self, user_id: Uuid, income: NewIncome) -> Result<Income, StoreError> {
        let mut inner = self.lock()?;
        inner.next_income_id += 1;
        let income = Income {
            id: inner.next_income_id,
            user_id,
            amount: income.amount,
            source: income.source,
            date: income.date,
            note: income.note,
        };
        inner.incomes.push(income.clone());
        Ok(income)
    }

    async fn create_expense(
        &self,
        user_id: Uuid,
        expense: NewExpense,
    ) -> Result<Expense, StoreError> {
        let mut inner = self.lock()?;
        let category = expense.category_id.and_then(|id| {
            inner
                .categories
                .iter()
                .find(|c| c.user_id == user_id && c.id == id)
                .map(|c| CategoryRef {
                    id: c.id,
                    name: c.name.clone(),
                })
        });
        inner.next_expense_id += 1;
        let expense = Expense {
            id: inner.next_expense_id,
            user_id,
            amount: expense.amount,
            description: expense.description,
            date: expense.date,
            category,
        };
        inner.expenses.push(expense.clone());
        Ok(expense)
    }

    async fn income_by_id(&self, user_id: Uuid, id: i64) -> Result<Option<Income>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .incomes
            .iter()
            .find(|i| i.user_id == user_id && i.id == id)
            .cloned())
    }

    async fn expense_by_id(&self, user_id: Uuid, id: i64) -> Result<Option<Expense>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .expenses
            .iter()
            .find(|e| e.user_id == user_id && e.id == id)
            .cloned())
    }

    async fn find_incomes(
        &self,
        user_id: Uuid,
        source_contains: &str,
    ) -> Result<Vec<Income>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .incomes
            .iter()
            .filter(|i| i.user_id == user_id && contains_ci(&i.source, source_contains))
            .cloned()
            .collect())
    }

    async fn find_expenses(
        &self,
        user_id: Uuid,
        description_contains: &str,
    ) -> Result<Vec<Expense>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id && contains_ci(&e.description, description_contains))
            .cloned()
            .collect())
    }

    async fn delete_income(&self, user_id: Uuid, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        let before = inner.incomes.len();
        inner
            .incomes
            .retain(|i| !(i.user_id == user_id && i.id == id));
        Ok(inner.incomes.len() < before)
    }

    async fn delete_expense(&self, user_id: Uuid, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        let before = inner.expenses.len();
        inner
            .expenses
            .retain(|e| !(e.user_id == user_id && e.id == id));
        Ok(inner.expenses.len() < before)
    }

    async fn latest_income(&self, user_id: Uuid) -> Result<Option<Income>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .incomes
            .iter()
            .filter(|i| i.user_id == user_id)
            .max_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn latest_expense(&self, user_id: Uuid) -> Result<Option<Expense>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id)
            .max_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn incomes_between(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Income>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .incomes
            .iter()
            .filter(|i| i.user_id == user_id)
            .filter(|i| from.is_none_or(|f| i.date >= f) && to.is_none_or(|t| i.date <= t))
            .cloned()
            .collect())
    }

    async fn expenses_between(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Expense>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter(|e| from.is_none_or(|f| e.date >= f) && to.is_none_or(|t| e.date <= t))
            .cloned()
            .collect())
    }

    async fn recent_incomes(&self, user_id: Uuid, limit: i64) -> Result<Vec<Income>, StoreError> {
        let inner = self.lock()?;
        let mut incomes: Vec<Income> = inner
            .incomes
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        incomes.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        incomes.truncate(limit.max(0) as usize);
        Ok(incomes)
    }

    async fn recent_expenses(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Expense>, StoreError> {
        let inner = self.lock()?;
        let mut expenses: Vec<Expense> = inner
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        expenses.truncate(limit.max(0) as usize);
        Ok(expenses)
    }

    async fn find_categories(
        &self,
        user_id: Uuid,
        name_contains: &str,
    ) -> Result<Vec<Category>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .categories
            .iter()
            .filter(|c| c.user_id == user_id && contains_ci(&c.name, name_contains))
            .cloned()
            .collect())
    }

    async fn create_category(&self, user_id: Uuid, name: &str) -> Result<Category, StoreError> {
        let mut inner = self.lock()?;
        inner.next_category_id += 1;
        let category = Category {
            id: inner.next_category_id,
            user_id,
            name: name.to_string(),
        };
        inner.categories.push(category.clone());
        Ok(category)
    }

    async fn expenses_in_category(
        &self,
        user_id: Uuid,
        category_id: i64,
    ) -> Result<Vec<Expense>, StoreError> {
        let inner = self.lock()?;
        let mut expenses: Vec<Expense> = inner
            .expenses
            .iter()
            .filter(|e| {
                e.user_id == user_id && e.category.as_ref().is_some_and(|c| c.id == category_id)
            })
            .cloned()
            .collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(expenses)
    }
}
