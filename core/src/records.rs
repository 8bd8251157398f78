use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

/// Task priority. Unrecognized oracle values fall back to the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// One of the six fixed category tags a task can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OptionTag {
    #[default]
    Option1,
    Option2,
    Option3,
    Option4,
    Option5,
    Option6,
}

impl OptionTag {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionTag::Option1 => "option1",
            OptionTag::Option2 => "option2",
            OptionTag::Option3 => "option3",
            OptionTag::Option4 => "option4",
            OptionTag::Option5 => "option5",
            OptionTag::Option6 => "option6",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "option1" => Some(OptionTag::Option1),
            "option2" => Some(OptionTag::Option2),
            "option3" => Some(OptionTag::Option3),
            "option4" => Some(OptionTag::Option4),
            "option5" => Some(OptionTag::Option5),
            "option6" => Some(OptionTag::Option6),
            _ => None,
        }
    }
}

/// Status filter for task listing. `Overdue` is derived: pending with a due
/// date strictly before today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatusFilter {
    Pending,
    Completed,
    Overdue,
}

impl TaskStatusFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(TaskStatusFilter::Pending),
            "completed" => Some(TaskStatusFilter::Completed),
            "overdue" => Some(TaskStatusFilter::Overdue),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

/// Summary window. Absent means all time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryPeriod {
    Today,
    Week,
    Month,
    Year,
}

impl SummaryPeriod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "today" => Some(SummaryPeriod::Today),
            "week" => Some(SummaryPeriod::Week),
            "month" => Some(SummaryPeriod::Month),
            "year" => Some(SummaryPeriod::Year),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SummaryPeriod::Today => "today",
            SummaryPeriod::Week => "this week",
            SummaryPeriod::Month => "this month",
            SummaryPeriod::Year => "this year",
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct Task {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
    pub is_completed: bool,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub option: OptionTag,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Days until the due date, negative when past due. Used by the export
    /// endpoint only.
    pub fn days_left(&self, today: NaiveDate) -> Option<i64> {
        self.due_date.map(|due| (due - today).num_days())
    }
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub option: OptionTag,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct Income {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub amount: Money,
    pub source: String,
    pub date: NaiveDate,
    pub note: String,
}

#[derive(Debug, Clone)]
pub struct NewIncome {
    pub amount: Money,
    pub source: String,
    pub date: NaiveDate,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct Expense {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub amount: Money,
    pub description: String,
    pub date: NaiveDate,
    pub category: Option<CategoryRef>,
}

impl Expense {
    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Uncategorized")
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: Money,
    pub description: String,
    pub date: NaiveDate,
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
}

/// Filters for task listing. All optional; `None` means no filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: Option<TaskStatusFilter>,
    pub priority: Option<Priority>,
    pub option: Option<OptionTag>,
}
