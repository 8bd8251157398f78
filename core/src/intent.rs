//! Normalization of raw oracle output into closed intent enumerations.
//!
//! The oracle is best-effort: it may return garbage, a bare string, or an
//! action outside the grammar. Everything that is not a recognized action
//! with usable parameters collapses into `Unknown`, which keeps the raw
//! payload around for diagnostics.

use serde_json::Value;

use crate::money::Money;
use crate::records::{
    OptionTag, Priority, SummaryPeriod, TaskQuery, TaskStatusFilter, TransactionKind,
};

/// Task-domain intent. Closed enumeration; see the task grammar in the
/// oracle prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskIntent {
    Add {
        name: String,
        due_date: Option<String>,
        priority: Priority,
        option: OptionTag,
    },
    Delete { identifier: String },
    Complete { identifier: String },
    Uncomplete { identifier: String },
    List { query: TaskQuery },
    ClearCompleted,
    Unknown { raw: Value },
}

impl TaskIntent {
    /// Action name echoed back in the response envelope.
    pub fn action(&self) -> &'static str {
        match self {
            TaskIntent::Add { .. } => "add",
            TaskIntent::Delete { .. } => "delete",
            TaskIntent::Complete { .. } => "complete",
            TaskIntent::Uncomplete { .. } => "uncomplete",
            TaskIntent::List { .. } => "list",
            TaskIntent::ClearCompleted => "clear_completed",
            TaskIntent::Unknown { .. } => "unknown",
        }
    }

    pub fn from_value(value: Value) -> Self {
        let Some(obj) = value.as_object() else {
            return TaskIntent::Unknown { raw: value };
        };

        let action = obj.get("action").and_then(Value::as_str).unwrap_or("unknown");

        match action {
            "add" => TaskIntent::Add {
                name: str_field(obj, "task_name").unwrap_or_default(),
                due_date: str_field(obj, "due_date"),
                priority: str_field(obj, "priority")
                    .and_then(|p| Priority::parse(&p))
                    .unwrap_or_default(),
                option: str_field(obj, "option")
                    .and_then(|o| OptionTag::parse(&o))
                    .unwrap_or_default(),
            },
            "delete" => TaskIntent::Delete {
                identifier: str_field(obj, "task_identifier").unwrap_or_default(),
            },
            "complete" => TaskIntent::Complete {
                identifier: str_field(obj, "task_identifier").unwrap_or_default(),
            },
            "uncomplete" => TaskIntent::Uncomplete {
                identifier: str_field(obj, "task_identifier").unwrap_or_default(),
            },
            "list" => TaskIntent::List {
                query: TaskQuery {
                    status: str_field(obj, "status").and_then(|s| TaskStatusFilter::parse(&s)),
                    priority: str_field(obj, "priority").and_then(|p| Priority::parse(&p)),
                    option: str_field(obj, "option").and_then(|o| OptionTag::parse(&o)),
                },
            },
            "clear_completed" => TaskIntent::ClearCompleted,
            _ => TaskIntent::Unknown { raw: value },
        }
    }
}

/// Budget-domain intent. Closed enumeration; see the budget grammar in the
/// oracle prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum BudgetIntent {
    AddIncome {
        amount: Money,
        source: String,
        date: Option<String>,
        note: String,
    },
    AddExpense {
        amount: Money,
        description: String,
        category: Option<String>,
        date: Option<String>,
    },
    DeleteIncome { identifier: String },
    DeleteExpense { identifier: String },
    DeleteLast { kind: Option<TransactionKind> },
    Summary { period: Option<SummaryPeriod> },
    CategorySpending { category: String },
    List {
        limit: usize,
        kind: Option<TransactionKind>,
    },
    Unknown { raw: Value },
}

impl BudgetIntent {
    pub fn action(&self) -> &'static str {
        match self {
            BudgetIntent::AddIncome { .. } => "add_income",
            BudgetIntent::AddExpense { .. } => "add_expense",
            BudgetIntent::DeleteIncome { .. } => "delete_income",
            BudgetIntent::DeleteExpense { .. } => "delete_expense",
            BudgetIntent::DeleteLast { .. } => "delete_last",
            BudgetIntent::Summary { .. } => "summary",
            BudgetIntent::CategorySpending { .. } => "category_spending",
            BudgetIntent::List { .. } => "list",
            BudgetIntent::Unknown { .. } => "unknown",
        }
    }

    pub fn from_value(value: Value) -> Self {
        let Some(obj) = value.as_object() else {
            return BudgetIntent::Unknown { raw: value };
        };

        let action = obj.get("action").and_then(Value::as_str).unwrap_or("unknown");

        match action {
            "add_income" => BudgetIntent::AddIncome {
                amount: money_field(obj, "amount"),
                source: str_field(obj, "source").unwrap_or_else(|| "Unknown".to_string()),
                date: str_field(obj, "date"),
                note: str_field(obj, "note").unwrap_or_default(),
            },
            "add_expense" => BudgetIntent::AddExpense {
                amount: money_field(obj, "amount"),
                description: str_field(obj, "description")
                    .unwrap_or_else(|| "Unknown".to_string()),
                category: str_field(obj, "category"),
                date: str_field(obj, "date"),
            },
            "delete_income" => BudgetIntent::DeleteIncome {
                identifier: str_field(obj, "identifier").unwrap_or_default(),
            },
            "delete_expense" => BudgetIntent::DeleteExpense {
                identifier: str_field(obj, "identifier").unwrap_or_default(),
            },
            "delete_last" => BudgetIntent::DeleteLast {
                kind: str_field(obj, "transaction_type").and_then(|t| TransactionKind::parse(&t)),
            },
            "summary" => BudgetIntent::Summary {
                period: str_field(obj, "period").and_then(|p| SummaryPeriod::parse(&p)),
            },
            "category_spending" => BudgetIntent::CategorySpending {
                category: str_field(obj, "category").unwrap_or_default(),
            },
            "list" => BudgetIntent::List {
                limit: count_field(obj, "limit").unwrap_or(5),
                kind: str_field(obj, "transaction_type").and_then(|t| TransactionKind::parse(&t)),
            },
            _ => BudgetIntent::Unknown { raw: value },
        }
    }
}

/// Read a field as text. Numbers are coerced ("delete income 5" often comes
/// back as a JSON number); empty strings count as absent.
fn str_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn money_field(obj: &serde_json::Map<String, Value>, key: &str) -> Money {
    obj.get(key)
        .and_then(Money::from_value)
        .unwrap_or(Money::ZERO)
}

fn count_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<usize> {
    match obj.get(key)? {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unrecognized_actions_collapse_to_unknown() {
        for raw in [
            json!({"action": "explode"}),
            json!({"action": 42}),
            json!({"no_action": "add"}),
            json!("just a string"),
            json!(null),
            json!([1, 2, 3]),
        ] {
            let task = TaskIntent::from_value(raw.clone());
            assert_eq!(task.action(), "unknown", "task intent for {raw}");
            let budget = BudgetIntent::from_value(raw.clone());
            assert_eq!(budget.action(), "unknown", "budget intent for {raw}");
        }
    }

    #[test]
    fn unknown_keeps_raw_payload_for_diagnostics() {
        let raw = json!({"action": "launch_rocket", "thrust": 9000});
        match TaskIntent::from_value(raw.clone()) {
            TaskIntent::Unknown { raw: kept } => assert_eq!(kept, raw),
            other => panic!("expected unknown, got {other:?}"),
        }
    }

    #[test]
    fn add_task_defaults_priority_and_option() {
        let intent = TaskIntent::from_value(json!({
            "action": "add",
            "task_name": "finish report",
            "due_date": "tomorrow",
            "priority": "urgent-ish"
        }));
        assert_eq!(
            intent,
            TaskIntent::Add {
                name: "finish report".to_string(),
                due_date: Some("tomorrow".to_string()),
                priority: Priority::Medium,
                option: OptionTag::Option1,
            }
        );
    }

    #[test]
    fn numeric_identifiers_are_coerced_to_text() {
        let intent = TaskIntent::from_value(json!({"action": "complete", "task_identifier": 5}));
        assert_eq!(
            intent,
            TaskIntent::Complete {
                identifier: "5".to_string()
            }
        );

        let intent = BudgetIntent::from_value(json!({"action": "delete_income", "identifier": 12}));
        assert_eq!(
            intent,
            BudgetIntent::DeleteIncome {
                identifier: "12".to_string()
            }
        );
    }

    #[test]
    fn budget_defaults_match_dispatch_contract() {
        let intent = BudgetIntent::from_value(json!({"action": "add_income"}));
        assert_eq!(
            intent,
            BudgetIntent::AddIncome {
                amount: Money::ZERO,
                source: "Unknown".to_string(),
                date: None,
                note: String::new(),
            }
        );

        let intent = BudgetIntent::from_value(json!({"action": "list", "limit": "10"}));
        assert_eq!(
            intent,
            BudgetIntent::List {
                limit: 10,
                kind: None
            }
        );

        let intent = BudgetIntent::from_value(json!({"action": "list"}));
        assert_eq!(
            intent,
            BudgetIntent::List {
                limit: 5,
                kind: None
            }
        );
    }

    #[test]
    fn summary_period_outside_grammar_means_all_time() {
        let intent = BudgetIntent::from_value(json!({"action": "summary", "period": "decade"}));
        assert_eq!(intent, BudgetIntent::Summary { period: None });
    }
}
