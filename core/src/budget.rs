//! Budget-domain command handler.
//!
//! Mirrors the task handler's resolution rules for destructive operations
//! (id first, then case-insensitive substring, refuse on ambiguity). The
//! append path is deliberately laxer: adding an expense never fails on
//! category ambiguity, it takes the first match or creates the category on
//! demand.

use chrono::{Datelike, Duration, NaiveDate};
use serde_json::json;
use uuid::Uuid;

use crate::dates::{self, DateFallback};
use crate::intent::BudgetIntent;
use crate::money::Money;
use crate::outcome::CommandOutcome;
use crate::records::{Expense, Income, NewExpense, NewIncome, SummaryPeriod, TransactionKind};
use crate::store::{BudgetStore, StoreError};
use crate::tasks::numeric_id;

/// How many candidates an ambiguity report enumerates.
const AMBIGUITY_PREVIEW: usize = 5;
/// How many recent transactions a category report shows.
const CATEGORY_RECENT: usize = 3;
/// How many categories the summary ranks.
const TOP_CATEGORIES: usize = 3;

const UNKNOWN_HELP: &str = "I didn't understand that. Try commands like:\n\
                            • 'add income 3000 salary'\n\
                            • 'add expense 25.50 for lunch food'\n\
                            • 'show my budget summary'\n\
                            • 'how much did I spend on food'\n\
                            • 'delete expense 5'\n\
                            • 'delete last expense'\n\
                            • 'show my expenses'";

pub struct BudgetCommands<'a, S: BudgetStore + ?Sized> {
    store: &'a S,
    user_id: Uuid,
}

impl<'a, S: BudgetStore + ?Sized> BudgetCommands<'a, S> {
    pub fn new(store: &'a S, user_id: Uuid) -> Self {
        Self { store, user_id }
    }

    /// Dispatch one resolved intent. `today` anchors date parsing and the
    /// summary windows so callers control the clock.
    pub async fn execute(
        &self,
        intent: BudgetIntent,
        today: NaiveDate,
    ) -> Result<CommandOutcome, StoreError> {
        match intent {
            BudgetIntent::AddIncome {
                amount,
                source,
                date,
                note,
            } => {
                // A transaction always needs a date; failed parses land on today.
                let date = dates::parse(date.as_deref(), today, DateFallback::Today)
                    .unwrap_or(today);
                self.add_income(amount, source, date, note).await
            }
            BudgetIntent::AddExpense {
                amount,
                description,
                category,
                date,
            } => {
                let date = dates::parse(date.as_deref(), today, DateFallback::Today)
                    .unwrap_or(today);
                self.add_expense(amount, description, category, date).await
            }
            BudgetIntent::DeleteIncome { identifier } => self.delete_income(&identifier).await,
            BudgetIntent::DeleteExpense { identifier } => self.delete_expense(&identifier).await,
            BudgetIntent::DeleteLast { kind } => self.delete_last(kind).await,
            BudgetIntent::Summary { period } => self.summary(period, today).await,
            BudgetIntent::CategorySpending { category } => {
                self.category_spending(&category).await
            }
            BudgetIntent::List { limit, kind } => self.list(limit, kind).await,
            BudgetIntent::Unknown { raw } => {
                tracing::debug!(payload = %raw, "unrecognized budget command");
                Ok(CommandOutcome::fail(UNKNOWN_HELP))
            }
        }
    }

    async fn add_income(
        &self,
        amount: Money,
        source: String,
        date: NaiveDate,
        note: String,
    ) -> Result<CommandOutcome, StoreError> {
        let income = self
            .store
            .create_income(
                self.user_id,
                NewIncome {
                    amount,
                    source,
                    date,
                    note,
                },
            )
            .await?;
        Ok(CommandOutcome::ok_with(
            format!(
                "Added income successfully: {} - {}Ks",
                income.source, income.amount
            ),
            json!({ "income": income }),
        ))
    }

    async fn add_expense(
        &self,
        amount: Money,
        description: String,
        category_name: Option<String>,
        date: NaiveDate,
    ) -> Result<CommandOutcome, StoreError> {
        let category = match category_name {
            Some(name) => Some(self.resolve_category(&name).await?),
            None => None,
        };

        let expense = self
            .store
            .create_expense(
                self.user_id,
                NewExpense {
                    amount,
                    description,
                    date,
                    category_id: category.as_ref().map(|c| c.id),
                },
            )
            .await?;

        let category_text = expense
            .category
            .as_ref()
            .map(|c| format!(" in {}", c.name))
            .unwrap_or_default();
        Ok(CommandOutcome::ok_with(
            format!(
                "Added expense successfully: {}{} - {}Ks",
                expense.description, category_text, expense.amount
            ),
            json!({ "expense": expense }),
        ))
    }

    /// Substring lookup with create-on-demand. Ambiguity deterministically
    /// takes the first match; the add flow never fails on it.
    async fn resolve_category(
        &self,
        name: &str,
    ) -> Result<crate::records::Category, StoreError> {
        let mut matches = self.store.find_categories(self.user_id, name).await?;
        if matches.is_empty() {
            self.store
                .create_category(self.user_id, &capitalize(name))
                .await
        } else {
            Ok(matches.swap_remove(0))
        }
    }

    async fn delete_income(&self, identifier: &str) -> Result<CommandOutcome, StoreError> {
        if let Some(id) = numeric_id(identifier) {
            if let Some(income) = self.store.income_by_id(self.user_id, id).await? {
                self.store.delete_income(self.user_id, id).await?;
                return Ok(CommandOutcome::ok(format!(
                    "Deleted income successfully: '{}'",
                    income.source
                )));
            }
        }

        let matches = self.store.find_incomes(self.user_id, identifier).await?;
        match matches.as_slice() {
            [] => Ok(CommandOutcome::fail(format!(
                "No income found matching '{identifier}'"
            ))),
            [income] => {
                self.store.delete_income(self.user_id, income.id).await?;
                Ok(CommandOutcome::ok(format!(
                    "Deleted income successfully: '{}'",
                    income.source
                )))
            }
            _ => {
                let preview = matches
                    .iter()
                    .take(AMBIGUITY_PREVIEW)
                    .map(|i| {
                        format!("  • ID {}: '{}' - {}Ks ({})", i.id, i.source, i.amount, i.date)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(CommandOutcome::fail(format!(
                    "Multiple incomes found. Please use ID:\n{preview}"
                )))
            }
        }
    }

    async fn delete_expense(&self, identifier: &str) -> Result<CommandOutcome, StoreError> {
        if let Some(id) = numeric_id(identifier) {
            if let Some(expense) = self.store.expense_by_id(self.user_id, id).await? {
                self.store.delete_expense(self.user_id, id).await?;
                return Ok(CommandOutcome::ok(format!(
                    "Deleted expense successfully: '{}'",
                    expense.description
                )));
            }
        }

        let matches = self.store.find_expenses(self.user_id, identifier).await?;
        match matches.as_slice() {
            [] => Ok(CommandOutcome::fail(format!(
                "No expense found matching '{identifier}'"
            ))),
            [expense] => {
                self.store.delete_expense(self.user_id, expense.id).await?;
                Ok(CommandOutcome::ok(format!(
                    "Deleted expense successfully: '{}'",
                    expense.description
                )))
            }
            _ => {
                let preview = matches
                    .iter()
                    .take(AMBIGUITY_PREVIEW)
                    .map(|e| {
                        format!(
                            "  • ID {}: '{}' - {}Ks ({})",
                            e.id, e.description, e.amount, e.date
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(CommandOutcome::fail(format!(
                    "Multiple expenses found. Please use ID:\n{preview}"
                )))
            }
        }
    }

    async fn delete_last(
        &self,
        kind: Option<TransactionKind>,
    ) -> Result<CommandOutcome, StoreError> {
        match kind {
            Some(TransactionKind::Income) => match self.store.latest_income(self.user_id).await? {
                Some(income) => self.remove_income(income).await,
                None => Ok(CommandOutcome::fail("No income transactions found")),
            },
            Some(TransactionKind::Expense) => {
                match self.store.latest_expense(self.user_id).await? {
                    Some(expense) => self.remove_expense(expense).await,
                    None => Ok(CommandOutcome::fail("No expense transactions found")),
                }
            }
            None => {
                let income = self.store.latest_income(self.user_id).await?;
                let expense = self.store.latest_expense(self.user_id).await?;
                match (income, expense) {
                    // Same-day tie goes to the expense.
                    (Some(income), Some(expense)) if expense.date >= income.date => {
                        self.remove_expense(expense).await
                    }
                    (Some(income), _) => self.remove_income(income).await,
                    (None, Some(expense)) => self.remove_expense(expense).await,
                    (None, None) => Ok(CommandOutcome::fail("No transactions found")),
                }
            }
        }
    }

    async fn remove_income(&self, income: Income) -> Result<CommandOutcome, StoreError> {
        self.store.delete_income(self.user_id, income.id).await?;
        Ok(CommandOutcome::ok(format!(
            "Deleted last income successfully: '{}' - {}Ks",
            income.source, income.amount
        )))
    }

    async fn remove_expense(&self, expense: Expense) -> Result<CommandOutcome, StoreError> {
        self.store.delete_expense(self.user_id, expense.id).await?;
        Ok(CommandOutcome::ok(format!(
            "Deleted last expense successfully: '{}' - {}Ks",
            expense.description, expense.amount
        )))
    }

    async fn summary(
        &self,
        period: Option<SummaryPeriod>,
        today: NaiveDate,
    ) -> Result<CommandOutcome, StoreError> {
        let (from, to) = period_window(period, today);
        let label = period.map(SummaryPeriod::label).unwrap_or("all time");

        let incomes = self.store.incomes_between(self.user_id, from, to).await?;
        let expenses = self.store.expenses_between(self.user_id, from, to).await?;

        let total_income = incomes.iter().fold(Money::ZERO, |acc, i| acc + i.amount);
        let total_expense = expenses.iter().fold(Money::ZERO, |acc, e| acc + e.amount);
        let balance = total_income - total_expense;

        // Totals per category, insertion-ordered so equal amounts keep the
        // order expenses were first seen in.
        let mut by_category: Vec<(String, Money)> = Vec::new();
        for expense in &expenses {
            let name = expense.category_name();
            match by_category.iter_mut().find(|(n, _)| n == name) {
                Some((_, total)) => *total += expense.amount,
                None => by_category.push((name.to_string(), expense.amount)),
            }
        }
        by_category.sort_by(|a, b| b.1.cmp(&a.1)); // stable sort keeps tie order
        by_category.truncate(TOP_CATEGORIES);

        let mut message = format!(
            "Budget Summary {label}:\n\
             Total Income: {total_income}Ks\n\
             Total Expense: {total_expense}Ks\n\
             Total Balance: {balance}Ks\n"
        );

        if !by_category.is_empty() {
            let top = by_category
                .iter()
                .map(|(name, amount)| format!("  • {name}: {amount}Ks"))
                .collect::<Vec<_>>()
                .join("\n");
            message.push_str(&format!("\nTop Categories:\n{top}"));
        }

        if total_income > Money::ZERO {
            let rate = balance.cents() as f64 / total_income.cents() as f64 * 100.0;
            message.push_str(&format!("\n\nSavings Rate: {rate:.1}%"));
        }

        Ok(CommandOutcome::ok_with(
            message,
            json!({
                "total_income": total_income.to_f64(),
                "total_expense": total_expense.to_f64(),
                "balance": balance.to_f64(),
            }),
        ))
    }

    async fn category_spending(&self, name: &str) -> Result<CommandOutcome, StoreError> {
        let matches = self.store.find_categories(self.user_id, name).await?;
        // Ambiguity takes the first match, as the add flow does.
        let Some(category) = matches.into_iter().next() else {
            return Ok(CommandOutcome::fail(format!(
                "Category '{name}' not found"
            )));
        };

        let expenses = self
            .store
            .expenses_in_category(self.user_id, category.id)
            .await?;
        let total = expenses.iter().fold(Money::ZERO, |acc, e| acc + e.amount);
        let count = expenses.len();

        let mut message = format!(
            "Spending in '{}':\n  Total: {total}Ks\n  Transactions: {count}\n",
            category.name
        );
        if !expenses.is_empty() {
            let recent = expenses
                .iter()
                .take(CATEGORY_RECENT)
                .map(|e| format!("  • {}: {} - {}Ks", e.date, e.description, e.amount))
                .collect::<Vec<_>>()
                .join("\n");
            message.push_str(&format!("\nRecent:\n{recent}"));
        }

        Ok(CommandOutcome::ok_with(
            message,
            json!({
                "category": category.name,
                "total": total.to_f64(),
                "count": count,
            }),
        ))
    }

    async fn list(
        &self,
        limit: usize,
        kind: Option<TransactionKind>,
    ) -> Result<CommandOutcome, StoreError> {
        let mut message = String::from("Recent Transactions:\n\n");
        let mut has_transactions = false;

        if kind.is_none() || kind == Some(TransactionKind::Income) {
            let incomes = self
                .store
                .recent_incomes(self.user_id, limit as i64)
                .await?;
            if !incomes.is_empty() {
                has_transactions = true;
                message.push_str("Income:\n");
                for income in &incomes {
                    message.push_str(&format!(
                        "  • {}: {} - {}Ks (ID: {})\n",
                        income.date, income.source, income.amount, income.id
                    ));
                }
                message.push('\n');
            }
        }

        if kind.is_none() || kind == Some(TransactionKind::Expense) {
            let expenses = self
                .store
                .recent_expenses(self.user_id, limit as i64)
                .await?;
            if !expenses.is_empty() {
                has_transactions = true;
                message.push_str("Expense:\n");
                for expense in &expenses {
                    message.push_str(&format!(
                        "  • {}: [{}] {} - {}Ks (ID: {})\n",
                        expense.date,
                        expense.category_name(),
                        expense.description,
                        expense.amount,
                        expense.id
                    ));
                }
            }
        }

        if !has_transactions {
            let empty = match kind {
                Some(TransactionKind::Income) => "No income transactions found",
                Some(TransactionKind::Expense) => "No expense transactions found",
                None => "No transactions found",
            };
            return Ok(CommandOutcome::ok(empty));
        }

        Ok(CommandOutcome::ok(message))
    }
}

/// Inclusive date window for a summary period; `None` bounds are open.
fn period_window(
    period: Option<SummaryPeriod>,
    today: NaiveDate,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match period {
        None => (None, None),
        Some(SummaryPeriod::Today) => (Some(today), Some(today)),
        Some(SummaryPeriod::Week) => {
            let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
            (Some(monday), None)
        }
        Some(SummaryPeriod::Month) => {
            let first = today.with_day(1).unwrap_or(today);
            let last = last_day_of_month(today);
            (Some(first), Some(last))
        }
        Some(SummaryPeriod::Year) => (
            NaiveDate::from_ymd_opt(today.year(), 1, 1),
            NaiveDate::from_ymd_opt(today.year(), 12, 31),
        ),
    }
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first_of_next| first_of_next - Duration::days(1))
        .unwrap_or(date)
}

/// First letter uppercased, the rest lowercased (new category names).
fn capitalize(s: &str) -> String {
    let mut chars = s.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    fn user() -> Uuid {
        Uuid::now_v7()
    }

    async fn run(
        store: &MemoryStore,
        user: Uuid,
        intent: BudgetIntent,
    ) -> CommandOutcome {
        BudgetCommands::new(store, user)
            .execute(intent, today())
            .await
            .unwrap()
    }

    fn add_expense(
        amount: &str,
        description: &str,
        category: Option<&str>,
        date: Option<&str>,
    ) -> BudgetIntent {
        BudgetIntent::AddExpense {
            amount: Money::parse_str(amount).unwrap(),
            description: description.to_string(),
            category: category.map(str::to_string),
            date: date.map(str::to_string),
        }
    }

    fn add_income(amount: &str, source: &str, date: Option<&str>) -> BudgetIntent {
        BudgetIntent::AddIncome {
            amount: Money::parse_str(amount).unwrap(),
            source: source.to_string(),
            date: date.map(str::to_string),
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn ambiguous_expense_delete_lists_candidates_and_deletes_nothing() {
        let store = MemoryStore::new();
        let user = user();
        run(
            &store,
            user,
            add_expense("12.50", "lunch", Some("Food"), Some("2024-05-01")),
        )
        .await;
        run(
            &store,
            user,
            add_expense("9.00", "lunch combo", Some("Food"), Some("2024-05-03")),
        )
        .await;

        let outcome = run(
            &store,
            user,
            BudgetIntent::DeleteExpense {
                identifier: "lunch".to_string(),
            },
        )
        .await;

        assert!(!outcome.success);
        assert!(outcome.message.contains("Multiple expenses found"));
        assert!(outcome.message.contains("ID 1: 'lunch' - 12.50Ks (2024-05-01)"));
        assert!(outcome
            .message
            .contains("ID 2: 'lunch combo' - 9.00Ks (2024-05-03)"));
        assert_eq!(store.find_expenses(user, "lunch").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn numeric_expense_delete_resolves_by_id() {
        let store = MemoryStore::new();
        let user = user();
        run(&store, user, add_expense("12.50", "lunch", None, None)).await;
        run(&store, user, add_expense("9.00", "lunch combo", None, None)).await;

        let outcome = run(
            &store,
            user,
            BudgetIntent::DeleteExpense {
                identifier: "2".to_string(),
            },
        )
        .await;

        assert!(outcome.success);
        assert_eq!(outcome.message, "Deleted expense successfully: 'lunch combo'");
        assert!(store.expense_by_id(user, 1).await.unwrap().is_some());
        assert!(store.expense_by_id(user, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_payloads_carry_decimal_amounts() {
        let store = MemoryStore::new();
        let user = user();

        let outcome = run(&store, user, add_income("3000", "salary", None)).await;
        assert_eq!(outcome.payload["income"]["amount"], 3000.0);

        let outcome = run(&store, user, add_expense("25.50", "lunch", None, None)).await;
        assert_eq!(outcome.payload["expense"]["amount"], 25.5);
    }

    #[tokio::test]
    async fn all_time_summary_matches_hand_computed_totals() {
        let store = MemoryStore::new();
        let user = user();
        run(&store, user, add_income("3000", "salary", None)).await;
        run(&store, user, add_expense("500", "rent", None, None)).await;

        let outcome = run(&store, user, BudgetIntent::Summary { period: None }).await;

        assert!(outcome.success);
        assert_eq!(outcome.payload["total_income"], 3000.0);
        assert_eq!(outcome.payload["total_expense"], 500.0);
        assert_eq!(outcome.payload["balance"], 2500.0);
        assert!(outcome.message.contains("Budget Summary all time:"));
        assert!(outcome.message.contains("Total Income: 3000.00Ks"));
        assert!(outcome.message.contains("Savings Rate: 83.3%"));
    }

    #[tokio::test]
    async fn month_summary_only_counts_current_calendar_month() {
        let store = MemoryStore::new();
        let user = user();
        run(&store, user, add_income("100", "inside", Some("2024-05-01"))).await;
        run(&store, user, add_income("100", "inside late", Some("2024-05-31"))).await;
        run(&store, user, add_income("100", "outside", Some("2024-04-30"))).await;
        run(&store, user, add_expense("40", "groceries", None, Some("2024-05-10"))).await;
        run(&store, user, add_expense("40", "june", None, Some("2024-06-01"))).await;

        let outcome = run(
            &store,
            user,
            BudgetIntent::Summary {
                period: Some(SummaryPeriod::Month),
            },
        )
        .await;

        assert_eq!(outcome.payload["total_income"], 200.0);
        assert_eq!(outcome.payload["total_expense"], 40.0);
        assert!(outcome.message.contains("Budget Summary this month:"));
    }

    #[tokio::test]
    async fn week_summary_is_monday_anchored() {
        let store = MemoryStore::new();
        let user = user();
        // 2024-05-15 is a Wednesday; that week started Monday 2024-05-13.
        run(&store, user, add_income("10", "monday", Some("2024-05-13"))).await;
        run(&store, user, add_income("10", "sunday before", Some("2024-05-12"))).await;

        let outcome = run(
            &store,
            user,
            BudgetIntent::Summary {
                period: Some(SummaryPeriod::Week),
            },
        )
        .await;

        assert_eq!(outcome.payload["total_income"], 10.0);
    }

    #[tokio::test]
    async fn summary_ranks_top_categories_by_amount() {
        let store = MemoryStore::new();
        let user = user();
        run(&store, user, add_expense("50", "a", Some("food"), None)).await;
        run(&store, user, add_expense("90", "b", Some("transport"), None)).await;
        run(&store, user, add_expense("30", "c", Some("food"), None)).await;
        run(&store, user, add_expense("10", "d", None, None)).await;

        let outcome = run(&store, user, BudgetIntent::Summary { period: None }).await;

        assert!(outcome.message.contains("Top Categories:"));
        let food = outcome.message.find("Food: 80.00Ks").unwrap();
        let transport = outcome.message.find("Transport: 90.00Ks").unwrap();
        assert!(transport < food);
        assert!(outcome.message.contains("Uncategorized: 10.00Ks"));
    }

    #[tokio::test]
    async fn delete_last_tie_on_date_favors_expense() {
        let store = MemoryStore::new();
        let user = user();
        run(&store, user, add_income("100", "salary", Some("2024-05-10"))).await;
        run(&store, user, add_expense("20", "coffee", None, Some("2024-05-10"))).await;

        let outcome = run(&store, user, BudgetIntent::DeleteLast { kind: None }).await;

        assert!(outcome.success);
        assert_eq!(
            outcome.message,
            "Deleted last expense successfully: 'coffee' - 20.00Ks"
        );
        assert!(store.income_by_id(user, 1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_last_picks_most_recent_within_requested_kind() {
        let store = MemoryStore::new();
        let user = user();
        run(&store, user, add_income("100", "old", Some("2024-05-01"))).await;
        run(&store, user, add_income("200", "new", Some("2024-05-09"))).await;

        let outcome = run(
            &store,
            user,
            BudgetIntent::DeleteLast {
                kind: Some(TransactionKind::Income),
            },
        )
        .await;

        assert_eq!(
            outcome.message,
            "Deleted last income successfully: 'new' - 200.00Ks"
        );
    }

    #[tokio::test]
    async fn delete_last_with_no_transactions_fails() {
        let store = MemoryStore::new();
        let outcome = run(&store, user(), BudgetIntent::DeleteLast { kind: None }).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "No transactions found");
    }

    #[tokio::test]
    async fn unknown_category_is_created_capitalized_and_then_reused() {
        let store = MemoryStore::new();
        let user = user();
        run(&store, user, add_expense("10", "snack", Some("food"), None)).await;
        let outcome = run(&store, user, add_expense("15", "dinner", Some("FOOD"), None)).await;

        assert!(outcome.message.contains("in Food"));
        assert_eq!(store.find_categories(user, "food").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn category_spending_reports_totals_and_recent() {
        let store = MemoryStore::new();
        let user = user();
        run(
            &store,
            user,
            add_expense("12.50", "lunch", Some("food"), Some("2024-05-01")),
        )
        .await;
        run(
            &store,
            user,
            add_expense("9.00", "dinner", Some("food"), Some("2024-05-03")),
        )
        .await;

        let outcome = run(
            &store,
            user,
            BudgetIntent::CategorySpending {
                category: "food".to_string(),
            },
        )
        .await;

        assert!(outcome.success);
        assert!(outcome.message.contains("Spending in 'Food':"));
        assert!(outcome.message.contains("Total: 21.50Ks"));
        assert!(outcome.message.contains("Transactions: 2"));
        assert!(outcome.message.contains("2024-05-03: dinner - 9.00Ks"));
        assert_eq!(outcome.payload["count"], 2);
    }

    #[tokio::test]
    async fn category_spending_unknown_category_fails() {
        let store = MemoryStore::new();
        let outcome = run(
            &store,
            user(),
            BudgetIntent::CategorySpending {
                category: "yachts".to_string(),
            },
        )
        .await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Category 'yachts' not found");
    }

    #[tokio::test]
    async fn list_empty_messages_depend_on_requested_kind() {
        let store = MemoryStore::new();
        let user = user();

        let outcome = run(
            &store,
            user,
            BudgetIntent::List {
                limit: 5,
                kind: Some(TransactionKind::Income),
            },
        )
        .await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "No income transactions found");

        let outcome = run(
            &store,
            user,
            BudgetIntent::List {
                limit: 5,
                kind: Some(TransactionKind::Expense),
            },
        )
        .await;
        assert_eq!(outcome.message, "No expense transactions found");

        let outcome = run(&store, user, BudgetIntent::List { limit: 5, kind: None }).await;
        assert_eq!(outcome.message, "No transactions found");
    }

    #[tokio::test]
    async fn list_shows_most_recent_first_capped_at_limit() {
        let store = MemoryStore::new();
        let user = user();
        run(&store, user, add_income("10", "first", Some("2024-05-01"))).await;
        run(&store, user, add_income("20", "second", Some("2024-05-02"))).await;
        run(&store, user, add_income("30", "third", Some("2024-05-03"))).await;

        let outcome = run(
            &store,
            user,
            BudgetIntent::List {
                limit: 2,
                kind: Some(TransactionKind::Income),
            },
        )
        .await;

        assert!(outcome.message.contains("third"));
        assert!(outcome.message.contains("second"));
        assert!(!outcome.message.contains("first"));
        let third = outcome.message.find("third").unwrap();
        let second = outcome.message.find("second").unwrap();
        assert!(third < second);
    }

    #[test]
    fn capitalize_matches_category_naming_rule() {
        assert_eq!(capitalize("food"), "Food");
        assert_eq!(capitalize("FOOD"), "Food");
        assert_eq!(capitalize("eating out"), "Eating out");
        assert_eq!(capitalize(""), "");
    }
}
