// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure transformations from fetched records to display-ready view models.
//!
//! Nothing here performs I/O or mutates its input; every function recomputes its
//! output from scratch with exact decimal arithmetic.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{
    Account, BudgetRecord, Category, DateRange, EntryType, SpendingRecord, Transaction,
};
use crate::utils::fmt_money;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;
const NEARLY_FROM: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub income: Decimal,
    pub expense: Decimal,
    /// Always `income - expense`.
    pub balance: Decimal,
}

/// Totals saturate at the `Decimal` bounds instead of overflowing.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    for t in transactions {
        match t.r#type {
            EntryType::Income => income = income.saturating_add(t.amount),
            EntryType::Expense => expense = expense.saturating_add(t.amount),
        }
    }
    Summary {
        income,
        expense,
        balance: income.saturating_sub(expense),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySpending {
    pub name: String,
    pub value: Decimal,
}

/// Expense rows only, in the order the service sent them. Empty in, empty out.
pub fn group_expense_by_category(records: &[SpendingRecord]) -> Vec<CategorySpending> {
    records
        .iter()
        .filter(|r| r.r#type == EntryType::Expense)
        .map(|r| CategorySpending {
            name: r.name.clone(),
            value: r.total_amount,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    OnTrack,
    NearlyBudget,
    OverBudget,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnTrack => "on_track",
            Self::NearlyBudget => "nearly_budget",
            Self::OverBudget => "over_budget",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub status: BudgetStatus,
    /// `spent / budget * 100`; `None` when the budget is zero or the ratio
    /// does not fit in a `Decimal`.
    pub percent: Option<Decimal>,
}

impl Classification {
    /// Percent clamped to `[0, 100]` for a progress bar.
    pub fn display_percent(&self) -> Decimal {
        match self.percent {
            Some(p) => p.clamp(Decimal::ZERO, HUNDRED),
            None if self.status == BudgetStatus::OverBudget => HUNDRED,
            None => Decimal::ZERO,
        }
    }
}

/// `> 100` over budget, `80..=100` nearly, below 80 on track. A zero (or negative)
/// budget has no percent: anything spent is over budget, nothing spent is on track.
/// A ratio too large to represent is over budget with no percent.
pub fn classify(spent: Decimal, budget_amount: Decimal) -> Classification {
    let unbounded = || Classification {
        status: if spent > Decimal::ZERO {
            BudgetStatus::OverBudget
        } else {
            BudgetStatus::OnTrack
        },
        percent: None,
    };
    if budget_amount <= Decimal::ZERO {
        return unbounded();
    }
    let Some(percent) = spent
        .checked_div(budget_amount)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
    else {
        return unbounded();
    };
    let status = if percent > HUNDRED {
        BudgetStatus::OverBudget
    } else if percent >= NEARLY_FROM {
        BudgetStatus::NearlyBudget
    } else {
        BudgetStatus::OnTrack
    };
    Classification {
        status,
        percent: Some(percent.normalize()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    pub category_id: Option<i64>,
    pub category_name: String,
    pub budget_amount: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub status: BudgetStatus,
    pub percent: Option<Decimal>,
    pub display_percent: Decimal,
}

pub fn budget_progress(records: &[BudgetRecord]) -> Vec<BudgetProgress> {
    records
        .iter()
        .map(|r| {
            let c = classify(r.spent, r.budget_amount);
            BudgetProgress {
                category_id: r.category_id,
                category_name: r.category_name.clone(),
                budget_amount: r.budget_amount,
                spent: r.spent,
                remaining: r.budget_amount.saturating_sub(r.spent),
                status: c.status,
                percent: c.percent,
                display_percent: c.display_percent(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetWorth {
    pub value: Decimal,
    pub display: String,
}

/// The service owns the computation; this only formats it.
pub fn net_worth(value: Decimal, symbol: &str) -> NetWorth {
    NetWorth {
        value,
        display: fmt_money(&value, symbol),
    }
}

/// The first `n` rows; the service already sends newest first.
pub fn recent(transactions: &[Transaction], n: usize) -> Vec<Transaction> {
    transactions.iter().take(n).cloned().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardModel {
    pub summary: Summary,
    pub recent: Vec<Transaction>,
    pub transaction_count: usize,
}

pub fn dashboard(transactions: &[Transaction], recent_limit: usize) -> DashboardModel {
    DashboardModel {
        summary: summarize(transactions),
        recent: recent(transactions, recent_limit),
        transaction_count: transactions.len(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsModel {
    pub month: NaiveDate,
    pub net_worth: NetWorth,
    pub spending: Vec<CategorySpending>,
    pub budgets: Vec<BudgetProgress>,
}

impl AnalyticsModel {
    pub fn has_spending(&self) -> bool {
        !self.spending.is_empty()
    }

    pub fn has_budgets(&self) -> bool {
        !self.budgets.is_empty()
    }
}

pub fn analytics(
    month: NaiveDate,
    net_worth_value: Decimal,
    spending: &[SpendingRecord],
    budgets: &[BudgetRecord],
    symbol: &str,
) -> AnalyticsModel {
    AnalyticsModel {
        month,
        net_worth: net_worth(net_worth_value, symbol),
        spending: group_expense_by_category(spending),
        budgets: budget_progress(budgets),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionsModel {
    pub range: Option<DateRange>,
    pub transactions: Vec<Transaction>,
    pub summary: Summary,
    /// Choices for the entry form.
    pub categories: Vec<Category>,
    pub accounts: Vec<Account>,
}

pub fn transactions_view(
    range: Option<DateRange>,
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
    accounts: Vec<Account>,
) -> TransactionsModel {
    TransactionsModel {
        range,
        summary: summarize(&transactions),
        transactions,
        categories,
        accounts,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountsModel {
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoriesModel {
    pub income: Vec<Category>,
    pub expense: Vec<Category>,
}

pub fn categories_view(categories: Vec<Category>) -> CategoriesModel {
    let (income, expense): (Vec<_>, Vec<_>) = categories
        .into_iter()
        .partition(|c| c.r#type == EntryType::Income);
    CategoriesModel { income, expense }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_percent_clamps_but_keeps_raw() {
        let c = classify(Decimal::new(150, 0), Decimal::new(100, 0));
        assert_eq!(c.percent, Some(Decimal::new(150, 0)));
        assert_eq!(c.display_percent(), HUNDRED);
        let c = classify(Decimal::new(5, 0), Decimal::ZERO);
        assert_eq!(c.display_percent(), HUNDRED);
        let c = classify(Decimal::ZERO, Decimal::ZERO);
        assert_eq!(c.display_percent(), Decimal::ZERO);
    }

    #[test]
    fn exactly_full_is_nearly() {
        let c = classify(Decimal::new(100, 0), Decimal::new(100, 0));
        assert_eq!(c.status, BudgetStatus::NearlyBudget);
    }
}
