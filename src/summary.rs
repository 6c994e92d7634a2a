use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::balance::{checked_total, BalanceError};
use crate::schemas::{Category, Expense, Trip, TripId};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
    pub count: usize,
}

/// Where a trip sits on the calendar. Day counts are rounded up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum TripStatus {
    Upcoming {
        #[serde(rename = "daysToGo")]
        days_to_go: i64,
    },
    Ongoing {
        #[serde(rename = "daysLeft")]
        days_left: i64,
    },
    Completed,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub trip_id: TripId,
    pub currency: String,
    pub total_spent: Decimal,
    pub expense_count: usize,
    pub member_count: usize,
    pub by_category: Vec<CategoryTotal>,
    pub status: TripStatus,
}

pub fn trip_status(trip: &Trip, now: DateTime<Utc>) -> TripStatus {
    if now < trip.start_date {
        TripStatus::Upcoming {
            days_to_go: ceil_days(trip.start_date - now),
        }
    } else if now <= trip.end_date {
        TripStatus::Ongoing {
            days_left: ceil_days(trip.end_date - now),
        }
    } else {
        TripStatus::Completed
    }
}

fn ceil_days(remaining: Duration) -> i64 {
    let day = Duration::days(1).num_milliseconds();
    let millis = remaining.num_milliseconds();
    (millis + day - 1).div_euclid(day)
}

/// Spending totals for a trip. Categories with no expenses are left out;
/// the rest follow `Category::ALL` order.
pub fn summarize(
    trip: &Trip,
    expenses: &[Expense],
    now: DateTime<Utc>,
) -> Result<TripSummary, BalanceError> {
    let overflow = || BalanceError::AmountOverflow(trip.id.clone());
    let expenses: Vec<&Expense> = expenses
        .iter()
        .filter(|expense| expense.trip_id == trip.id)
        .collect();

    let mut by_category = Vec::new();
    for &category in Category::ALL.iter() {
        let matching: Vec<&&Expense> = expenses
            .iter()
            .filter(|expense| expense.category == category)
            .collect();
        if matching.is_empty() {
            continue;
        }
        by_category.push(CategoryTotal {
            category,
            total: checked_total(matching.iter().map(|expense| expense.amount))
                .ok_or_else(overflow)?,
            count: matching.len(),
        });
    }

    let total_spent =
        checked_total(expenses.iter().map(|expense| expense.amount)).ok_or_else(overflow)?;

    Ok(TripSummary {
        trip_id: trip.id.clone(),
        currency: trip.currency.clone(),
        total_spent,
        expense_count: expenses.len(),
        member_count: trip.members.len(),
        by_category,
        status: trip_status(trip, now),
    })
}
