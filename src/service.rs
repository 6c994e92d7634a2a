use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::balance::{compute_balances, MemberBalance};
use crate::error::ServiceError;
use crate::repository::{ExpenseRepository, TripRepository};
use crate::schemas::{
    Expense, ExpenseUpdate, Member, MemberUpdate, NewExpense, NewMember, NewTrip, Trip,
    TripUpdate,
};
use crate::settlement::{compute_settlements, Settlement};
use crate::summary::{summarize, TripSummary};

// 0.1, 0.01 and one trillion
const MIN_WEIGHT: Decimal = Decimal::from_parts(1, 0, 0, false, 1);
const MIN_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Trip, member and expense bookkeeping on top of the repositories, plus the
/// balance and settlement views of a trip. Every computation reads a fresh
/// snapshot from storage.
#[derive(Clone)]
pub struct TripService {
    trips: Arc<dyn TripRepository>,
    expenses: Arc<dyn ExpenseRepository>,
}

impl TripService {
    pub fn new(trips: Arc<dyn TripRepository>, expenses: Arc<dyn ExpenseRepository>) -> Self {
        TripService { trips, expenses }
    }

    /// Uses one store for both trips and expenses.
    pub fn with_store<S>(store: Arc<S>) -> Self
    where
        S: TripRepository + ExpenseRepository + 'static,
    {
        TripService {
            trips: store.clone(),
            expenses: store,
        }
    }

    /// Newest trips first.
    pub async fn list_trips(&self) -> Result<Vec<Trip>, ServiceError> {
        let mut trips = self.trips.list_trips().await?;
        trips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(trips)
    }

    pub async fn trip(&self, id: &str) -> Result<Trip, ServiceError> {
        self.trips
            .find_trip(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("trip", id.to_string()))
    }

    pub async fn create_trip(&self, new_trip: NewTrip) -> Result<Trip, ServiceError> {
        validate_name("trip", &new_trip.name)?;
        validate_dates(new_trip.start_date, new_trip.end_date)?;
        if new_trip.members.is_empty() {
            return Err(ServiceError::validation("a trip needs at least one member"));
        }
        let members = new_trip
            .members
            .into_iter()
            .map(new_member)
            .collect::<Result<Vec<_>, _>>()?;

        let trip = Trip {
            id: Uuid::new_v4().to_string(),
            name: new_trip.name,
            start_date: new_trip.start_date,
            end_date: new_trip.end_date,
            members,
            currency: new_trip.currency,
            created_at: Utc::now(),
        };
        self.trips.insert_trip(&trip).await?;
        tracing::info!(trip_id = %trip.id, members = trip.members.len(), "trip created");
        Ok(trip)
    }

    pub async fn update_trip(&self, id: &str, update: TripUpdate) -> Result<Trip, ServiceError> {
        let mut trip = self.trip(id).await?;
        if let Some(name) = update.name {
            validate_name("trip", &name)?;
            trip.name = name;
        }
        if let Some(start_date) = update.start_date {
            trip.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            trip.end_date = end_date;
        }
        if let Some(currency) = update.currency {
            trip.currency = currency;
        }
        validate_dates(trip.start_date, trip.end_date)?;

        self.save_trip(&trip).await?;
        Ok(trip)
    }

    /// Deletes the trip together with all of its expenses.
    pub async fn delete_trip(&self, id: &str) -> Result<(), ServiceError> {
        if !self.trips.delete_trip(id).await? {
            return Err(ServiceError::NotFound("trip", id.to_string()));
        }
        let removed = self.expenses.delete_trip_expenses(id).await?;
        tracing::info!(trip_id = id, expenses_removed = removed, "trip deleted");
        Ok(())
    }

    pub async fn add_member(
        &self,
        trip_id: &str,
        member: NewMember,
    ) -> Result<Member, ServiceError> {
        let mut trip = self.trip(trip_id).await?;
        let member = new_member(member)?;
        trip.members.push(member.clone());
        self.save_trip(&trip).await?;
        tracing::info!(trip_id, member_id = %member.id, "member added");
        Ok(member)
    }

    pub async fn update_member(
        &self,
        trip_id: &str,
        member_id: &str,
        update: MemberUpdate,
    ) -> Result<Member, ServiceError> {
        let mut trip = self.trip(trip_id).await?;
        let member = trip
            .members
            .iter_mut()
            .find(|member| member.id == member_id)
            .ok_or_else(|| ServiceError::NotFound("member", member_id.to_string()))?;

        if let Some(name) = update.name {
            validate_name("member", &name)?;
            member.name = name;
        }
        if let Some(phone) = update.phone {
            member.phone = Some(phone);
        }
        if let Some(weight) = update.weight {
            validate_weight(weight)?;
            member.weight = weight;
        }
        let member = member.clone();

        self.save_trip(&trip).await?;
        Ok(member)
    }

    /// Removes the member and every expense of this trip they paid for.
    pub async fn remove_member(&self, trip_id: &str, member_id: &str) -> Result<(), ServiceError> {
        let mut trip = self.trip(trip_id).await?;
        if !trip.has_member(member_id) {
            return Err(ServiceError::NotFound("member", member_id.to_string()));
        }
        if trip.members.len() == 1 {
            return Err(ServiceError::validation(
                "cannot remove the last member of a trip",
            ));
        }
        trip.members.retain(|member| member.id != member_id);
        self.save_trip(&trip).await?;

        let removed = self
            .expenses
            .delete_expenses_paid_by(trip_id, member_id)
            .await?;
        tracing::info!(trip_id, member_id, expenses_removed = removed, "member removed");
        Ok(())
    }

    /// Most recent expenses first.
    pub async fn list_expenses(&self, trip_id: &str) -> Result<Vec<Expense>, ServiceError> {
        let trip = self.trip(trip_id).await?;
        let mut expenses = self.expenses.list_expenses(&trip.id).await?;
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(expenses)
    }

    pub async fn add_expense(
        &self,
        trip_id: &str,
        new_expense: NewExpense,
    ) -> Result<Expense, ServiceError> {
        let trip = self.trip(trip_id).await?;
        validate_amount(new_expense.amount)?;
        validate_payer(&trip, &new_expense.payer_id)?;

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            trip_id: trip.id,
            payer_id: new_expense.payer_id,
            amount: new_expense.amount,
            category: new_expense.category,
            description: new_expense.description,
            date: new_expense.date,
            split_type: new_expense.split_type,
            beneficiaries: new_expense.beneficiaries,
        };
        self.expenses.insert_expense(&expense).await?;
        tracing::info!(
            trip_id = %expense.trip_id,
            expense_id = %expense.id,
            amount = %expense.amount,
            "expense added"
        );
        Ok(expense)
    }

    pub async fn update_expense(
        &self,
        id: &str,
        update: ExpenseUpdate,
    ) -> Result<Expense, ServiceError> {
        let mut expense = self
            .expenses
            .find_expense(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("expense", id.to_string()))?;

        if let Some(payer_id) = update.payer_id {
            let trip = self.trip(&expense.trip_id).await?;
            validate_payer(&trip, &payer_id)?;
            expense.payer_id = payer_id;
        }
        if let Some(amount) = update.amount {
            validate_amount(amount)?;
            expense.amount = amount;
        }
        if let Some(category) = update.category {
            expense.category = category;
        }
        if let Some(description) = update.description {
            expense.description = Some(description);
        }
        if let Some(date) = update.date {
            expense.date = date;
        }
        if let Some(split_type) = update.split_type {
            expense.split_type = split_type;
        }
        if let Some(beneficiaries) = update.beneficiaries {
            expense.beneficiaries = Some(beneficiaries);
        }

        if !self.expenses.replace_expense(&expense).await? {
            return Err(ServiceError::NotFound("expense", id.to_string()));
        }
        Ok(expense)
    }

    pub async fn delete_expense(&self, id: &str) -> Result<(), ServiceError> {
        if !self.expenses.delete_expense(id).await? {
            return Err(ServiceError::NotFound("expense", id.to_string()));
        }
        tracing::info!(expense_id = id, "expense deleted");
        Ok(())
    }

    pub async fn balances(&self, trip_id: &str) -> Result<Vec<MemberBalance>, ServiceError> {
        let (trip, expenses) = self.snapshot(trip_id).await?;
        Ok(compute_balances(&trip, &expenses)?)
    }

    pub async fn settlements(&self, trip_id: &str) -> Result<Vec<Settlement>, ServiceError> {
        let balances = self.balances(trip_id).await?;
        let settlements = compute_settlements(&balances);
        tracing::debug!(trip_id, count = settlements.len(), "settlements computed");
        Ok(settlements)
    }

    pub async fn summary(
        &self,
        trip_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TripSummary, ServiceError> {
        let (trip, expenses) = self.snapshot(trip_id).await?;
        Ok(summarize(&trip, &expenses, now)?)
    }

    async fn snapshot(&self, trip_id: &str) -> Result<(Trip, Vec<Expense>), ServiceError> {
        let trip = self.trip(trip_id).await?;
        let expenses = self.expenses.list_expenses(&trip.id).await?;
        Ok((trip, expenses))
    }

    async fn save_trip(&self, trip: &Trip) -> Result<(), ServiceError> {
        if !self.trips.replace_trip(trip).await? {
            return Err(ServiceError::NotFound("trip", trip.id.clone()));
        }
        Ok(())
    }
}

fn new_member(member: NewMember) -> Result<Member, ServiceError> {
    validate_name("member", &member.name)?;
    validate_weight(member.weight)?;
    Ok(Member {
        id: Uuid::new_v4().to_string(),
        name: member.name,
        phone: member.phone.filter(|phone| !phone.trim().is_empty()),
        weight: member.weight,
    })
}

fn validate_name(kind: &str, name: &str) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::validation(format!("{kind} name is required")));
    }
    Ok(())
}

fn validate_dates(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ServiceError> {
    if end < start {
        return Err(ServiceError::validation("trip cannot end before it starts"));
    }
    Ok(())
}

fn validate_weight(weight: Decimal) -> Result<(), ServiceError> {
    if weight < MIN_WEIGHT {
        return Err(ServiceError::validation(format!(
            "member weight must be at least {MIN_WEIGHT}"
        )));
    }
    Ok(())
}

fn validate_amount(amount: Decimal) -> Result<(), ServiceError> {
    if amount < MIN_AMOUNT {
        return Err(ServiceError::validation(format!(
            "amount must be at least {MIN_AMOUNT}"
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(ServiceError::validation(format!(
            "amount must be at most {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

fn validate_payer(trip: &Trip, payer_id: &str) -> Result<(), ServiceError> {
    if !trip.has_member(payer_id) {
        return Err(ServiceError::validation(format!(
            "payer {payer_id} is not a member of trip {}",
            trip.id
        )));
    }
    Ok(())
}
