use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{Client, Collection};

use crate::error::StoreError;
use crate::schemas::{Expense, Trip};

#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn list_trips(&self) -> Result<Vec<Trip>, StoreError>;
    async fn find_trip(&self, id: &str) -> Result<Option<Trip>, StoreError>;
    async fn insert_trip(&self, trip: &Trip) -> Result<(), StoreError>;
    /// Returns false if no trip with that id was stored.
    async fn replace_trip(&self, trip: &Trip) -> Result<bool, StoreError>;
    async fn delete_trip(&self, id: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn list_expenses(&self, trip_id: &str) -> Result<Vec<Expense>, StoreError>;
    async fn find_expense(&self, id: &str) -> Result<Option<Expense>, StoreError>;
    async fn insert_expense(&self, expense: &Expense) -> Result<(), StoreError>;
    async fn replace_expense(&self, expense: &Expense) -> Result<bool, StoreError>;
    async fn delete_expense(&self, id: &str) -> Result<bool, StoreError>;
    async fn delete_trip_expenses(&self, trip_id: &str) -> Result<u64, StoreError>;
    async fn delete_expenses_paid_by(
        &self,
        trip_id: &str,
        payer_id: &str,
    ) -> Result<u64, StoreError>;
}

/// Trips and expenses kept in two MongoDB collections, addressed by their
/// own `id` field rather than Mongo's `_id`.
#[derive(Clone, Debug)]
pub struct MongoStore {
    trips: Collection<Trip>,
    expenses: Collection<Expense>,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self::new(&client, database))
    }

    pub fn new(client: &Client, database: &str) -> Self {
        let database = client.database(database);
        MongoStore {
            trips: database.collection("Trips"),
            expenses: database.collection("Expenses"),
        }
    }
}

#[async_trait]
impl TripRepository for MongoStore {
    async fn list_trips(&self) -> Result<Vec<Trip>, StoreError> {
        let cursor = self.trips.find(None, None).await?;
        Ok(cursor.try_collect::<Vec<_>>().await?)
    }

    async fn find_trip(&self, id: &str) -> Result<Option<Trip>, StoreError> {
        Ok(self.trips.find_one(doc! { "id": id }, None).await?)
    }

    async fn insert_trip(&self, trip: &Trip) -> Result<(), StoreError> {
        self.trips.insert_one(trip, None).await?;
        Ok(())
    }

    async fn replace_trip(&self, trip: &Trip) -> Result<bool, StoreError> {
        let result = self
            .trips
            .replace_one(doc! { "id": trip.id.as_str() }, trip, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_trip(&self, id: &str) -> Result<bool, StoreError> {
        let result = self.trips.delete_one(doc! { "id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }
}

#[async_trait]
impl ExpenseRepository for MongoStore {
    async fn list_expenses(&self, trip_id: &str) -> Result<Vec<Expense>, StoreError> {
        let cursor = self.expenses.find(doc! { "tripId": trip_id }, None).await?;
        Ok(cursor.try_collect::<Vec<_>>().await?)
    }

    async fn find_expense(&self, id: &str) -> Result<Option<Expense>, StoreError> {
        Ok(self.expenses.find_one(doc! { "id": id }, None).await?)
    }

    async fn insert_expense(&self, expense: &Expense) -> Result<(), StoreError> {
        self.expenses.insert_one(expense, None).await?;
        Ok(())
    }

    async fn replace_expense(&self, expense: &Expense) -> Result<bool, StoreError> {
        let result = self
            .expenses
            .replace_one(doc! { "id": expense.id.as_str() }, expense, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_expense(&self, id: &str) -> Result<bool, StoreError> {
        let result = self.expenses.delete_one(doc! { "id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_trip_expenses(&self, trip_id: &str) -> Result<u64, StoreError> {
        let result = self
            .expenses
            .delete_many(doc! { "tripId": trip_id }, None)
            .await?;
        Ok(result.deleted_count)
    }

    async fn delete_expenses_paid_by(
        &self,
        trip_id: &str,
        payer_id: &str,
    ) -> Result<u64, StoreError> {
        let result = self
            .expenses
            .delete_many(doc! { "tripId": trip_id, "payerId": payer_id }, None)
            .await?;
        Ok(result.deleted_count)
    }
}

/// Process-local store, used by tests and by `TRIPSPLIT_STORAGE=memory`.
/// Records are returned in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    trips: RwLock<Vec<Trip>>,
    expenses: RwLock<Vec<Expense>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read().map_err(|_| StoreError::Poisoned)
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write().map_err(|_| StoreError::Poisoned)
}

#[async_trait]
impl TripRepository for MemoryStore {
    async fn list_trips(&self) -> Result<Vec<Trip>, StoreError> {
        Ok(read(&self.trips)?.clone())
    }

    async fn find_trip(&self, id: &str) -> Result<Option<Trip>, StoreError> {
        Ok(read(&self.trips)?.iter().find(|trip| trip.id == id).cloned())
    }

    async fn insert_trip(&self, trip: &Trip) -> Result<(), StoreError> {
        write(&self.trips)?.push(trip.clone());
        Ok(())
    }

    async fn replace_trip(&self, trip: &Trip) -> Result<bool, StoreError> {
        let mut trips = write(&self.trips)?;
        match trips.iter_mut().find(|stored| stored.id == trip.id) {
            Some(stored) => {
                *stored = trip.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_trip(&self, id: &str) -> Result<bool, StoreError> {
        let mut trips = write(&self.trips)?;
        let before = trips.len();
        trips.retain(|trip| trip.id != id);
        Ok(trips.len() < before)
    }
}

#[async_trait]
impl ExpenseRepository for MemoryStore {
    async fn list_expenses(&self, trip_id: &str) -> Result<Vec<Expense>, StoreError> {
        Ok(read(&self.expenses)?
            .iter()
            .filter(|expense| expense.trip_id == trip_id)
            .cloned()
            .collect())
    }

    async fn find_expense(&self, id: &str) -> Result<Option<Expense>, StoreError> {
        Ok(read(&self.expenses)?
            .iter()
            .find(|expense| expense.id == id)
            .cloned())
    }

    async fn insert_expense(&self, expense: &Expense) -> Result<(), StoreError> {
        write(&self.expenses)?.push(expense.clone());
        Ok(())
    }

    async fn replace_expense(&self, expense: &Expense) -> Result<bool, StoreError> {
        let mut expenses = write(&self.expenses)?;
        match expenses.iter_mut().find(|stored| stored.id == expense.id) {
            Some(stored) => {
                *stored = expense.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_expense(&self, id: &str) -> Result<bool, StoreError> {
        let mut expenses = write(&self.expenses)?;
        let before = expenses.len();
        expenses.retain(|expense| expense.id != id);
        Ok(expenses.len() < before)
    }

    async fn delete_trip_expenses(&self, trip_id: &str) -> Result<u64, StoreError> {
        let mut expenses = write(&self.expenses)?;
        let before = expenses.len();
        expenses.retain(|expense| expense.trip_id != trip_id);
        Ok((before - expenses.len()) as u64)
    }

    async fn delete_expenses_paid_by(
        &self,
        trip_id: &str,
        payer_id: &str,
    ) -> Result<u64, StoreError> {
        let mut expenses = write(&self.expenses)?;
        let before = expenses.len();
        expenses.retain(|expense| !(expense.trip_id == trip_id && expense.payer_id == payer_id));
        Ok((before - expenses.len()) as u64)
    }
}
