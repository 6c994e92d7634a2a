use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type TripId = String;
pub type MemberId = String;
pub type ExpenseId = String;

fn default_weight() -> Decimal {
    Decimal::ONE
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    // Only read by weighted splitting, which is not applied yet
    #[serde(default = "default_weight")]
    pub weight: Decimal,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: TripId,
    pub name: String,
    #[serde(rename = "startDateISO")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "endDateISO")]
    pub end_date: DateTime<Utc>,
    pub members: Vec<Member>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(rename = "createdAtISO")]
    pub created_at: DateTime<Utc>,
}

impl Trip {
    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.id == member_id)
    }

    pub fn has_member(&self, member_id: &str) -> bool {
        self.member(member_id).is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Category {
    Travel,
    Stay,
    Food,
    Shopping,
    Activity,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Travel,
        Category::Stay,
        Category::Food,
        Category::Shopping,
        Category::Activity,
        Category::Other,
    ];
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    #[default]
    Equal,
    Weights,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    pub trip_id: TripId,
    pub payer_id: MemberId,
    pub amount: Decimal,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "dateISO")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub split_type: SplitType,
    // Stored as given; balances always split across every trip member
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beneficiaries: Option<Vec<MemberId>>,
}

// Request payloads. Ids and timestamps are assigned by the service.

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_weight")]
    pub weight: Decimal,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub name: String,
    #[serde(rename = "startDateISO")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "endDateISO")]
    pub end_date: DateTime<Utc>,
    pub members: Vec<NewMember>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripUpdate {
    pub name: Option<String>,
    #[serde(rename = "startDateISO")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(rename = "endDateISO")]
    pub end_date: Option<DateTime<Utc>>,
    pub currency: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub weight: Option<Decimal>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub payer_id: MemberId,
    pub amount: Decimal,
    pub category: Category,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "dateISO")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub split_type: SplitType,
    #[serde(default)]
    pub beneficiaries: Option<Vec<MemberId>>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    pub payer_id: Option<MemberId>,
    pub amount: Option<Decimal>,
    pub category: Option<Category>,
    pub description: Option<String>,
    #[serde(rename = "dateISO")]
    pub date: Option<DateTime<Utc>>,
    pub split_type: Option<SplitType>,
    pub beneficiaries: Option<Vec<MemberId>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn expense_uses_original_field_names() {
        let expense: Expense = serde_json::from_value(json!({
            "id": "e1",
            "tripId": "t1",
            "payerId": "alice",
            "amount": 12.5,
            "category": "Food",
            "dateISO": "2024-05-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(expense.amount, dec!(12.5));
        assert_eq!(expense.split_type, SplitType::Equal);
        assert_eq!(expense.beneficiaries, None);

        let value = serde_json::to_value(&expense).unwrap();
        assert_eq!(value["tripId"], "t1");
        assert_eq!(value["splitType"], "equal");
        assert_eq!(value["amount"], "12.5");
        assert!(value.get("dateISO").is_some());
        assert!(value.get("description").is_none());
    }

    #[test]
    fn member_weight_and_trip_currency_default() {
        let trip: Trip = serde_json::from_value(json!({
            "id": "t1",
            "name": "Lisbon",
            "startDateISO": "2024-05-01T00:00:00Z",
            "endDateISO": "2024-05-08T00:00:00Z",
            "members": [{ "id": "alice", "name": "Alice" }],
            "createdAtISO": "2024-04-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(trip.currency, "USD");
        assert_eq!(trip.members[0].weight, Decimal::ONE);
        assert!(trip.has_member("alice"));
        assert!(!trip.has_member("bob"));
    }

    #[test]
    fn new_expense_requires_a_category() {
        let mut payload = json!({
            "payerId": "alice",
            "amount": "19.99",
            "dateISO": "2024-05-02T00:00:00Z"
        });

        let err = serde_json::from_value::<NewExpense>(payload.clone()).unwrap_err();
        assert!(err.to_string().contains("missing field `category`"));

        payload["category"] = json!("Activity");
        let expense: NewExpense = serde_json::from_value(payload).unwrap();
        assert_eq!(expense.category, Category::Activity);
        assert_eq!(expense.split_type, SplitType::Equal);
    }
}
