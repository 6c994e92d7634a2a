use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::schemas::{Category, Expense, Member, SplitType, Trip};

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

pub fn member(id: &str, name: &str) -> Member {
    Member {
        id: id.to_string(),
        name: name.to_string(),
        phone: None,
        weight: Decimal::ONE,
    }
}

/// Members are given as `(id, name)` pairs, in trip order.
pub fn trip(id: &str, members: &[(&str, &str)]) -> Trip {
    Trip {
        id: id.to_string(),
        name: format!("Trip {id}"),
        start_date: at(2024, 5, 1),
        end_date: at(2024, 5, 8),
        members: members
            .iter()
            .map(|(id, name)| member(id, name))
            .collect(),
        currency: "USD".to_string(),
        created_at: at(2024, 4, 1),
    }
}

pub fn expense(id: &str, trip_id: &str, payer_id: &str, amount: Decimal) -> Expense {
    Expense {
        id: id.to_string(),
        trip_id: trip_id.to_string(),
        payer_id: payer_id.to_string(),
        amount,
        category: Category::Other,
        description: None,
        date: at(2024, 5, 2),
        split_type: SplitType::Equal,
        beneficiaries: None,
    }
}

/// Trip `t1` with members `m0`, `m1`, .. and one expense per `(payer, cents)`
/// pair. A payer index past the member list pays as an unknown `ghost-{index}`.
pub fn generated_trip(members: usize, spends: &[(usize, u64)]) -> (Trip, Vec<Expense>) {
    let people: Vec<(String, String)> = (0..members)
        .map(|index| (format!("m{index}"), format!("Member {index}")))
        .collect();
    let pairs: Vec<(&str, &str)> = people
        .iter()
        .map(|(id, name)| (id.as_str(), name.as_str()))
        .collect();

    let expenses = spends
        .iter()
        .enumerate()
        .map(|(n, &(payer, cents))| {
            let payer_id = if payer < members {
                format!("m{payer}")
            } else {
                format!("ghost-{payer}")
            };
            expense(&format!("e{n}"), "t1", &payer_id, Decimal::new(cents as i64, 2))
        })
        .collect();
    (trip("t1", &pairs), expenses)
}
