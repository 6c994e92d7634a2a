use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::schemas::{Expense, MemberId, Trip, TripId};

/// What a single member has put in, what their share of the trip is, and the
/// difference. A positive `net` means the member is owed money.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberBalance {
    pub member_id: MemberId,
    pub name: String,
    pub paid: Decimal,
    pub owes: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Error, PartialEq)]
pub enum BalanceError {
    #[error("trip {0} has expenses but no members to split them between")]
    InvalidTripState(TripId),
    #[error("expense total of trip {0} is too large to compute")]
    AmountOverflow(TripId),
}

/// Sums amounts, or `None` if the total does not fit in a `Decimal`.
pub(crate) fn checked_total(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
}

/// Computes every member's position for `trip`, splitting the total spend
/// equally across all members.
///
/// Expenses belonging to another trip are ignored. When the trip has no
/// expenses the result is empty rather than a list of zeroed entries. An
/// expense whose payer is not a member still counts towards the total, but
/// its amount is not credited to anyone.
pub fn compute_balances(
    trip: &Trip,
    expenses: &[Expense],
) -> Result<Vec<MemberBalance>, BalanceError> {
    let expenses: Vec<&Expense> = expenses
        .iter()
        .filter(|expense| expense.trip_id == trip.id)
        .collect();
    if expenses.is_empty() {
        return Ok(Vec::new());
    }
    if trip.members.is_empty() {
        return Err(BalanceError::InvalidTripState(trip.id.clone()));
    }

    let mut balances: Vec<MemberBalance> = trip
        .members
        .iter()
        .map(|member| MemberBalance {
            member_id: member.id.clone(),
            name: member.name.clone(),
            paid: Decimal::ZERO,
            owes: Decimal::ZERO,
            net: Decimal::ZERO,
        })
        .collect();

    let overflow = || BalanceError::AmountOverflow(trip.id.clone());

    for expense in &expenses {
        if let Some(balance) = balances
            .iter_mut()
            .find(|balance| balance.member_id == expense.payer_id)
        {
            balance.paid = balance
                .paid
                .checked_add(expense.amount)
                .ok_or_else(overflow)?;
        }
    }

    let total =
        checked_total(expenses.iter().map(|expense| expense.amount)).ok_or_else(overflow)?;
    let share_per_person = total / Decimal::from(trip.members.len());

    for balance in &mut balances {
        balance.owes = share_per_person;
        balance.net = balance.paid - balance.owes;
    }
    Ok(balances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{expense, generated_trip, trip};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn net_of(balances: &[MemberBalance], member_id: &str) -> Decimal {
        balances
            .iter()
            .find(|balance| balance.member_id == member_id)
            .map(|balance| balance.net)
            .unwrap()
    }

    #[test]
    fn one_payer_between_two_members() {
        let trip = trip("t1", &[("alice", "Alice"), ("bob", "Bob")]);
        let expenses = vec![expense("e1", "t1", "alice", dec!(100))];

        let balances = compute_balances(&trip, &expenses).unwrap();

        assert_eq!(
            balances,
            vec![
                MemberBalance {
                    member_id: "alice".into(),
                    name: "Alice".into(),
                    paid: dec!(100),
                    owes: dec!(50),
                    net: dec!(50),
                },
                MemberBalance {
                    member_id: "bob".into(),
                    name: "Bob".into(),
                    paid: dec!(0),
                    owes: dec!(50),
                    net: dec!(-50),
                },
            ]
        );
    }

    #[test]
    fn one_payer_between_three_members() {
        let trip = trip("t1", &[("a", "A"), ("b", "B"), ("c", "C")]);
        let expenses = vec![expense("e1", "t1", "a", dec!(90))];

        let balances = compute_balances(&trip, &expenses).unwrap();

        assert!(balances.iter().all(|balance| balance.owes == dec!(30)));
        assert_eq!(net_of(&balances, "a"), dec!(60));
        assert_eq!(net_of(&balances, "b"), dec!(-30));
        assert_eq!(net_of(&balances, "c"), dec!(-30));
    }

    #[test]
    fn no_expenses_yields_no_entries() {
        let trip = trip("t1", &[("alice", "Alice"), ("bob", "Bob")]);
        assert_eq!(compute_balances(&trip, &[]).unwrap(), vec![]);
    }

    #[test]
    fn members_keep_trip_order_even_without_payments() {
        let trip = trip("t1", &[("c", "C"), ("a", "A"), ("b", "B")]);
        let expenses = vec![expense("e1", "t1", "b", dec!(30))];

        let balances = compute_balances(&trip, &expenses).unwrap();
        let ids: Vec<&str> = balances.iter().map(|b| b.member_id.as_str()).collect();

        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn unknown_payer_counts_towards_total_but_not_paid() {
        let trip = trip("t1", &[("alice", "Alice"), ("bob", "Bob")]);
        let expenses = vec![
            expense("e1", "t1", "alice", dec!(40)),
            expense("e2", "t1", "ghost", dec!(60)),
        ];

        let balances = compute_balances(&trip, &expenses).unwrap();

        assert_eq!(balances[0].paid, dec!(40));
        assert_eq!(balances[1].paid, dec!(0));
        assert!(balances.iter().all(|balance| balance.owes == dec!(50)));
    }

    #[test]
    fn expenses_of_other_trips_are_ignored() {
        let trip = trip("t1", &[("alice", "Alice"), ("bob", "Bob")]);
        let expenses = vec![
            expense("e1", "t1", "alice", dec!(20)),
            expense("e2", "t2", "bob", dec!(500)),
        ];

        let balances = compute_balances(&trip, &expenses).unwrap();

        assert_eq!(net_of(&balances, "alice"), dec!(10));
        assert_eq!(net_of(&balances, "bob"), dec!(-10));

        let only_foreign = vec![expense("e2", "t2", "bob", dec!(500))];
        assert!(compute_balances(&trip, &only_foreign).unwrap().is_empty());
    }

    #[test]
    fn memberless_trip_with_expenses_is_rejected() {
        let trip = trip("t1", &[]);
        let expenses = vec![expense("e1", "t1", "alice", dec!(10))];

        assert_eq!(
            compute_balances(&trip, &expenses),
            Err(BalanceError::InvalidTripState("t1".into()))
        );
        assert!(compute_balances(&trip, &[]).unwrap().is_empty());
    }

    #[test]
    fn oversized_totals_are_reported_instead_of_overflowing() {
        let trip = trip("t1", &[("a", "A"), ("b", "B")]);
        let huge = Decimal::MAX;
        let expenses = vec![
            expense("e1", "t1", "a", huge),
            expense("e2", "t1", "a", huge),
        ];

        assert_eq!(
            compute_balances(&trip, &expenses),
            Err(BalanceError::AmountOverflow("t1".into()))
        );

        // the payer is unknown, so only the trip total overflows
        let unattributed = vec![
            expense("e1", "t1", "ghost", huge),
            expense("e2", "t1", "b", huge),
        ];
        assert_eq!(
            compute_balances(&trip, &unattributed),
            Err(BalanceError::AmountOverflow("t1".into()))
        );
    }

    #[test]
    fn nets_sum_to_zero_and_results_are_repeatable() {
        let trip = trip("t1", &[("a", "A"), ("b", "B"), ("c", "C")]);
        let expenses = vec![
            expense("e1", "t1", "a", dec!(100)),
            expense("e2", "t1", "b", dec!(33.33)),
            expense("e3", "t1", "a", dec!(0.01)),
            expense("e4", "t1", "c", dec!(19.99)),
        ];

        let first = compute_balances(&trip, &expenses).unwrap();
        let second = compute_balances(&trip, &expenses).unwrap();
        assert_eq!(first, second);

        let total_net: Decimal = first.iter().map(|balance| balance.net).sum();
        assert!(total_net.abs() < dec!(0.01));
    }

    proptest! {
        #[test]
        fn nets_and_unattributed_spend_cancel_out(
            members in 1usize..=8,
            spends in prop::collection::vec((0usize..10, 1u64..=1_000_000), 0..=20),
        ) {
            let (trip, expenses) = generated_trip(members, &spends);
            let balances = compute_balances(&trip, &expenses).unwrap();

            prop_assert_eq!(balances.len(), if spends.is_empty() { 0 } else { members });
            prop_assert!(balances.iter().all(|balance| balance.owes == balances[0].owes));

            let unattributed: Decimal = expenses
                .iter()
                .filter(|expense| !trip.has_member(&expense.payer_id))
                .map(|expense| expense.amount)
                .sum();
            let total_net: Decimal = balances.iter().map(|balance| balance.net).sum();
            prop_assert!((total_net + unattributed).abs() < dec!(0.01));

            prop_assert_eq!(compute_balances(&trip, &expenses).unwrap(), balances);
        }
    }
}
