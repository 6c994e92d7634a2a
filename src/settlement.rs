use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::balance::MemberBalance;
use crate::schemas::MemberId;

// 0.01: positions closer to zero than this count as settled
const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub from_id: MemberId,
    pub to_id: MemberId,
    pub amount: Decimal,
}

// Working copy of a balance; only `amount` is mutated while matching
#[derive(Debug)]
struct Position<'a> {
    member_id: &'a str,
    amount: Decimal,
}

/// Turns member balances into a list of payments that clears them.
///
/// Debtors and creditors are each ordered from the largest amount down (ties
/// keep their input order) and matched greedily: the current debtor pays the
/// current creditor as much as both can take, and whichever side is exhausted
/// moves on. If the two sides do not add up, matching stops when one of them
/// runs out and the rest is left unexpressed.
pub fn compute_settlements(balances: &[MemberBalance]) -> Vec<Settlement> {
    let mut debtors = positions(balances, |net| net < -TOLERANCE);
    let mut creditors = positions(balances, |net| net > TOLERANCE);

    let mut settlements = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < debtors.len() && j < creditors.len() {
        let debtor = &mut debtors[i];
        let creditor = &mut creditors[j];

        let settle_amount = debtor.amount.min(creditor.amount);
        settlements.push(Settlement {
            from_id: debtor.member_id.to_string(),
            to_id: creditor.member_id.to_string(),
            amount: round_to_2_decimals(settle_amount),
        });

        debtor.amount -= settle_amount;
        creditor.amount -= settle_amount;

        if debtor.amount < TOLERANCE {
            i += 1;
        }
        if creditor.amount < TOLERANCE {
            j += 1;
        }
    }
    settlements
}

fn positions(balances: &[MemberBalance], side: impl Fn(Decimal) -> bool) -> Vec<Position<'_>> {
    let mut positions: Vec<Position> = balances
        .iter()
        .filter(|balance| side(balance.net))
        .map(|balance| Position {
            member_id: &balance.member_id,
            amount: balance.net.abs(),
        })
        .collect();
    // sort_by is stable, equal amounts stay in balance order
    positions.sort_by(|a, b| b.amount.cmp(&a.amount));
    positions
}

fn round_to_2_decimals(n: Decimal) -> Decimal {
    n.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
