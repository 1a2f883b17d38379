//! Transfer tariff calculation.
//!
//! Pure function of (transfer type, booking date, amount). Transfers booked
//! before 2022-12-01 are grandfathered fee-free; from that date on, TED pays
//! a flat fee, DOC a capped percentage, TEF nothing. The match over
//! [`TransactionType`] is exhaustive, so an unknown type cannot reach this
//! function.

use crate::decimal::Decimal2;
use crate::transaction::TransactionType;
use chrono::NaiveDate;

/// First booking date on which tariffs apply.
fn fee_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 12, 1).expect("valid calendar date")
}

/// Computes the fee charged to the source side of an outgoing transfer.
///
/// - any type before 2022-12-01: `0.00`
/// - TED: `5.00` flat
/// - DOC: `1.00 + min(5.00, amount * 0.01)`
/// - TEF: `0.00`
pub fn tariff(kind: TransactionType, date: NaiveDate, amount: Decimal2) -> Decimal2 {
    if date < fee_start() {
        return Decimal2::ZERO;
    }

    match kind {
        TransactionType::Ted => Decimal2::from_cents(500),
        TransactionType::Doc => {
            let variable = (amount * Decimal2::from_cents(1)).min(Decimal2::from_cents(500));
            Decimal2::from_cents(100) + variable
        }
        TransactionType::Tef => Decimal2::ZERO,
    }
}
