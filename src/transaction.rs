//! Transfer transaction models shared by the batch files and the processor.

use crate::decimal::Decimal2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transfer type codes with distinct fee and eligibility rules.
///
/// TEF transfers are restricted to fully-local source and target accounts;
/// TED and DOC may cross banks. Fees are computed in [`crate::tariff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Same-day wire transfer, flat fee.
    Ted,

    /// Next-day document transfer, percentage fee with a cap.
    Doc,

    /// Intra-bank transfer, free, local accounts only.
    Tef,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionType::Ted => "TED",
            TransactionType::Doc => "DOC",
            TransactionType::Tef => "TEF",
        };
        f.write_str(name)
    }
}

/// One pending transfer, as read from a dated batch file.
///
/// Ephemeral: constructed by an external producer, consumed exactly once by
/// the batch processor, and recorded in either a completed file or, paired
/// with a [`TransactionResult`], a failed file. Field order matches the
/// persisted column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Bank code of the debited side
    pub source_bank: u32,

    /// Branch of the debited account
    pub source_branch: u32,

    /// Debited account number
    pub source_account: u32,

    /// Bank code of the credited side
    pub target_bank: u32,

    /// Branch of the credited account
    pub target_branch: u32,

    /// Credited account number
    pub target_account: u32,

    /// Transfer type, rendered as `TED`/`DOC`/`TEF`
    pub kind: TransactionType,

    /// Transfer amount, non-negative
    pub amount: Decimal2,
}

/// Reason a transaction was rejected by the processor.
///
/// Rejections are outcomes, not errors: a batch run always settles every
/// row, and each rejected row is written to the failed file paired with
/// one of these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionResult {
    /// Source account missing or inactive at the local bank
    InvalidSource,

    /// Target account missing or inactive at the local bank
    InvalidTarget,

    /// TEF with a foreign leg
    InvalidType,

    /// Source balance cannot cover amount plus tariff
    InsufficientBalance,
}

impl TransactionResult {
    /// The name written to failed-transaction files.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionResult::InvalidSource => "INVALID_SOURCE",
            TransactionResult::InvalidTarget => "INVALID_TARGET",
            TransactionResult::InvalidType => "INVALID_TYPE",
            TransactionResult::InsufficientBalance => "INSUFFICIENT_BALANCE",
        }
    }
}

impl fmt::Display for TransactionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample() -> Transaction {
        Transaction {
            source_bank: 777,
            source_branch: 1,
            source_account: 100,
            target_bank: 341,
            target_branch: 2,
            target_account: 5500,
            kind: TransactionType::Ted,
            amount: Decimal2::from_str("200.00").unwrap(),
        }
    }

    #[test]
    fn test_csv_row_round_trip() {
        let mut buf = Vec::new();
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut buf);
            writer.serialize(sample()).unwrap();
            writer.flush().unwrap();
        }
        let raw = String::from_utf8(buf).unwrap();

        assert_eq!(raw.trim_end(), "777,1,100,341,2,5500,TED,200.00");

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(raw.as_bytes());
        let parsed: Transaction = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(TransactionType::Ted.to_string(), "TED");
        assert_eq!(TransactionType::Doc.to_string(), "DOC");
        assert_eq!(TransactionType::Tef.to_string(), "TEF");
    }

    #[test]
    fn test_result_names() {
        assert_eq!(TransactionResult::InvalidSource.as_str(), "INVALID_SOURCE");
        assert_eq!(TransactionResult::InvalidTarget.as_str(), "INVALID_TARGET");
        assert_eq!(TransactionResult::InvalidType.as_str(), "INVALID_TYPE");
        assert_eq!(
            TransactionResult::InsufficientBalance.as_str(),
            "INSUFFICIENT_BALANCE"
        );
    }

    #[test]
    fn test_unknown_type_fails_to_parse() {
        let raw = "777,1,100,341,2,5500,PIX,200.00";
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(raw.as_bytes());
        let parsed: std::result::Result<Transaction, _> = reader.deserialize().next().unwrap();
        assert!(parsed.is_err());
    }
}
