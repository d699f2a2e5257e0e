use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::money::Money;

/// A stored label that does not correspond to any known enum variant.
/// Labels are persisted verbatim, so parsing must never fall back silently.
#[derive(Debug, Clone, Error)]
#[error("unknown {kind} label: {value}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

/// Bank or cash channel a transaction moved through. Reconciliation is scoped
/// to one of these per import source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    Cash,
    Credit,
    Dollars,
    #[serde(rename = "ICICI_090")]
    Icici090,
    #[serde(rename = "ICICI_Current")]
    IciciCurrent,
    #[serde(rename = "ICICI_CC_9003")]
    IciciCc9003,
    #[serde(rename = "ICICI_CC_1009")]
    IciciCc1009,
    #[serde(rename = "SBI")]
    Sbi,
    #[serde(rename = "SBI_3479")]
    Sbi3479,
    #[serde(rename = "DBS")]
    Dbs,
    Debit,
}

impl PaymentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Credit => "Credit",
            PaymentMode::Dollars => "Dollars",
            PaymentMode::Icici090 => "ICICI_090",
            PaymentMode::IciciCurrent => "ICICI_Current",
            PaymentMode::IciciCc9003 => "ICICI_CC_9003",
            PaymentMode::IciciCc1009 => "ICICI_CC_1009",
            PaymentMode::Sbi => "SBI",
            PaymentMode::Sbi3479 => "SBI_3479",
            PaymentMode::Dbs => "DBS",
            PaymentMode::Debit => "Debit",
        }
    }
}

impl FromStr for PaymentMode {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" => Ok(PaymentMode::Cash),
            "Credit" => Ok(PaymentMode::Credit),
            "Dollars" => Ok(PaymentMode::Dollars),
            "ICICI_090" => Ok(PaymentMode::Icici090),
            "ICICI_Current" => Ok(PaymentMode::IciciCurrent),
            "ICICI_CC_9003" => Ok(PaymentMode::IciciCc9003),
            "ICICI_CC_1009" => Ok(PaymentMode::IciciCc1009),
            "SBI" => Ok(PaymentMode::Sbi),
            "SBI_3479" => Ok(PaymentMode::Sbi3479),
            "DBS" => Ok(PaymentMode::Dbs),
            "Debit" => Ok(PaymentMode::Debit),
            _ => Err(UnknownLabel {
                kind: "payment mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Department {
    Serendipity,
    #[serde(rename = "Dhoom Studios")]
    DhoomStudios,
    Trademan,
}

impl Department {
    pub fn as_str(self) -> &'static str {
        match self {
            Department::Serendipity => "Serendipity",
            Department::DhoomStudios => "Dhoom Studios",
            Department::Trademan => "Trademan",
        }
    }
}

impl FromStr for Department {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Serendipity" => Ok(Department::Serendipity),
            "Dhoom Studios" => Ok(Department::DhoomStudios),
            "Trademan" => Ok(Department::Trademan),
            _ => Err(UnknownLabel {
                kind: "department",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Salaries,
    #[serde(rename = "Hand Loans")]
    HandLoans,
    Maintenance,
    Income,
    #[serde(rename = "EMI")]
    Emi,
    Chits,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Salaries => "Salaries",
            Category::HandLoans => "Hand Loans",
            Category::Maintenance => "Maintenance",
            Category::Income => "Income",
            Category::Emi => "EMI",
            Category::Chits => "Chits",
        }
    }
}

impl FromStr for Category {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Salaries" => Ok(Category::Salaries),
            "Hand Loans" => Ok(Category::HandLoans),
            "Maintenance" => Ok(Category::Maintenance),
            "Income" => Ok(Category::Income),
            "EMI" => Ok(Category::Emi),
            "Chits" => Ok(Category::Chits),
            _ => Err(UnknownLabel {
                kind: "category",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A posted bookkeeping record. Serial id is assigned by storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub payment_mode: PaymentMode,
    pub account_id: String,
    pub department: Department,
    pub category: Category,
    pub comments: Option<String>,
    /// Set when the record was manually reconciled against the external
    /// books during categorization.
    pub external_match: bool,
}

/// An expected future transaction, marked paid once it occurs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuturePrediction {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub payment_mode: PaymentMode,
    pub account_id: String,
    pub department: Department,
    pub category: Category,
    pub comments: Option<String>,
    pub paid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_mode_labels_round_trip() {
        for mode in [
            PaymentMode::Cash,
            PaymentMode::Icici090,
            PaymentMode::IciciCc9003,
            PaymentMode::Sbi3479,
            PaymentMode::Debit,
        ] {
            assert_eq!(mode.as_str().parse::<PaymentMode>().unwrap(), mode);
        }
    }

    #[test]
    fn department_labels_keep_spaces() {
        assert_eq!(Department::DhoomStudios.as_str(), "Dhoom Studios");
        assert_eq!(
            "Dhoom Studios".parse::<Department>().unwrap(),
            Department::DhoomStudios
        );
    }

    #[test]
    fn category_labels_round_trip() {
        for cat in [
            Category::Salaries,
            Category::HandLoans,
            Category::Emi,
            Category::Chits,
        ] {
            assert_eq!(cat.as_str().parse::<Category>().unwrap(), cat);
        }
    }

    #[test]
    fn unknown_label_is_an_error() {
        let err = "HDFC".parse::<PaymentMode>().unwrap_err();
        assert_eq!(err.kind, "payment mode");
        assert_eq!(err.value, "HDFC");
    }
}
