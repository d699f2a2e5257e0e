use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::money::Money;
use super::record::{PaymentMode, UnknownLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    #[serde(rename = "HL")]
    HandLoan,
    #[serde(rename = "EMI")]
    Emi,
    #[serde(rename = "HLG")]
    HandLoanGiven,
    #[serde(rename = "CC")]
    CreditCard,
    #[serde(rename = "CAS")]
    Cash,
    Chit,
    #[serde(rename = "CON")]
    Construction,
    #[serde(rename = "ACC")]
    Bank,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountKind::HandLoan => "HL",
            AccountKind::Emi => "EMI",
            AccountKind::HandLoanGiven => "HLG",
            AccountKind::CreditCard => "CC",
            AccountKind::Cash => "CAS",
            AccountKind::Chit => "Chit",
            AccountKind::Construction => "CON",
            AccountKind::Bank => "ACC",
        }
    }
}

impl FromStr for AccountKind {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HL" => Ok(AccountKind::HandLoan),
            "EMI" => Ok(AccountKind::Emi),
            "HLG" => Ok(AccountKind::HandLoanGiven),
            "CC" => Ok(AccountKind::CreditCard),
            "CAS" => Ok(AccountKind::Cash),
            "Chit" => Ok(AccountKind::Chit),
            "CON" => Ok(AccountKind::Construction),
            "ACC" => Ok(AccountKind::Bank),
            _ => Err(UnknownLabel {
                kind: "account type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked account. `balance` moves additively with every ledger
/// transaction posted against `account_id`. Tenure and EMI amount are only
/// meaningful for loan-type accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<i64>,
    pub name: String,
    pub kind: AccountKind,
    pub account_id: String,
    pub balance: Money,
    /// Monthly interest rate in percent.
    pub interest_rate: Decimal,
    /// Day of month the EMI or interest falls due, kept as entered.
    pub next_due_date: String,
    pub bank: PaymentMode,
    pub tenure_months: Option<i64>,
    pub emi_amount: Option<Money>,
    pub comments: Option<String>,
}
