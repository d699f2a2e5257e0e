use khata_core::FuturePrediction;

/// How many upcoming unpaid items one digest announces.
pub const DIGEST_LIMIT: i64 = 5;

/// Formats the upcoming-payments announcement. No unpaid items means no
/// message at all, not an empty one.
pub fn upcoming_payments_message(payments: &[FuturePrediction]) -> Option<String> {
    if payments.is_empty() {
        return None;
    }
    let mut message = String::from("Upcoming Payments:");
    for payment in payments {
        message.push_str(&format!(
            "\n{}: {} - {}",
            payment.date, payment.description, payment.amount
        ));
    }
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use khata_core::{Category, Department, Money, PaymentMode};

    fn payment(day: u32, desc: &str, cents: i64) -> FuturePrediction {
        FuturePrediction {
            id: None,
            date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            description: desc.to_string(),
            amount: Money::from_cents(cents),
            payment_mode: PaymentMode::Icici090,
            account_id: "GL01".to_string(),
            department: Department::Serendipity,
            category: Category::Emi,
            comments: None,
            paid: false,
        }
    }

    #[test]
    fn formats_one_line_per_payment() {
        let message = upcoming_payments_message(&[
            payment(1, "chit instalment", 1000000),
            payment(5, "gold loan EMI", 1200050),
        ])
        .unwrap();
        assert_eq!(
            message,
            "Upcoming Payments:\n\
             2024-02-01: chit instalment - 10000.00\n\
             2024-02-05: gold loan EMI - 12000.50"
        );
    }

    #[test]
    fn no_payments_means_no_message() {
        assert_eq!(upcoming_payments_message(&[]), None);
    }
}
