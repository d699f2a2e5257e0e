pub mod digest;
pub mod telegram;

pub use digest::{upcoming_payments_message, DIGEST_LIMIT};
pub use telegram::{NotifyError, TelegramNotifier};
