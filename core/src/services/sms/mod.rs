//! SMS delivery capability

mod traits;

pub use traits::{SharedSmsProvider, SmsProvider};
