mod address_api;
mod log_error;
mod parsers;
mod sqs;
mod teloxide;

pub use address_api::{
    AddressApi, AddressApiError, AddressCandidate, KladrInfo, ParsedAddress,
};
pub use log_error::ResultExt;
pub use parsers::{deserialize_null_default, parse_event_time};
pub use sqs::SqsQueue;

pub use self::teloxide::{single_column_keyboard, BotExt};
