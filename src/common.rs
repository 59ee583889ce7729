//! Common helpers to be used by various bot modules.

use std::sync::Arc;

use crate::db::DbPool;
use crate::metrics::Metrics;
use crate::utils::AddressApi;

/// Wrapper around [`teloxide::dispatching::UpdateHandler`] to be used in this
/// crate.
pub type UpdateHandler = teloxide::dispatching::UpdateHandler<anyhow::Error>;

/// Bot environment: global state shared between all handlers.
pub struct BotEnv {
    pub pool: DbPool,
    pub address_api: AddressApi,
    pub metrics: Arc<Metrics>,
}
