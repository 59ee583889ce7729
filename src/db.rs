use anyhow::Result;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::{ExpressionMethods, QueryDsl, QueryResult, RunQueryDsl};
use diesel_derive_newtype::DieselNewType;
use serde::{Deserialize, Serialize};
use teloxide::types::ChatId;
use uuid::Uuid;

use crate::models::NewSubscription;
use crate::schema::subscriptions;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Connections are opened on demand, so an unreachable database only fails
/// the operations that need it.
pub fn create_pool(database_url: &str, max_size: u32) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(max_size).build_unchecked(manager)
}

/// Run `f` on a connection checked out for this call only.
pub fn with_conn<T>(
    pool: &DbPool,
    f: impl FnOnce(&mut PgConnection) -> QueryResult<T>,
) -> Result<T> {
    let mut conn = pool.get()?;
    Ok(f(&mut conn)?)
}

/// Telegram chat id as stored in the `tg_id` text column.
#[derive(
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    DieselNewType,
)]
pub struct DbChatId(String);

impl From<ChatId> for DbChatId {
    fn from(id: ChatId) -> Self {
        Self(id.0.to_string())
    }
}

impl TryFrom<DbChatId> for ChatId {
    type Error = std::num::ParseIntError;

    fn try_from(id: DbChatId) -> Result<Self, Self::Error> {
        id.0.parse().map(Self)
    }
}

pub fn insert_subscription(
    conn: &mut PgConnection,
    chat_id: ChatId,
    kladr: &str,
    full_address: &str,
) -> QueryResult<Uuid> {
    let id = Uuid::new_v4();
    diesel::insert_into(subscriptions::table)
        .values(NewSubscription {
            id,
            created_at: chrono::Utc::now(),
            subscribe_to_kladr: kladr,
            subscribe_to_fulltext: full_address,
            tg_id: chat_id.into(),
        })
        .execute(conn)?;
    Ok(id)
}

/// Display addresses of all subscriptions of a chat, oldest first.
pub fn subscription_addresses(
    conn: &mut PgConnection,
    chat_id: ChatId,
) -> QueryResult<Vec<String>> {
    subscriptions::table
        .filter(subscriptions::tg_id.eq(DbChatId::from(chat_id)))
        .order(subscriptions::created_at.asc())
        .select(subscriptions::subscribe_to_fulltext)
        .load(conn)
}

pub fn subscriptions_of_chat(
    conn: &mut PgConnection,
    chat_id: ChatId,
) -> QueryResult<Vec<(Uuid, String)>> {
    subscriptions::table
        .filter(subscriptions::tg_id.eq(DbChatId::from(chat_id)))
        .order(subscriptions::created_at.asc())
        .select((subscriptions::id, subscriptions::subscribe_to_fulltext))
        .load(conn)
}

/// Owners of subscriptions to any of `kladr_codes`.
pub fn subscribers_of(
    conn: &mut PgConnection,
    kladr_codes: &[&str],
) -> QueryResult<Vec<DbChatId>> {
    subscriptions::table
        .filter(
            subscriptions::subscribe_to_kladr.eq_any(kladr_codes.iter().copied()),
        )
        .select(subscriptions::tg_id)
        .load(conn)
}

/// Delete a subscription owned by `chat_id`. Returns the number of deleted
/// rows, zero when the id is unknown or belongs to another chat.
pub fn delete_subscription(
    conn: &mut PgConnection,
    id: Uuid,
    chat_id: ChatId,
) -> QueryResult<usize> {
    diesel::delete(
        subscriptions::table
            .filter(subscriptions::id.eq(id))
            .filter(subscriptions::tg_id.eq(DbChatId::from(chat_id))),
    )
    .execute(conn)
}
