//! Subscription management: `/subscribe`, `/list`, `/delete` and the inline
//! keyboard callbacks they produce.
//!
//! Handlers first decide on a reply against a [`SubscriptionStore`], then send
//! it with the bot.

use std::sync::Arc;

use anyhow::Result;
use itertools::Itertools as _;
use teloxide::prelude::*;
use teloxide::types::InlineKeyboardMarkup;
use uuid::Uuid;

use crate::common::{BotEnv, UpdateHandler};
use crate::db::{self, DbPool};
use crate::metrics::{Metrics, SubscriptionOutcome};
use crate::utils::{
    single_column_keyboard, AddressApiError, AddressCandidate, BotExt,
    KladrInfo, ParsedAddress, ResultExt as _,
};

const USAGE_TEXT: &str = "Пожалуйста, передайте с командой адрес в формате \
    «/subscribe город улица». Подписка может быть только на всю улицу, или на \
    весь город. Подписки на отдельные дома планируются.";
const REQUEST_ERROR_TEXT: &str = "Ошибка при запросе к API адресов.";
const DECODE_ERROR_TEXT: &str = "Ошибка при разборе ответа от API адресов.";
const NOT_FOUND_TEXT: &str = "Такой адрес не найден.";
const NO_CANDIDATES_TEXT: &str =
    "По указанному запросу не найдено ни одного адреса.";
const CHOOSE_TEXT: &str =
    "Найдено несколько адресов, пожалуйста, выберите один:";
const NO_SUBSCRIPTIONS_TEXT: &str = "У вас нет подписок.";
const CHOOSE_DELETE_TEXT: &str = "Выберите подписку для удаления:";
const NOTHING_TO_DELETE_TEXT: &str = "У вас нет подписок для удаления.";
const SUBSCRIBED_TOAST: &str = "Подписка оформлена!";
const DELETED_TEXT: &str = "Подписка успешно удалена.";

fn subscribed_text(full_address: &str) -> String {
    format!("Подписка на {full_address} успешно оформлена.")
}

pub trait SubscriptionStore {
    fn insert(&self, chat_id: ChatId, kladr: &str, full_address: &str)
        -> Result<Uuid>;
    /// Display addresses, oldest first.
    fn addresses(&self, chat_id: ChatId) -> Result<Vec<String>>;
    /// Ids with display addresses, oldest first.
    fn list(&self, chat_id: ChatId) -> Result<Vec<(Uuid, String)>>;
    /// Number of deleted rows; zero for a foreign or missing id.
    fn delete(&self, id: Uuid, chat_id: ChatId) -> Result<usize>;
}

impl SubscriptionStore for DbPool {
    fn insert(
        &self,
        chat_id: ChatId,
        kladr: &str,
        full_address: &str,
    ) -> Result<Uuid> {
        db::with_conn(self, |conn| {
            db::insert_subscription(conn, chat_id, kladr, full_address)
        })
    }

    fn addresses(&self, chat_id: ChatId) -> Result<Vec<String>> {
        db::with_conn(self, |conn| db::subscription_addresses(conn, chat_id))
    }

    fn list(&self, chat_id: ChatId) -> Result<Vec<(Uuid, String)>> {
        db::with_conn(self, |conn| db::subscriptions_of_chat(conn, chat_id))
    }

    fn delete(&self, id: Uuid, chat_id: ChatId) -> Result<usize> {
        db::with_conn(self, |conn| db::delete_subscription(conn, id, chat_id))
    }
}

/// A message to send in reply to a command.
#[derive(Debug, Clone)]
struct Reply {
    text: String,
    keyboard: Option<InlineKeyboardMarkup>,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), keyboard: None }
    }
}

/// Sent after a keyboard button was handled: the keyboard is removed, `text`
/// is posted to its chat and the callback is answered with `toast`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CallbackReply {
    text: String,
    toast: Option<&'static str>,
}

pub fn callback_handler() -> UpdateHandler {
    dptree::filter_map(filter_callbacks).endpoint(handle_callback)
}

/// What to do with the answer of the address API.
#[derive(Debug, PartialEq, Eq)]
enum SubscribePlan {
    Fail(&'static str),
    Subscribe(AddressCandidate),
    Choose(Vec<AddressCandidate>),
}

fn subscribe_plan(
    parsed: Result<ParsedAddress, AddressApiError>,
) -> SubscribePlan {
    match parsed {
        Err(AddressApiError::Decode(e)) => {
            log::error!("Error decoding address API response: {e}");
            SubscribePlan::Fail(DECODE_ERROR_TEXT)
        }
        Err(e) => {
            log::error!("Error requesting address API: {e}");
            SubscribePlan::Fail(REQUEST_ERROR_TEXT)
        }
        Ok(ParsedAddress::NotFound(status)) => {
            log::info!("Address API answered {status}");
            SubscribePlan::Fail(NOT_FOUND_TEXT)
        }
        Ok(ParsedAddress::Found(mut candidates)) => match candidates.len() {
            0 => SubscribePlan::Fail(NO_CANDIDATES_TEXT),
            1 => SubscribePlan::Subscribe(candidates.remove(0)),
            _ => SubscribePlan::Choose(candidates),
        },
    }
}

/// `None` when the subscription could not be stored.
fn subscribe_reply(
    store: &impl SubscriptionStore,
    metrics: &Metrics,
    chat_id: ChatId,
    parsed: Result<ParsedAddress, AddressApiError>,
) -> Option<Reply> {
    match subscribe_plan(parsed) {
        SubscribePlan::Fail(text) => {
            metrics.record_subscription(SubscriptionOutcome::Failure);
            Some(Reply::text(text))
        }
        SubscribePlan::Subscribe(candidate) => {
            let inserted = store
                .insert(chat_id, &candidate.kladr, &candidate.full_address)
                .log_ok("Error inserting subscription");
            if inserted.is_none() {
                metrics.record_subscription(SubscriptionOutcome::Failure);
                return None;
            }
            metrics.record_subscription(SubscriptionOutcome::Success);
            Some(Reply::text(subscribed_text(&candidate.full_address)))
        }
        SubscribePlan::Choose(candidates) => Some(Reply {
            text: CHOOSE_TEXT.to_string(),
            keyboard: Some(address_keyboard(&candidates)),
        }),
    }
}

fn list_text(addresses: &[String]) -> String {
    if addresses.is_empty() {
        return NO_SUBSCRIPTIONS_TEXT.to_string();
    }
    format!("Ваши подписки:\n{}", addresses.iter().join("\n"))
}

fn list_reply(store: &impl SubscriptionStore, chat_id: ChatId) -> Option<Reply> {
    let addresses = store
        .addresses(chat_id)
        .log_ok("Error listing subscriptions")?;
    Some(Reply::text(list_text(&addresses)))
}

fn delete_menu_reply(
    store: &impl SubscriptionStore,
    chat_id: ChatId,
) -> Option<Reply> {
    let subscriptions =
        store.list(chat_id).log_ok("Error listing subscriptions")?;
    if subscriptions.is_empty() {
        return Some(Reply::text(NOTHING_TO_DELETE_TEXT));
    }
    Some(Reply {
        text: CHOOSE_DELETE_TEXT.to_string(),
        keyboard: Some(delete_keyboard(&subscriptions)),
    })
}

async fn send_reply(
    bot: &Bot,
    chat_id: ChatId,
    reply: Option<Reply>,
) -> Result<()> {
    let Some(reply) = reply else {
        return Ok(());
    };
    let request = bot.send_message(chat_id, reply.text);
    match reply.keyboard {
        Some(keyboard) => request.reply_markup(keyboard).await?,
        None => request.await?,
    };
    Ok(())
}

pub async fn cmd_subscribe(
    bot: Bot,
    env: Arc<BotEnv>,
    msg: Message,
    address: String,
) -> Result<()> {
    let reply = if address.is_empty() {
        Some(Reply::text(USAGE_TEXT))
    } else {
        let parsed = env.address_api.parse(&address).await;
        subscribe_reply(&env.pool, &env.metrics, msg.chat.id, parsed)
    };
    send_reply(&bot, msg.chat.id, reply).await
}

pub async fn cmd_list(bot: Bot, env: Arc<BotEnv>, msg: Message) -> Result<()> {
    send_reply(&bot, msg.chat.id, list_reply(&env.pool, msg.chat.id)).await
}

pub async fn cmd_delete(
    bot: Bot,
    env: Arc<BotEnv>,
    msg: Message,
) -> Result<()> {
    let reply = delete_menu_reply(&env.pool, msg.chat.id);
    send_reply(&bot, msg.chat.id, reply).await
}

fn address_keyboard(candidates: &[AddressCandidate]) -> InlineKeyboardMarkup {
    single_column_keyboard(candidates.iter().map(|c| {
        (c.full_address.clone(), CallbackData::Subscribe(c.kladr.clone()).encode())
    }))
}

fn delete_keyboard(subscriptions: &[(Uuid, String)]) -> InlineKeyboardMarkup {
    single_column_keyboard(subscriptions.iter().map(|(id, address)| {
        (address.clone(), CallbackData::Delete(*id).encode())
    }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CallbackData {
    /// `s:{kladr}`
    Subscribe(String),
    /// `d:{subscription id}`
    Delete(Uuid),
}

impl CallbackData {
    fn encode(&self) -> String {
        match self {
            Self::Subscribe(kladr) => format!("s:{kladr}"),
            Self::Delete(id) => format!("d:{id}"),
        }
    }

    fn parse(data: &str) -> Option<Self> {
        let (prefix, payload) = (data.get(..2)?, data.get(2..)?);
        match prefix {
            "s:" => Some(Self::Subscribe(payload.to_string())),
            "d:" => Uuid::parse_str(payload)
                .map(Self::Delete)
                .log_ok(&format!("Bad subscription id {payload:?}")),
            _ => None,
        }
    }
}

fn filter_callbacks(callback: CallbackQuery) -> Option<CallbackData> {
    CallbackData::parse(callback.data.as_deref()?)
}

/// The subscription belongs to whoever pressed the button.
fn confirm_subscription(
    store: &impl SubscriptionStore,
    metrics: &Metrics,
    presser: ChatId,
    kladr: &str,
    info: Result<KladrInfo, AddressApiError>,
) -> Option<CallbackReply> {
    let info = info.log_ok(&format!("Error looking up KLADR {kladr}"))?;
    let inserted = store
        .insert(presser, kladr, &info.full_address)
        .log_ok("Error inserting subscription");
    if inserted.is_none() {
        metrics.record_subscription(SubscriptionOutcome::Failure);
        return None;
    }
    metrics.record_subscription(SubscriptionOutcome::Success);
    Some(CallbackReply {
        text: subscribed_text(&info.full_address),
        toast: Some(SUBSCRIBED_TOAST),
    })
}

fn confirm_deletion(
    store: &impl SubscriptionStore,
    presser: ChatId,
    id: Uuid,
) -> Option<CallbackReply> {
    let deleted = store
        .delete(id, presser)
        .log_ok("Error deleting subscription")?;
    if deleted == 0 {
        log::info!("Subscription {id} of {} is already gone", presser.0);
    }
    Some(CallbackReply { text: DELETED_TEXT.to_string(), toast: None })
}

async fn answer_callback(
    bot: &Bot,
    callback: &CallbackQuery,
    reply: Option<CallbackReply>,
) -> Result<()> {
    let Some(reply) = reply else {
        return Ok(());
    };
    if let Some(message) = &callback.message {
        bot.remove_reply_markup(message)
            .await
            .log_ok("Error removing keyboard");
        bot.send_message(message.chat.id, reply.text).await?;
    }
    let answer = bot.answer_callback_query(&callback.id);
    match reply.toast {
        Some(toast) => answer.text(toast).await?,
        None => answer.await?,
    };
    Ok(())
}

async fn handle_callback(
    bot: Bot,
    env: Arc<BotEnv>,
    callback: CallbackQuery,
    data: CallbackData,
) -> Result<()> {
    let presser = ChatId::from(callback.from.id);
    let reply = match data {
        CallbackData::Subscribe(kladr) => {
            let info = env.address_api.kladr(&kladr).await;
            confirm_subscription(&env.pool, &env.metrics, presser, &kladr, info)
        }
        CallbackData::Delete(id) => confirm_deletion(&env.pool, presser, id),
    };
    answer_callback(&bot, &callback, reply).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;

    #[derive(Default)]
    struct FakeStore {
        rows: Mutex<Vec<(Uuid, ChatId, String, String)>>,
        broken: bool,
    }

    impl FakeStore {
        fn with_row(chat_id: ChatId, full_address: &str) -> (Self, Uuid) {
            let store = Self::default();
            let id = store.insert(chat_id, "66", full_address).unwrap();
            (store, id)
        }

        fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    impl SubscriptionStore for FakeStore {
        fn insert(
            &self,
            chat_id: ChatId,
            kladr: &str,
            full_address: &str,
        ) -> Result<Uuid> {
            if self.broken {
                anyhow::bail!("database is down");
            }
            let id = Uuid::new_v4();
            self.rows.lock().unwrap().push((
                id,
                chat_id,
                kladr.to_string(),
                full_address.to_string(),
            ));
            Ok(id)
        }

        fn addresses(&self, chat_id: ChatId) -> Result<Vec<String>> {
            Ok(self.list(chat_id)?.into_iter().map(|(_, a)| a).collect())
        }

        fn list(&self, chat_id: ChatId) -> Result<Vec<(Uuid, String)>> {
            if self.broken {
                anyhow::bail!("database is down");
            }
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|row| row.1 == chat_id)
                .map(|row| (row.0, row.3.clone()))
                .collect())
        }

        fn delete(&self, id: Uuid, chat_id: ChatId) -> Result<usize> {
            if self.broken {
                anyhow::bail!("database is down");
            }
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| !(row.0 == id && row.1 == chat_id));
            Ok(before - rows.len())
        }
    }

    fn subscriptions_total(metrics: &Metrics, status: &str) -> f64 {
        let series = format!("subscriptions_total{{status=\"{status}\"}} ");
        metrics
            .render()
            .lines()
            .find_map(|line| line.strip_prefix(series.as_str())?.trim().parse().ok())
            .unwrap_or_default()
    }

    fn counters(metrics: &Metrics) -> (f64, f64) {
        (
            subscriptions_total(metrics, "success"),
            subscriptions_total(metrics, "failure"),
        )
    }

    fn lookup_error() -> AddressApiError {
        AddressApiError::Url(url::ParseError::EmptyHost)
    }

    fn candidate(kladr: &str, full_address: &str) -> AddressCandidate {
        AddressCandidate {
            kladr: kladr.to_string(),
            full_address: full_address.to_string(),
        }
    }

    #[test]
    fn test_subscribe_plan() {
        assert_eq!(
            subscribe_plan(Ok(ParsedAddress::Found(vec![]))),
            SubscribePlan::Fail(NO_CANDIDATES_TEXT)
        );
        assert_eq!(
            subscribe_plan(Ok(ParsedAddress::Found(vec![candidate(
                "6600000100000",
                "г. Тирасполь"
            )]))),
            SubscribePlan::Subscribe(candidate("6600000100000", "г. Тирасполь"))
        );
        let many = vec![
            candidate("66000001000001", "г. Тирасполь, ул. Ленина"),
            candidate("66000002000001", "г. Бендеры, ул. Ленина"),
        ];
        assert_eq!(
            subscribe_plan(Ok(ParsedAddress::Found(many.clone()))),
            SubscribePlan::Choose(many)
        );
        assert_eq!(
            subscribe_plan(Ok(ParsedAddress::NotFound(
                reqwest::StatusCode::NOT_FOUND
            ))),
            SubscribePlan::Fail(NOT_FOUND_TEXT)
        );
        assert_eq!(
            subscribe_plan(Err(AddressApiError::Url(
                url::ParseError::EmptyHost
            ))),
            SubscribePlan::Fail(REQUEST_ERROR_TEXT)
        );
    }

    #[test]
    fn test_subscribed_text() {
        assert_eq!(
            subscribed_text("г. Тирасполь, ул. Ленина"),
            "Подписка на г. Тирасполь, ул. Ленина успешно оформлена."
        );
    }

    #[test]
    fn test_list_text() {
        assert_eq!(list_text(&[]), "У вас нет подписок.");
        assert_eq!(
            list_text(&["г. Тирасполь".to_string(), "г. Бендеры".to_string()]),
            "Ваши подписки:\nг. Тирасполь\nг. Бендеры"
        );
    }

    #[test]
    fn test_callback_data() {
        let id = Uuid::new_v4();
        assert_eq!(
            CallbackData::parse("s:6600000100000"),
            Some(CallbackData::Subscribe("6600000100000".to_string()))
        );
        assert_eq!(
            CallbackData::parse(&format!("d:{id}")),
            Some(CallbackData::Delete(id))
        );
        assert_eq!(CallbackData::parse("d:not-a-uuid"), None);
        assert_eq!(CallbackData::parse("x:whatever"), None);
        assert_eq!(CallbackData::parse("s"), None);
        assert_eq!(CallbackData::parse(""), None);
        assert_eq!(CallbackData::parse("ё"), None);

        for data in [CallbackData::Subscribe("66".to_string()), CallbackData::Delete(id)] {
            assert_eq!(CallbackData::parse(&data.encode()), Some(data));
        }
    }

    #[test]
    fn test_keyboards() {
        let keyboard = address_keyboard(&[
            candidate("66000001000001", "г. Тирасполь, ул. Ленина"),
            candidate("66000002000001", "г. Бендеры, ул. Ленина"),
        ]);
        let button = &keyboard.inline_keyboard[1][0];
        assert_eq!(button.text, "г. Бендеры, ул. Ленина");
        assert_eq!(
            button.kind,
            InlineKeyboardButtonKind::CallbackData("s:66000002000001".to_string())
        );

        let id = Uuid::new_v4();
        let keyboard = delete_keyboard(&[(id, "г. Тирасполь".to_string())]);
        assert_eq!(keyboard.inline_keyboard.len(), 1);
        assert_eq!(keyboard.inline_keyboard[0][0].text, "г. Тирасполь");
        assert_eq!(
            keyboard.inline_keyboard[0][0].kind,
            InlineKeyboardButtonKind::CallbackData(format!("d:{id}"))
        );
        // Telegram limits callback data to 64 bytes.
        assert!(CallbackData::Delete(id).encode().len() <= 64);
    }

    #[test]
    fn test_single_candidate_is_stored() {
        let (store, metrics) = (FakeStore::default(), Metrics::new("test"));
        let reply = subscribe_reply(
            &store,
            &metrics,
            ChatId(7),
            Ok(ParsedAddress::Found(vec![candidate("66001", "г. Тирасполь")])),
        )
        .unwrap();

        assert_eq!(reply.text, "Подписка на г. Тирасполь успешно оформлена.");
        assert!(reply.keyboard.is_none());
        assert_eq!(store.list(ChatId(7)).unwrap().len(), 1);
        assert_eq!(store.rows.lock().unwrap()[0].2, "66001");
        assert_eq!(counters(&metrics), (1.0, 0.0));
    }

    #[test]
    fn test_failed_lookups_are_counted() {
        let (store, metrics) = (FakeStore::default(), Metrics::new("test"));
        for (parsed, text) in [
            (Ok(ParsedAddress::Found(vec![])), NO_CANDIDATES_TEXT),
            (
                Ok(ParsedAddress::NotFound(reqwest::StatusCode::NOT_FOUND)),
                NOT_FOUND_TEXT,
            ),
            (Err(lookup_error()), REQUEST_ERROR_TEXT),
        ] {
            let reply =
                subscribe_reply(&store, &metrics, ChatId(7), parsed).unwrap();
            assert_eq!(reply.text, text);
        }
        assert_eq!(store.len(), 0);
        assert_eq!(counters(&metrics), (0.0, 3.0));
    }

    #[test]
    fn test_several_candidates_offer_a_choice() {
        let (store, metrics) = (FakeStore::default(), Metrics::new("test"));
        let reply = subscribe_reply(
            &store,
            &metrics,
            ChatId(7),
            Ok(ParsedAddress::Found(vec![
                candidate("66001", "г. Тирасполь, ул. Ленина"),
                candidate("66002", "г. Бендеры, ул. Ленина"),
            ])),
        )
        .unwrap();

        assert_eq!(reply.text, CHOOSE_TEXT);
        assert_eq!(reply.keyboard.unwrap().inline_keyboard.len(), 2);
        assert_eq!(store.len(), 0);
        assert_eq!(counters(&metrics), (0.0, 0.0));
    }

    #[test]
    fn test_insert_failure_is_silent_and_counted() {
        let store = FakeStore { broken: true, ..Default::default() };
        let metrics = Metrics::new("test");
        let reply = subscribe_reply(
            &store,
            &metrics,
            ChatId(7),
            Ok(ParsedAddress::Found(vec![candidate("66001", "г. Тирасполь")])),
        );
        assert!(reply.is_none());
        assert_eq!(counters(&metrics), (0.0, 1.0));
    }

    #[test]
    fn test_list_and_delete_menu() {
        let store = FakeStore::default();
        assert_eq!(list_reply(&store, ChatId(1)).unwrap().text, NO_SUBSCRIPTIONS_TEXT);
        assert_eq!(
            delete_menu_reply(&store, ChatId(1)).unwrap().text,
            NOTHING_TO_DELETE_TEXT
        );

        store.insert(ChatId(1), "66001", "г. Тирасполь").unwrap();
        store.insert(ChatId(2), "66002", "г. Бендеры").unwrap();
        assert_eq!(
            list_reply(&store, ChatId(1)).unwrap().text,
            "Ваши подписки:\nг. Тирасполь"
        );
        let menu = delete_menu_reply(&store, ChatId(1)).unwrap();
        assert_eq!(menu.text, CHOOSE_DELETE_TEXT);
        assert_eq!(menu.keyboard.unwrap().inline_keyboard.len(), 1);

        let broken = FakeStore { broken: true, ..Default::default() };
        assert!(list_reply(&broken, ChatId(1)).is_none());
        assert!(delete_menu_reply(&broken, ChatId(1)).is_none());
    }

    #[test]
    fn test_confirm_subscription_for_presser() {
        let (store, metrics) = (FakeStore::default(), Metrics::new("test"));
        let reply = confirm_subscription(
            &store,
            &metrics,
            ChatId(42),
            "66001",
            Ok(KladrInfo { full_address: "г. Тирасполь".to_string() }),
        );
        assert_eq!(
            reply,
            Some(CallbackReply {
                text: "Подписка на г. Тирасполь успешно оформлена.".to_string(),
                toast: Some(SUBSCRIBED_TOAST),
            })
        );
        assert_eq!(store.addresses(ChatId(42)).unwrap(), vec!["г. Тирасполь"]);
        assert_eq!(counters(&metrics), (1.0, 0.0));
    }

    #[test]
    fn test_confirm_subscription_failures() {
        let (store, metrics) = (FakeStore::default(), Metrics::new("test"));
        let reply =
            confirm_subscription(&store, &metrics, ChatId(42), "66001", Err(lookup_error()));
        assert_eq!(reply, None);
        assert_eq!(store.len(), 0);
        assert_eq!(counters(&metrics), (0.0, 0.0));

        let broken = FakeStore { broken: true, ..Default::default() };
        let reply = confirm_subscription(
            &broken,
            &metrics,
            ChatId(42),
            "66001",
            Ok(KladrInfo { full_address: "г. Тирасполь".to_string() }),
        );
        assert_eq!(reply, None);
        assert_eq!(counters(&metrics), (0.0, 1.0));
    }

    #[test]
    fn test_confirm_deletion() {
        let deleted = Some(CallbackReply {
            text: DELETED_TEXT.to_string(),
            toast: None,
        });

        let (store, id) = FakeStore::with_row(ChatId(1), "г. Тирасполь");
        // Someone else's subscription stays, the reply is the same.
        assert_eq!(confirm_deletion(&store, ChatId(2), id), deleted);
        assert_eq!(store.len(), 1);

        assert_eq!(confirm_deletion(&store, ChatId(1), id), deleted);
        assert_eq!(store.len(), 0);
        // Already gone.
        assert_eq!(confirm_deletion(&store, ChatId(1), id), deleted);

        let broken = FakeStore { broken: true, ..Default::default() };
        assert_eq!(confirm_deletion(&broken, ChatId(1), id), None);
    }

    #[test]
    fn test_handlers_build() {
        let _handler = callback_handler();
    }
}
