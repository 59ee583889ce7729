use teloxide::payloads;
use teloxide::prelude::*;
use teloxide::requests::JsonRequest;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub trait BotExt {
    /// Strip the inline keyboard from a message once a button was used.
    fn remove_reply_markup(
        &self,
        msg: &Message,
    ) -> JsonRequest<payloads::EditMessageReplyMarkup>;
}

impl BotExt for Bot {
    fn remove_reply_markup(
        &self,
        msg: &Message,
    ) -> JsonRequest<payloads::EditMessageReplyMarkup> {
        self.edit_message_reply_markup(msg.chat.id, msg.id)
            .reply_markup(InlineKeyboardMarkup::default())
    }
}

/// A keyboard with a single callback button per row.
pub fn single_column_keyboard(
    buttons: impl IntoIterator<Item = (String, String)>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        buttons
            .into_iter()
            .map(|(label, data)| vec![InlineKeyboardButton::callback(label, data)]),
    )
}
