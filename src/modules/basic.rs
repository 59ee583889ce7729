use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, Me};
use teloxide::utils::command::{BotCommands, ParseError};

use crate::common::{BotEnv, UpdateHandler};
use crate::modules::subscriptions;

const WELCOME_TEXT: &str = "Приветствую! Тут вы можете подписаться на \
    события по отключению коммунальных услуг в ПМР. Учтите, что это не \
    официальный источник информации и мы можем совершать ошибки. Если \
    хотите быть 100% уверены в информации, лучше следите отдельно за каждым \
    поставщиком информации. Начните свой путь с подписки на интересующий вас \
    адрес командой /subscribe и далее адрес в формате город улица";
const UNKNOWN_COMMAND_TEXT: &str =
    "Неизвестная команда. Доступные команды: /subscribe, /list, /delete";

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
enum Command {
    Start,
    #[command(parse_with = parse_address)]
    Subscribe(String),
    List,
    Delete,
}

#[allow(clippy::unnecessary_wraps)]
fn parse_address(input: String) -> Result<(String,), ParseError> {
    Ok((input.trim().to_string(),))
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ParsedCommand {
    Known(Command),
    Unknown,
}

/// Commands shown in the Telegram menu.
pub fn menu() -> Vec<BotCommand> {
    vec![
        BotCommand::new("subscribe", "Подписаться на адрес"),
        BotCommand::new("list", "Показать все подписки"),
        BotCommand::new("delete", "Удалить подписку"),
    ]
}

pub fn command_handler() -> UpdateHandler {
    dptree::filter_map(filter_command).endpoint(handle_command)
}

fn filter_command(msg: Message, me: Me) -> Option<ParsedCommand> {
    parse_command(msg.text()?, me.user.username.as_deref().unwrap_or_default())
}

/// Non-commands and commands addressed to other bots yield `None`.
fn parse_command(text: &str, bot_name: &str) -> Option<ParsedCommand> {
    if !text.starts_with('/') {
        return None;
    }
    match Command::parse(text, bot_name) {
        Ok(command) => Some(ParsedCommand::Known(command)),
        Err(ParseError::WrongBotName(_)) => None,
        Err(e) => {
            log::debug!("Unknown command {text:?}: {e}");
            Some(ParsedCommand::Unknown)
        }
    }
}

async fn handle_command(
    bot: Bot,
    env: Arc<BotEnv>,
    msg: Message,
    command: ParsedCommand,
) -> Result<()> {
    match command {
        ParsedCommand::Known(Command::Start) => {
            bot.send_message(msg.chat.id, WELCOME_TEXT).await?;
        }
        ParsedCommand::Known(Command::Subscribe(address)) => {
            subscriptions::cmd_subscribe(bot, env, msg, address).await?;
        }
        ParsedCommand::Known(Command::List) => {
            subscriptions::cmd_list(bot, env, msg).await?;
        }
        ParsedCommand::Known(Command::Delete) => {
            subscriptions::cmd_delete(bot, env, msg).await?;
        }
        ParsedCommand::Unknown => {
            bot.send_message(msg.chat.id, UNKNOWN_COMMAND_TEXT).await?;
        }
    }
    Ok(())
}
