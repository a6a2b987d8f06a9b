//! Static replies for slash commands.

use log::debug;
use strum::{Display, EnumString};

use crate::prompt::BASIC_MODE_NOTICE;

/// Commands the bot answers without calling any provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum Command {
    #[strum(serialize = "/start")]
    Start,
    #[strum(serialize = "/help")]
    Help,
    #[strum(serialize = "/about")]
    About,
}

const START_REPLY: &str = "👋 Привет! Я <b>Мия 1</b> — твой ИИ-ассистент.\n\n\
    Задай мне любой вопрос. Если нужна свежая информация, например погода, новости или курсы валют, \
    я сама поищу её в интернете.\n\n\
    Подробнее: /help";

const HELP_REPLY: &str = "🤖 <b>Вот что я умею:</b>\n\n\
    ✨ Отвечать на вопросы\n\
    🔎 Искать актуальную информацию: погоду, новости, цены\n\
    💡 Помогать с идеями и творчеством\n\n\
    Просто напиши мне, что тебе нужно!\n\n\
    Команды:\n\
    /start — приветствие\n\
    /help — эта справка\n\
    /about — обо мне";

const ABOUT_REPLY: &str = "ℹ️ <b>Мия 1</b> — ИИ-ассистент на базе языковой модели \
    с поиском по интернету.\n\n\
    Я не храню переписку: каждое сообщение обрабатываю отдельно.";

const GREETING_REPLY: &str = "👋 Привет! Я <b>Мия 1</b> — твой ИИ-ассистент. Чем могу быть полезна?";

const MORE_DETAIL_REPLY: &str = "Напиши подробнее, что тебе нужно? 😊";

const GREETING_KEYWORDS: &[&str] = &["привет", "здравствуй", "hello", "hi", "start"];

const HELP_KEYWORDS: &[&str] = &["помощь", "help", "что умеешь", "возможности"];

const UNKNOWN_COMMAND_REPLY: &str = "🤔 Я не знаю такой команды. Список команд: /help";

impl Command {
    /// Parses the first token of a message, ignoring arguments and a `@botname` suffix.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let name = token.split('@').next().unwrap_or(token);
        name.parse().ok()
    }

    pub fn reply(self) -> &'static str {
        match self {
            Command::Start => START_REPLY,
            Command::Help => HELP_REPLY,
            Command::About => ABOUT_REPLY,
        }
    }
}

/// Returns the canned reply for a command message.
pub fn dispatch_command(text: &str) -> &'static str {
    match Command::parse(text) {
        Some(command) => {
            debug!("Dispatching command {command}");
            command.reply()
        }
        None => {
            debug!("Unknown command: {text}");
            UNKNOWN_COMMAND_REPLY
        }
    }
}

/// Canned reply for free text when no completion provider is configured.
///
/// Greetings win over help requests, which win over too-short messages.
pub fn basic_reply(text: &str) -> &'static str {
    let lowered = text.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

    if mentions(GREETING_KEYWORDS) {
        GREETING_REPLY
    } else if mentions(HELP_KEYWORDS) {
        HELP_REPLY
    } else if text.trim().chars().count() < 3 {
        MORE_DETAIL_REPLY
    } else {
        BASIC_MODE_NOTICE
    }
}
