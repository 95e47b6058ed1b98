pub mod telegram;

pub use telegram::{invocation_from_update, keyboard_markup, TelegramClient, UpdatePoller};
