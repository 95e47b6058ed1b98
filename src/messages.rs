//! Operator-facing message texts

use crate::config::UserId;
use crate::probe::ProbeReport;

pub const OUTAGE_ALERT: &str = "Увага! Сервіс недоступний на двох поспіль перевірках.";

pub const RECOVERY_STARTED: &str = "Запускаю скрипт відновлення, зачекайте...";
pub const RECOVERY_SUCCEEDED: &str = "Сервер було оживлено. Все в порядку!";
pub const STILL_DOWN: &str = "Сервіс все ще недоступний, продовжую перевірку.";

pub const NOT_PERMITTED: &str = "У вас немає прав на виконання цієї команди.";
pub const UNKNOWN_COMMAND: &str = "Невідома команда. Надішліть /help, щоб побачити список команд.";

pub const HELP: &str = "Я стежу за доступністю сервісу і повідомляю, якщо він впав.\n\n\
/help - ця довідка\n\
/mysecretid - показати ваш ID\n\
/status - поточний стан сервісу (лише для адміністраторів)\n\
/revive або «оживити» - запустити скрипт відновлення (лише для адміністраторів)";

pub fn launch_failed(error: &impl std::fmt::Display) -> String {
    format!("Помилка запуску скрипту: {}", error)
}

pub fn your_id(user: UserId) -> String {
    format!("Ваш ID: {}", user)
}

pub fn status_report(known_down: bool, live: &ProbeReport) -> String {
    let known = if known_down {
        "підтверджено недоступність, сповіщення надіслано"
    } else {
        "працює"
    };
    let now = match (live.is_up(), live.detail.as_deref()) {
        (true, _) => "сервіс доступний ✅".to_string(),
        (false, Some(detail)) => format!("сервіс недоступний ❌ ({})", detail),
        (false, None) => "сервіс недоступний ❌".to_string(),
    };
    format!("Останній відомий стан: {}\nПеревірка зараз: {}", known, now)
}
