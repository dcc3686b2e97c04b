//! Localized bot texts (hu / en / ru)

use chrono::{Datelike, NaiveDate};
use shared::Language;

/// Fixed bot replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    Usage,
    NotFound,
    ErrorGeneric,
    PauseFail,
    ResumeOk,
    ResumeFail,
    StopConfirm,
    StopDone,
    LangInvalid,
}

pub fn message(lang: Language, key: MessageKey) -> &'static str {
    use Language::*;
    use MessageKey::*;

    match (lang, key) {
        (Hungarian, Usage) => "Írd be így: „Szeged holnap” vagy „Debrecen ma”.\nParancsok: /pause 48, /resume, /stop, /lang hu",
        (English, Usage) => "Type like: \"London tomorrow\" or \"Paris today\".\nCommands: /pause 48, /resume, /stop, /lang en",
        (Russian, Usage) => "Напиши так: «Москва завтра» или «Будапешт сегодня».\nКоманды: /pause 48, /resume, /stop, /lang ru",

        (Hungarian, NotFound) => "Nem találtam ilyen települést. Próbáld pontosabban / ékezetekkel.",
        (English, NotFound) => "I couldn't find that place. Please try more precisely / with accents.",
        (Russian, NotFound) => "Не нашёл такой населённый пункт. Попробуй точнее / с правильными буквами.",

        (Hungarian, ErrorGeneric) => "Bocsi, valami hiba történt. Jelentettük, nézem!",
        (English, ErrorGeneric) => "Sorry, something went wrong. I've logged it.",
        (Russian, ErrorGeneric) => "Извини, что-то пошло не так. Я уже сообщил об ошибке.",

        (Hungarian, PauseFail) => "Nem sikerült beállítani a felfüggesztést.",
        (English, PauseFail) => "Failed to set pause.",
        (Russian, PauseFail) => "Не удалось включить паузу.",

        (Hungarian, ResumeOk) => "▶️ Felfüggesztés feloldva. Ismét küldünk push értesítéseket.",
        (English, ResumeOk) => "▶️ Pause removed. We will send push notifications again.",
        (Russian, ResumeOk) => "▶️ Пауза снята. Снова отправляем уведомления.",

        (Hungarian, ResumeFail) => "Nem sikerült feloldani a felfüggesztést.",
        (English, ResumeFail) => "Failed to remove pause.",
        (Russian, ResumeFail) => "Не удалось снять паузу.",

        (Hungarian, StopConfirm) => "Biztos vagy benne, hogy törölni akarod az adataidat?\nHa igen, írd be újra: /stop",
        (English, StopConfirm) => "Are you sure you want to delete all your data?\nIf yes, type /stop again.",
        (Russian, StopConfirm) => "Ты уверен, что хочешь удалить свои данные?\nЕсли да — набери /stop ещё раз.",

        (Hungarian, StopDone) => "✅ Minden adatodat töröltük. Sajnálom, hogy elmész! Bármikor visszatérhetsz a /start paranccsal.",
        (English, StopDone) => "✅ All your data has been deleted. Sorry to see you go! You can come back anytime with /start.",
        (Russian, StopDone) => "✅ Все твои данные удалены. Мне жаль, что ты уходишь! В любой момент можно вернуться с /start.",

        (Hungarian, LangInvalid) => "Ismert nyelvek: hu, en, ru. Használat: /lang hu",
        (English, LangInvalid) => "Supported languages: hu, en, ru. Usage: /lang en",
        (Russian, LangInvalid) => "Поддерживаемые языки: hu, en, ru. Пример: /lang ru",
    }
}

pub const WELCOME: &str = "Üdv a Milyen idő lesz holnap? világában! 🌤️\n\
    Mostantól neked is van egy személyre szabott időjárás-előrejelződ.\n\n\
    Írd meg, hogyan szólíthatlak, aztán felmérem, hogy mire van igényed, \
    hogy személyre szabottan tudjak segíteni neked.";

pub const ASK_NAME_AGAIN: &str = "Kérlek, írj be egy valódi nevet (2–50 karakter között).";

pub fn name_saved(name: &str) -> String {
    format!(
        "Köszönöm, {}! 🌞\nMost már küldhetsz várost (pl. „Pécs holnap”).",
        name
    )
}

pub fn welcome_back(lang: Language, name: &str) -> String {
    format!("Üdv újra, {}! 🌤️\n{}", name, message(lang, MessageKey::Usage))
}

pub fn pause_set(lang: Language, hours: i64, until: &str) -> String {
    match lang {
        Language::Hungarian => format!(
            "⏸️ A push értesítéseket felfüggesztettem {} órára (eddig: {}).\nBármikor vissza: /resume",
            hours, until
        ),
        Language::English => format!(
            "⏸️ Push notifications paused for {} hours (until: {}).\nUse /resume to turn them back on.",
            hours, until
        ),
        Language::Russian => format!(
            "⏸️ Push-уведомления приостановлены на {} ч (до: {}).\nВернуть: /resume",
            hours, until
        ),
    }
}

pub fn lang_set(lang: Language) -> String {
    match lang {
        Language::Hungarian => format!("✅ Alap nyelv mostantól: {}.", lang.native_name()),
        Language::English => format!("✅ Default language is now: {}.", lang.native_name()),
        Language::Russian => format!("✅ Язык по умолчанию теперь: {}.", lang.native_name()),
    }
}

pub fn current_language(lang: Language, current: Language) -> String {
    match lang {
        Language::Hungarian => format!(
            "Jelenlegi alapnyelv: {}.\nÁtváltás: /lang hu | /lang en | /lang ru",
            current.native_name()
        ),
        Language::English => format!(
            "Current default language: {}.\nChange with: /lang hu | /lang en | /lang ru",
            current.native_name()
        ),
        Language::Russian => format!(
            "Текущий язык по умолчанию: {}.\nСменить: /lang hu | /lang en | /lang ru",
            current.native_name()
        ),
    }
}

/// Appended to a forecast reply while pushes are paused
pub fn paused_note(lang: Language, until: &str) -> String {
    match lang {
        Language::Hungarian => format!(
            "\n\n⏸️ Megjegyzés: a push értesítéseid {}-ig fel vannak függesztve. (/resume)",
            until
        ),
        Language::English => format!(
            "\n\n⏸️ Note: your push notifications are paused until {}. (/resume)",
            until
        ),
        Language::Russian => format!(
            "\n\n⏸️ Замечание: push-уведомления приостановлены до {}. (/resume)",
            until
        ),
    }
}

const WEEKDAYS_HU: [&str; 7] = ["hétfő", "kedd", "szerda", "csütörtök", "péntek", "szombat", "vasárnap"];
const WEEKDAYS_EN: [&str; 7] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];
const WEEKDAYS_RU: [&str; 7] = [
    "понедельник",
    "вторник",
    "среда",
    "четверг",
    "пятница",
    "суббота",
    "воскресенье",
];

pub fn weekday_name(lang: Language, date: NaiveDate) -> &'static str {
    let index = date.weekday().num_days_from_monday() as usize;
    match lang {
        Language::Hungarian => WEEKDAYS_HU[index],
        Language::English => WEEKDAYS_EN[index],
        Language::Russian => WEEKDAYS_RU[index],
    }
}

/// Reply language: explicit choice, then the place's country language, then
/// the chat client's language, then Hungarian
pub fn decide_language(
    preferred: Option<Language>,
    country_default: Option<Language>,
    interface: Option<&str>,
) -> Language {
    preferred
        .or(country_default)
        .or_else(|| interface.and_then(Language::from_code))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_language_order() {
        assert_eq!(
            decide_language(Some(Language::Russian), Some(Language::English), Some("hu")),
            Language::Russian
        );
        assert_eq!(
            decide_language(None, Some(Language::English), Some("ru")),
            Language::English
        );
        assert_eq!(decide_language(None, None, Some("ru-RU")), Language::Russian);
        assert_eq!(decide_language(None, None, Some("de")), Language::Hungarian);
        assert_eq!(decide_language(None, None, None), Language::Hungarian);
    }

    #[test]
    fn test_weekday_names() {
        let monday = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        assert_eq!(weekday_name(Language::Hungarian, monday), "hétfő");
        assert_eq!(weekday_name(Language::English, monday), "Monday");
        assert_eq!(weekday_name(Language::Russian, monday), "понедельник");
    }

    #[test]
    fn test_every_message_is_translated() {
        let keys = [
            MessageKey::Usage,
            MessageKey::NotFound,
            MessageKey::ErrorGeneric,
            MessageKey::PauseFail,
            MessageKey::ResumeOk,
            MessageKey::ResumeFail,
            MessageKey::StopConfirm,
            MessageKey::StopDone,
            MessageKey::LangInvalid,
        ];
        for lang in Language::ALL {
            for key in keys {
                assert!(!message(lang, key).is_empty());
            }
        }
    }
}
