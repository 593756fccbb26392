//! User-facing reply texts.

use std::fmt::Display;

pub const GREETING: &str = "Привет! Я бот погоды. Используйте команду /weather <город> для получения информации о погоде.";

pub const WEATHER_CITY_REQUIRED: &str = "Пожалуйста, укажите город или установите его по умолчанию используя команду\n/setcity <город>.";

pub const SETCITY_USAGE: &str = "Пожалуйста, укажите город. Пример использования:\n/setcity Москва";

pub const CITY_TOO_LONG: &str = "Название города слишком длинное. Максимум 100 символов.";

pub const CITY_CLEARED: &str = "Ваш город по умолчанию был удалён.";

pub const NO_CITY_STORED: &str = "У вас нет сохранённого города.";

/// Fallback shown when a slash command fails outside the dispatcher.
pub const COMMAND_FAILED: &str = "Что-то пошло не так при выполнении команды.";

pub fn city_saved(city: &str) -> String {
    format!("Город по умолчанию установлен на: {city}")
}

pub fn weather_failed(reason: &dyn Display) -> String {
    format!("Извините, произошла ошибка при получении информации о погоде:\n{reason}")
}

pub fn setcity_failed(reason: &dyn Display) -> String {
    format!("Произошла ошибка при установке города: {reason}")
}

pub fn clearcity_failed(reason: &dyn Display) -> String {
    format!("Произошла ошибка при удалении города: {reason}")
}
