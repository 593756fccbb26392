use crate::error::FormatError;
use crate::types::WeatherSnapshot;

pub const SUMMARY_FOOTER: &str = "_Данные о погоде предоставлены OpenWeatherMap._";

/// Render the chat summary for a weather payload.
///
/// Fails on the first missing field instead of rendering a partial summary.
pub fn render_weather_summary(snapshot: &WeatherSnapshot) -> Result<String, FormatError> {
    let name = snapshot
        .name
        .as_deref()
        .ok_or(FormatError::MissingField("name"))?;
    let main = snapshot.main.as_ref();
    let temp = main
        .and_then(|main| main.temp)
        .ok_or(FormatError::MissingField("main.temp"))?;
    let feels_like = main
        .and_then(|main| main.feels_like)
        .ok_or(FormatError::MissingField("main.feels_like"))?;
    let description = snapshot
        .weather
        .first()
        .and_then(|condition| condition.description.as_deref())
        .ok_or(FormatError::MissingField("weather[0].description"))?;
    let humidity = main
        .and_then(|main| main.humidity)
        .ok_or(FormatError::MissingField("main.humidity"))?;
    let wind_speed = snapshot
        .wind
        .as_ref()
        .and_then(|wind| wind.speed)
        .ok_or(FormatError::MissingField("wind.speed"))?;

    Ok(format!(
        "**Погода в городе {name}:**\n\n\
         🌡 Температура: {temp}°C\n\
         🔆 Ощущается как: {feels_like}°C\n\
         ☁️ Погодные условия: {description}\n\
         💧 Влажность: {humidity}%\n\
         💨 Скорость ветра: {wind_speed} м/с\n\n\
         {SUMMARY_FOOTER}"
    ))
}
