use serde::Deserialize;

/// Current-weather payload as returned by the provider.
///
/// Every field is optional here; `render_weather_summary` decides which ones
/// are required.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct WeatherSnapshot {
    pub name: Option<String>,
    pub main: Option<MainReadings>,
    #[serde(default)]
    pub weather: Vec<Condition>,
    pub wind: Option<WindReadings>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MainReadings {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Condition {
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct WindReadings {
    pub speed: Option<f64>,
}
