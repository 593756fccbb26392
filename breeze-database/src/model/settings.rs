/// Longest city name, in characters, accepted for a stored setting.
pub const MAX_CITY_CHARS: usize = 100;

/// A user's stored default city.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSetting {
    pub user_id: u64,
    pub city: Option<String>,
}

impl UserSetting {
    /// Build a setting, trimming the city and treating blank text as "no city".
    pub fn new(user_id: u64, city: Option<&str>) -> Self {
        Self {
            user_id,
            city: city.and_then(normalize_city),
        }
    }
}

/// Trim a city name, returning `None` when nothing is left.
pub fn normalize_city(raw: &str) -> Option<String> {
    let city = raw.trim();
    (!city.is_empty()).then(|| city.to_owned())
}
