//! WMO weather code table.
//!
//! Maps the numeric codes reported by Open-Meteo to a condition label and to
//! the widget icon index. Icon indices follow the classic condition-icon
//! numbering used by widget icon packs (e.g. 32 = sunny, 31 = clear night).
//! See: https://open-meteo.com/en/docs#weathervariables

/// Icon index for codes without an icon
pub const ICON_UNKNOWN: i32 = -1;

/// Weather conditions known to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    ClearSky,
    MostlyClear,
    PartlyCloudy,
    Cloudy,
    Fog,
    LightDrizzle,
    ModerateDrizzle,
    HeavyDrizzle,
    FreezingDrizzle,
    HeavyFreezingDrizzle,
    LightRain,
    Rain,
    HeavyRain,
    LightShowers,
    ModerateShowers,
    HeavyShowers,
    LightSnow,
    HeavySnow,
    Thunderstorm,
    ThunderstormHail,
    ThunderstormHeavyHail,
}

impl Condition {
    /// Convert a WMO weather code; `None` for codes outside the table
    pub fn from_wmo_code(code: i32) -> Option<Self> {
        let condition = match code {
            0 => Self::ClearSky,
            1 => Self::MostlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 => Self::LightDrizzle,
            53 => Self::ModerateDrizzle,
            55 => Self::HeavyDrizzle,
            56 => Self::FreezingDrizzle,
            57 => Self::HeavyFreezingDrizzle,
            61 => Self::LightRain,
            63 => Self::Rain,
            65 => Self::HeavyRain,
            80 => Self::LightShowers,
            81 => Self::ModerateShowers,
            82 => Self::HeavyShowers,
            85 => Self::LightSnow,
            86 => Self::HeavySnow,
            95 => Self::Thunderstorm,
            96 => Self::ThunderstormHail,
            99 => Self::ThunderstormHeavyHail,
            _ => return None,
        };
        Some(condition)
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::ClearSky => "Clear Sky",
            Self::MostlyClear => "Mostly Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Foggy",
            Self::LightDrizzle => "Light Drizzle",
            Self::ModerateDrizzle => "Moderate Drizzle",
            Self::HeavyDrizzle => "Heavy Drizzle",
            Self::FreezingDrizzle => "Freezing Drizzle",
            Self::HeavyFreezingDrizzle => "Heavy Freezing Drizzle",
            Self::LightRain => "Light Rain",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::LightShowers => "Light Showers",
            Self::ModerateShowers => "Moderate Showers",
            Self::HeavyShowers => "Heavy Showers",
            Self::LightSnow => "Light Snow",
            Self::HeavySnow => "Heavy Snow",
            Self::Thunderstorm => "Thunderstorms",
            Self::ThunderstormHail => "Thunderstorms and Hail",
            Self::ThunderstormHeavyHail => "Thunderstorms and Heavy Hail",
        }
    }

    /// Icon index; only the sky-cover conditions differ between day and night
    pub fn icon_code(self, is_day: bool) -> i32 {
        match self {
            Self::Thunderstorm | Self::ThunderstormHail | Self::ThunderstormHeavyHail => 4,
            Self::LightSnow => 14,
            Self::HeavySnow => 41,
            Self::LightDrizzle
            | Self::ModerateDrizzle
            | Self::HeavyDrizzle
            | Self::FreezingDrizzle
            | Self::HeavyFreezingDrizzle => 9,
            Self::LightRain | Self::Rain | Self::LightShowers | Self::ModerateShowers => 11,
            Self::HeavyRain | Self::HeavyShowers => 12,
            Self::Fog => 20,
            Self::ClearSky => day_night(is_day, 32, 31),
            Self::MostlyClear => day_night(is_day, 34, 33),
            Self::PartlyCloudy => day_night(is_day, 28, 27),
            Self::Cloudy => day_night(is_day, 30, 29),
        }
    }
}

fn day_night(is_day: bool, day: i32, night: i32) -> i32 {
    if is_day {
        day
    } else {
        night
    }
}

/// Label for a WMO code. Codes outside the table get the clear-sky label.
pub fn label_for(code: i32) -> &'static str {
    Condition::from_wmo_code(code)
        .unwrap_or(Condition::ClearSky)
        .label()
}

/// Icon index for a WMO code, or [`ICON_UNKNOWN`] for codes outside the table.
pub fn icon_for(code: i32, is_day: bool) -> i32 {
    Condition::from_wmo_code(code)
        .map(|c| c.icon_code(is_day))
        .unwrap_or(ICON_UNKNOWN)
}
