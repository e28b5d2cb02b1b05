use serde::{Deserialize, Deserializer, Serialize};

use crate::store::{self, Document, Store};

pub const CAROUSEL_TIMER_RANGE: (u32, u32) = (3, 30);
pub const CAROUSEL_TIMER_DEFAULT: u32 = 5;
pub const CAROUSEL_HEIGHT_RANGE: (u32, u32) = (10, 90);
pub const CAROUSEL_HEIGHT_DEFAULT: u32 = 25;

/// Site-wide appearance settings (singleton).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SiteSettings {
    pub background_color: String,
    pub post_color: String,
    pub text_color: String,
    /// Seconds between carousel slides.
    pub carousel_timer: u32,
    /// Carousel height as a percentage of the viewport.
    pub carousel_height: u32,
}

impl Default for SiteSettings {
    fn default() -> Self {
        SiteSettings {
            background_color: "#faf7f2".to_string(),
            post_color: "#ffffff".to_string(),
            text_color: "#2d2d2d".to_string(),
            carousel_timer: CAROUSEL_TIMER_DEFAULT,
            carousel_height: CAROUSEL_HEIGHT_DEFAULT,
        }
    }
}

impl Document for SiteSettings {
    const NAME: &'static str = "settings";
}

/// Submitted settings. Numbers may arrive as JSON numbers or as text.
#[derive(Debug, Default, Deserialize, FromForm, Clone)]
pub struct SettingsForm {
    pub background_color: Option<String>,
    pub post_color: Option<String>,
    pub text_color: Option<String>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub carousel_timer: Option<String>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub carousel_height: Option<String>,
}

fn number_or_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// `value` if it lies within `range` (inclusive), otherwise `default`.
pub fn in_range_or(value: i64, range: (u32, u32), default: u32) -> u32 {
    if value >= range.0 as i64 && value <= range.1 as i64 {
        value as u32
    } else {
        default
    }
}

fn parse_in_range(raw: &str, range: (u32, u32), default: u32) -> u32 {
    raw.trim()
        .parse::<i64>()
        .map(|v| in_range_or(v, range, default))
        .unwrap_or(default)
}

fn set_color(field: &mut String, value: &Option<String>) {
    if let Some(v) = value {
        let v = v.trim();
        if !v.is_empty() {
            *field = v.to_string();
        }
    }
}

impl SiteSettings {
    pub fn load(store: &dyn Store) -> Self {
        let mut settings: SiteSettings = store::load_document(store);
        settings.normalize();
        settings
    }

    /// Pull timer and height back to their defaults when out of range.
    pub fn normalize(&mut self) {
        self.carousel_timer = in_range_or(
            self.carousel_timer as i64,
            CAROUSEL_TIMER_RANGE,
            CAROUSEL_TIMER_DEFAULT,
        );
        self.carousel_height = in_range_or(
            self.carousel_height as i64,
            CAROUSEL_HEIGHT_RANGE,
            CAROUSEL_HEIGHT_DEFAULT,
        );
    }

    /// Apply a submission. Omitted fields keep their current value.
    pub fn apply(&mut self, form: &SettingsForm) {
        set_color(&mut self.background_color, &form.background_color);
        set_color(&mut self.post_color, &form.post_color);
        set_color(&mut self.text_color, &form.text_color);
        if let Some(raw) = &form.carousel_timer {
            self.carousel_timer = parse_in_range(raw, CAROUSEL_TIMER_RANGE, CAROUSEL_TIMER_DEFAULT);
        }
        if let Some(raw) = &form.carousel_height {
            self.carousel_height =
                parse_in_range(raw, CAROUSEL_HEIGHT_RANGE, CAROUSEL_HEIGHT_DEFAULT);
        }
    }

    /// Load, apply and persist a submission; returns the stored settings.
    pub fn update(store: &dyn Store, form: &SettingsForm) -> Result<Self, String> {
        store::modify_document(store, |settings: &mut SiteSettings| {
            settings.normalize();
            settings.apply(form);
        })
    }
}
