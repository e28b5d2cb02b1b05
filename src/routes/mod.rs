pub mod admin;
pub mod api;
pub mod auth;
pub mod public;

use serde_json::{json, Value};

use crate::models::settings::SiteSettings;
use crate::store::Store;

/// Values every rendered page needs: the appearance settings and the
/// derived CSS variables.
pub(crate) fn page_base(store: &dyn Store) -> Value {
    let settings = SiteSettings::load(store);
    json!({
        "settings": settings,
        "theme_css": theme_css(&settings),
    })
}

/// Merge `extra` into the page base. Keys in `extra` win.
pub(crate) fn page_context(store: &dyn Store, extra: Value) -> Value {
    let mut context = page_base(store);
    if let (Some(base), Value::Object(extra)) = (context.as_object_mut(), extra) {
        for (k, v) in extra {
            base.insert(k, v);
        }
    }
    context
}

fn theme_css(settings: &SiteSettings) -> String {
    format!(
        ":root {{ --background-color: {}; --post-color: {}; --text-color: {}; --carousel-height: {}vh; }}",
        css_value(&settings.background_color),
        css_value(&settings.post_color),
        css_value(&settings.text_color),
        settings.carousel_height,
    )
}

/// Strip characters that could close the declaration or the style block.
fn css_value(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>' | '"' | '\''))
        .collect()
}
