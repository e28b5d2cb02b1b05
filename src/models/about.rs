use serde::{Deserialize, Serialize};

use crate::store::{self, Document, Store};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AboutSection {
    pub title: String,
    pub body: String,
}

impl AboutSection {
    fn new(title: &str, body: &str) -> Self {
        AboutSection {
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

/// About-page content (singleton).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AboutPage {
    pub heading: String,
    pub introduction: AboutSection,
    /// Body is one milestone per line.
    pub journey: AboutSection,
    pub approach: AboutSection,
    pub statement: AboutSection,
    pub studio: AboutSection,
}

impl Default for AboutPage {
    fn default() -> Self {
        AboutPage {
            heading: "About the Artist".to_string(),
            introduction: AboutSection::new(
                "Introduction",
                "I am a mixed-media artist exploring color, form and expression.",
            ),
            journey: AboutSection::new(
                "Artistic Journey",
                "Began drawing as a child\nStudied fine art\nOpened my first studio",
            ),
            approach: AboutSection::new(
                "My Approach",
                "I work in layers, letting each piece find its own direction.",
            ),
            statement: AboutSection::new(
                "Artist Statement",
                "Art is how I make sense of the places and people around me.",
            ),
            studio: AboutSection::new(
                "The Studio",
                "A bright, quiet space where larger pieces come to life.",
            ),
        }
    }
}

impl Document for AboutPage {
    const NAME: &'static str = "about";
}

/// Submitted about-page content; every field is optional.
#[derive(Debug, Default, Deserialize, FromForm, Clone)]
pub struct AboutForm {
    pub heading: Option<String>,
    pub introduction_title: Option<String>,
    pub introduction_body: Option<String>,
    pub journey_title: Option<String>,
    pub journey_body: Option<String>,
    pub approach_title: Option<String>,
    pub approach_body: Option<String>,
    pub statement_title: Option<String>,
    pub statement_body: Option<String>,
    pub studio_title: Option<String>,
    pub studio_body: Option<String>,
}

fn set(field: &mut String, value: &Option<String>) {
    if let Some(v) = value {
        *field = v.clone();
    }
}

impl AboutPage {
    /// Section field names, in page order.
    pub const SECTION_KEYS: &'static [&'static str] =
        &["introduction", "journey", "approach", "statement", "studio"];

    pub fn load(store: &dyn Store) -> Self {
        store::load_document(store)
    }

    /// Journey lines with surrounding whitespace and blank lines removed.
    pub fn journey_items(&self) -> Vec<String> {
        self.journey
            .body
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn apply(&mut self, form: &AboutForm) {
        set(&mut self.heading, &form.heading);
        set(&mut self.introduction.title, &form.introduction_title);
        set(&mut self.introduction.body, &form.introduction_body);
        set(&mut self.journey.title, &form.journey_title);
        set(&mut self.journey.body, &form.journey_body);
        set(&mut self.approach.title, &form.approach_title);
        set(&mut self.approach.body, &form.approach_body);
        set(&mut self.statement.title, &form.statement_title);
        set(&mut self.statement.body, &form.statement_body);
        set(&mut self.studio.title, &form.studio_title);
        set(&mut self.studio.body, &form.studio_body);
    }

    pub fn update(store: &dyn Store, form: &AboutForm) -> Result<Self, String> {
        store::modify_document(store, |page: &mut AboutPage| page.apply(form))
    }
}
