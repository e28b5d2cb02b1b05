use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{set_if_some, ImageChange};
use crate::media::StoredMedia;
use crate::store::{self, Record, Store};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Post {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Publication date as entered, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, FromForm, Clone)]
pub struct PostForm {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
    pub image_position: Option<String>,
}

impl Record for Post {
    const COLLECTION: &'static str = "posts";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Post {
    /// Parsed publication date; `None` when absent or not `YYYY-MM-DD`.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
    }

    /// Markdown content rendered to HTML.
    pub fn content_html(&self) -> String {
        let source = self.content.as_deref().unwrap_or("");
        let parser = pulldown_cmark::Parser::new(source);
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, parser);
        html
    }

    /// All posts, newest `date` first. Posts without a readable date go last.
    pub fn list(store: &dyn Store) -> Vec<Self> {
        let mut posts: Vec<Post> = store::load(store);
        posts.sort_by(|a, b| {
            b.parsed_date()
                .cmp(&a.parsed_date())
                .then_with(|| b.id.cmp(&a.id))
        });
        posts
    }

    pub fn recent(store: &dyn Store, limit: usize) -> Vec<Self> {
        let mut posts = Self::list(store);
        posts.truncate(limit);
        posts
    }

    pub fn count(store: &dyn Store) -> usize {
        store::load::<Post>(store).len()
    }

    pub fn find_by_id(store: &dyn Store, id: i64) -> Option<Self> {
        store::load::<Post>(store).into_iter().find(|p| p.id == id)
    }

    pub fn create(
        store: &dyn Store,
        form: &PostForm,
        image: Option<StoredMedia>,
    ) -> Result<Self, String> {
        store::modify(store, |posts: &mut Vec<Post>| {
            let post = Post {
                id: store::next_id(posts),
                title: form.title.clone(),
                content: form.content.clone(),
                date: form.date.clone(),
                image: image.map(|m| m.reference),
                image_position: form.image_position.clone(),
                created_at: Some(Utc::now()),
                updated_at: None,
            };
            posts.push(post.clone());
            Ok(post)
        })
    }

    /// Update supplied fields and apply the image change.
    /// Returns `None` for an unknown id, otherwise the updated post and the
    /// file it no longer references (to be deleted by the caller).
    pub fn update(
        store: &dyn Store,
        id: i64,
        form: &PostForm,
        image: ImageChange,
    ) -> Result<Option<(Self, Option<StoredMedia>)>, String> {
        store::modify(store, |posts: &mut Vec<Post>| {
            let post = match posts.iter_mut().find(|p| p.id == id) {
                Some(p) => p,
                None => return Ok(None),
            };
            set_if_some(&mut post.title, &form.title);
            set_if_some(&mut post.content, &form.content);
            set_if_some(&mut post.date, &form.date);
            set_if_some(&mut post.image_position, &form.image_position);
            let discarded = image.apply(&mut post.image);
            post.updated_at = Some(Utc::now());
            Ok(Some((post.clone(), discarded)))
        })
    }

    /// Remove a post. Returns the removed post, or `None` if it did not exist.
    pub fn delete(store: &dyn Store, id: i64) -> Result<Option<Self>, String> {
        store::modify(store, |posts: &mut Vec<Post>| {
            let removed = posts.iter().position(|p| p.id == id).map(|i| posts.remove(i));
            Ok(removed)
        })
    }

    /// Files this post owns.
    pub fn owned_media(&self) -> Vec<StoredMedia> {
        self.image
            .iter()
            .map(|r| StoredMedia::from_reference(r))
            .collect()
    }

    /// Posts written to a fresh install.
    pub fn samples() -> Vec<Self> {
        let sample = |id: i64, title: &str, content: &str, date: &str| Post {
            id,
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            date: Some(date.to_string()),
            image: None,
            image_position: None,
            created_at: None,
            updated_at: None,
        };
        vec![
            sample(
                1,
                "Welcome to My Art Site",
                "This is my first post! I'm excited to share my artwork and thoughts with you.",
                "2025-01-15",
            ),
            sample(
                2,
                "New Series: Abstract Landscapes",
                "I've been working on a new series exploring abstract interpretations of natural landscapes. Using mixed media and bold colors to capture the essence of places I've visited.",
                "2025-01-20",
            ),
            sample(
                3,
                "Studio Update",
                "Just finished setting up my new studio space. The natural lighting is perfect for working on larger pieces. Can't wait to see what emerges from this creative environment.",
                "2025-02-01",
            ),
        ]
    }
}
