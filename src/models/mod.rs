pub mod about;
pub mod commission;
pub mod gallery;
pub mod link;
pub mod post;
pub mod settings;

use crate::media::StoredMedia;

/// What a form submission asks to do with a record's image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageChange {
    Keep,
    Replace(StoredMedia),
    Remove,
}

impl ImageChange {
    /// Build from an optional new upload and a remove flag. A new file wins
    /// over the flag.
    pub fn from_parts(new_file: Option<StoredMedia>, remove: bool) -> Self {
        match (new_file, remove) {
            (Some(media), _) => ImageChange::Replace(media),
            (None, true) => ImageChange::Remove,
            (None, false) => ImageChange::Keep,
        }
    }

    /// Apply to a reference field. Returns the file that is no longer referenced.
    pub(crate) fn apply(self, image: &mut Option<String>) -> Option<StoredMedia> {
        match self {
            ImageChange::Keep => None,
            ImageChange::Replace(media) => image
                .replace(media.reference)
                .map(|old| StoredMedia::from_reference(&old)),
            ImageChange::Remove => image.take().map(|old| StoredMedia::from_reference(&old)),
        }
    }
}

/// Overwrite `field` only when the form supplied a value.
pub(crate) fn set_if_some<T: Clone>(field: &mut Option<T>, value: &Option<T>) {
    if let Some(v) = value {
        *field = Some(v.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        let m = StoredMedia::local("1.png");
        assert_eq!(
            ImageChange::from_parts(Some(m.clone()), true),
            ImageChange::Replace(m)
        );
        assert_eq!(ImageChange::from_parts(None, true), ImageChange::Remove);
        assert_eq!(ImageChange::from_parts(None, false), ImageChange::Keep);
    }

    #[test]
    fn test_apply() {
        let mut image = Some("old.png".to_string());
        assert_eq!(ImageChange::Keep.apply(&mut image), None);
        assert_eq!(image.as_deref(), Some("old.png"));

        let replaced = ImageChange::Replace(StoredMedia::local("new.png")).apply(&mut image);
        assert_eq!(replaced, Some(StoredMedia::local("old.png")));
        assert_eq!(image.as_deref(), Some("new.png"));

        let removed = ImageChange::Remove.apply(&mut image);
        assert_eq!(removed, Some(StoredMedia::local("new.png")));
        assert_eq!(image, None);

        assert_eq!(ImageChange::Remove.apply(&mut image), None);
    }
}
