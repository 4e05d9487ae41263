use std::future::Future;

use crate::error::{AppError, AppResult};

/// Longest base slug kept before the uniqueness suffix is appended.
const MAX_BASE_LEN: usize = 240;

/// Lowercase, hyphenate and strip a display title down to a URL-safe slug.
/// Runs of non-alphanumeric characters collapse into a single hyphen.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug.truncate(MAX_BASE_LEN);
    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Derive a slug from `title` that is unique according to `taken`.
///
/// `taken` is the existence probe, scoped by the caller to the owning
/// entity type (and excluding the record being updated). Collisions get
/// a sequential `-1`, `-2`, ... suffix. A title that normalizes to
/// nothing is rejected: slugs are identifiers, not decoration.
pub async fn unique_slug<F, Fut>(title: &str, taken: F) -> AppResult<String>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    let base = slugify(title);
    if base.is_empty() {
        return Err(AppError::validation(
            "title",
            "title must contain at least one alphanumeric character",
        ));
    }

    if !taken(base.clone()).await? {
        return Ok(base);
    }

    let mut i = 1u32;
    loop {
        let candidate = format!("{base}-{i}");
        if !taken(candidate.clone()).await? {
            return Ok(candidate);
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    fn probe(existing: &RefCell<HashSet<String>>) -> impl Fn(String) -> std::future::Ready<AppResult<bool>> + '_ {
        |candidate| std::future::ready(Ok(existing.borrow().contains(&candidate)))
    }

    #[test]
    fn slugify_normalizes_case_and_punctuation() {
        assert_eq!(slugify("Test Phone"), "test-phone");
        assert_eq!(slugify("  iPhone 15 Pro Max!  "), "iphone-15-pro-max");
        assert_eq!(slugify("A__B--C"), "a-b-c");
    }

    #[test]
    fn slugify_drops_non_ascii() {
        assert_eq!(slugify("Téléphone"), "t-l-phone");
        assert_eq!(slugify("☎☎☎"), "");
    }

    #[tokio::test]
    async fn first_use_returns_base_slug() {
        let existing = RefCell::new(HashSet::new());
        let slug = unique_slug("Test Phone", probe(&existing)).await.unwrap();
        assert_eq!(slug, "test-phone");
    }

    #[tokio::test]
    async fn collisions_get_sequential_suffixes() {
        let existing = RefCell::new(HashSet::from(["test-phone".to_string()]));
        let slug = unique_slug("Test Phone", probe(&existing)).await.unwrap();
        assert_eq!(slug, "test-phone-1");

        existing.borrow_mut().insert("test-phone-1".to_string());
        let slug = unique_slug("Test Phone", probe(&existing)).await.unwrap();
        assert_eq!(slug, "test-phone-2");
    }

    #[tokio::test]
    async fn empty_title_is_rejected() {
        let existing = RefCell::new(HashSet::new());
        let err = unique_slug("   ", probe(&existing)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "title"));
    }
}
