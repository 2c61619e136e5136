use crate::models::ShortUrl;

use super::Collection;

/// Local mirror of the account's shortened URLs, keyed by slug
pub type UrlStore = Collection<ShortUrl>;

impl Collection<ShortUrl> {
    /// Rename the entry currently known as `slug`
    pub fn update_slug(&self, slug: &str, new_slug: &str) -> bool {
        self.update(slug, |url| url.slug = new_slug.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short(slug: &str) -> ShortUrl {
        ShortUrl {
            key: "owner-key".into(),
            url: format!("https://example.com/{slug}"),
            created_at: String::new(),
            ip: String::new(),
            slug: slug.into(),
            clicks: 0,
        }
    }

    #[test]
    fn update_slug_renames_only_that_entry() {
        let store = UrlStore::new();
        store.set(vec![short("one"), short("two")]);

        assert!(store.update_slug("one", "uno"));

        let slugs: Vec<_> = store.snapshot().into_iter().map(|u| u.slug).collect();
        assert_eq!(slugs, vec!["uno", "two"]);
        assert!(store.get("one").is_none());
        assert_eq!(store.get("uno").unwrap().url, "https://example.com/one");
    }

    #[test]
    fn update_slug_of_unknown_entry_changes_nothing() {
        let store = UrlStore::new();
        store.set(vec![short("one")]);

        assert!(!store.update_slug("nope", "x"));
        assert_eq!(store.snapshot(), vec![short("one")]);
    }
}
