/// Build a url-safe, lower-case slug from a display name.
///
/// Runs of non-alphanumeric characters collapse into a single `-`; leading
/// and trailing separators are trimmed. Catalog rows (shows, episodes,
/// people) are addressed by these slugs, so the output must be stable for a
/// given input.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_sep = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("MinnMax Show"), "minnmax-show");
        assert_eq!(slugify("Leo Plays"), "leo-plays");
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Kyle Hilliard's Top 10 Games"), "kyle-hilliard-s-top-10-games");
        assert_eq!(slugify("Steam's  Secret   Stash"), "steam-s-secret-stash");
    }

    #[test]
    fn slugify_trims_edges() {
        assert_eq!(slugify("  A Fire Inside Out!  "), "a-fire-inside-out");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn slugify_is_stable() {
        let a = slugify("Twilight Highlight Zone");
        let b = slugify("Twilight Highlight Zone");
        assert_eq!(a, b);
    }
}
