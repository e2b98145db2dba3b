//! Slug rules for categorical fields

/// Create a slug from text
///
/// Lowercases, turns whitespace, `/`, `(` and `)` into `_`, drops every other
/// non-alphanumeric character, collapses repeated `_` and trims them from
/// both ends. `"Customer Service / Support"` becomes `customer_service_support`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for c in text.trim().to_lowercase().chars() {
        let separator = c.is_whitespace() || matches!(c, '/' | '(' | ')' | '_');
        if separator {
            if !slug.is_empty() && !slug.ends_with('_') {
                slug.push('_');
            }
        } else if c.is_alphanumeric() {
            slug.push(c);
        }
    }

    while slug.ends_with('_') {
        slug.pop();
    }

    slug
}

/// Format a slug back into a readable label
///
/// `customer_service_support` becomes `Customer Service Support`.
pub fn format_slug(slug: &str) -> String {
    slug.replace(['_', '/', '(', ')'], " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
