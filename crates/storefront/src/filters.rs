//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Stylesheet content hash computed by `build.rs`, for cache busting.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Unit count with the Portuguese noun: `1 item`, `3 itens`.
///
/// Usage in templates: `{{ cart.item_count|itens }}`
#[askama::filter_fn]
pub fn itens(count: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(item_label(&count))
}

fn item_label(count: &impl Display) -> String {
    let count = count.to_string();
    if count == "1" {
        "1 item".to_owned()
    } else {
        format!("{count} itens")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_label_singular() {
        assert_eq!(item_label(&1), "1 item");
    }

    #[test]
    fn test_item_label_plural() {
        assert_eq!(item_label(&0), "0 itens");
        assert_eq!(item_label(&3), "3 itens");
    }
}
