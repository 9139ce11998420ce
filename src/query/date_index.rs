use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static DATE_TEMPLATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([^<>{}]*)\{now/d\{yyyy\.MM\.dd\}\}>$").expect("invalid regex"));

/// Resolve a daily date-math index name (`<prefix{now/d{yyyy.MM.dd}}>`) to today's concrete index.
///
/// Returns `None` for anything that is not exactly that template shape.
#[must_use]
pub fn resolve_date_template(index: &str, now: DateTime<Utc>) -> Option<String> {
    let captures = DATE_TEMPLATE_REGEX.captures(index)?;
    let prefix = captures.get(1)?.as_str();
    Some(format!("{prefix}{}", now.format("%Y.%m.%d")))
}
