use regex::Regex;
use std::sync::LazyLock;

static URL_PARTS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?P<scheme>[a-zA-Z][a-zA-Z0-9+.-]*)://(?:[^@/]*@)?(?P<host>[^/?#]+)").ok());

/// Reduce a URL to `scheme://host/…` so tokens embedded in paths, queries
/// or userinfo never reach a log line.
pub fn redact_url(url: &str) -> String {
    URL_PARTS
        .as_ref()
        .and_then(|re| re.captures(url))
        .map_or_else(
            || "[REDACTED_URL]".to_string(),
            |caps| format!("{}://{}/…", &caps["scheme"], &caps["host"]),
        )
}
