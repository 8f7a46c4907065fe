/// Words that turn a chat message into a dashboard request when files are staged.
pub const DASHBOARD_KEYWORDS: &[&str] = &["dashboard", "chart", "visualization"];

/// Case-insensitive substring match against `DASHBOARD_KEYWORDS`.
///
/// Plain substring test, so "flowchart" or "no dashboard please" also match.
pub fn wants_dashboard(message: &str) -> bool {
    let lower = message.to_lowercase();
    DASHBOARD_KEYWORDS.iter().any(|kw| lower.contains(kw))
}
