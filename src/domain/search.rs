use super::types::ListedSession;

/// Name that placeholder rows carry on the server; never offered as a match.
pub const SENTINEL_SESSION_NAME: &str = "sessionname";

/// Prefix match on the trimmed, lower-cased name. Exact matches are excluded so
/// the list only offers completions of what was typed.
pub fn session_name_matches(name: &str, query: &str) -> bool {
    let name = name.trim().to_lowercase();
    let query = query.to_lowercase();
    name.starts_with(&query) && name != query && name != SENTINEL_SESSION_NAME
}

/// Indices into `sessions` to display for `query`, in fetch order.
pub fn filter_session_indices(sessions: &[ListedSession], query: &str) -> Vec<usize> {
    if query.trim().is_empty() {
        return (0..sessions.len()).collect();
    }

    sessions
        .iter()
        .enumerate()
        .filter_map(|(index, session)| session_name_matches(&session.name, query).then_some(index))
        .collect()
}
