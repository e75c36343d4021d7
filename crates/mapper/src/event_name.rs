//! Destination event-name resolution.

use app_events_core::Settings;

/// Longest event name the destination accepts.
pub const MAX_EVENT_NAME_LEN: usize = 40;

/// Resolve the destination event name for a generic track event.
///
/// Applies the settings rename table, replaces every `.` with `_` and
/// truncates to [`MAX_EVENT_NAME_LEN`] characters. Total: never fails.
pub fn resolve_event_name(raw: &str, settings: &Settings) -> String {
    let name = settings.rename_for(raw).unwrap_or(raw);
    name.replace('.', "_")
        .chars()
        .take(MAX_EVENT_NAME_LEN)
        .collect()
}
