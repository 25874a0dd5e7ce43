//! Alert rendering - formats new-poster findings for the delivery channel

use std::collections::BTreeSet;

use crate::model::{Handle, PageKind, PosterId};

/// Format one new-poster alert as delivery-channel HTML.
///
/// The text is the whole message body; the notifier sends it verbatim to
/// every subscriber.
pub fn format_alert(handle: &Handle, kind: PageKind, new_posters: &BTreeSet<PosterId>) -> String {
    let mentions = new_posters
        .iter()
        .map(|poster| format!("@{poster}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "🔔 <b>New posters on @{handle} ({kind} Page)</b>\n\n👤 {count} new user(s):\n{mentions}",
        count = new_posters.len(),
    )
}
