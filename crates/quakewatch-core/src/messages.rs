//! Localised text produced by the pipeline and the dispatcher.

use chrono::{DateTime, Local, Utc};
use quakewatch_types::{HistoryEntry, Language, Permission, RealtimeEntry, TriggeredAlert};

use crate::i18n::{keys, tr};

/// Format an occurrence time in the host's local time zone.
pub fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Alert body shared by the banner and the push notification.
///
/// The ETA line is omitted when the ETA is zero.
pub fn alert_message(alert: &TriggeredAlert, lang: Language) -> String {
    let mut message = format!(
        "⚠️ {} ⚠️\n{}: {}\n{}: {}",
        tr(keys::EARTHQUAKE_ALERT, lang),
        tr(keys::LOCATION, lang),
        alert.place,
        tr(keys::MAGNITUDE, lang),
        alert.magnitude,
    );
    if alert.eta_seconds != 0 {
        message.push_str(&format!(
            "\n{}: {} {}.",
            tr(keys::ESTIMATED_TIME, lang),
            alert.eta_seconds,
            tr(keys::SECONDS, lang),
        ));
    }
    message.push('\n');
    message.push_str(tr(keys::TAKE_PRECAUTIONS, lang));
    message
}

/// Banner text: the alert body followed by the safety instructions.
pub fn banner_text(alert: &TriggeredAlert, lang: Language) -> String {
    let mut text = alert_message(alert, lang);
    text.push_str("\n\n");
    text.push_str(tr(keys::SAFETY_INSTRUCTIONS, lang));
    for instruction in keys::SAFETY_LIST {
        text.push_str("\n  - ");
        text.push_str(tr(instruction, lang));
    }
    text
}

/// Push notification title.
pub fn push_title(lang: Language) -> String {
    tr(keys::EARTHQUAKE_ALERT, lang).to_owned()
}

/// Popup text of an epicenter marker.
pub fn marker_popup(place: &str, magnitude: f64, at: DateTime<Utc>, lang: Language) -> String {
    format!(
        "{}: {place}\n{}: {magnitude}\n{}: {}",
        tr(keys::LOCATION, lang),
        tr(keys::MAGNITUDE, lang),
        tr(keys::TIME, lang),
        local_time(at),
    )
}

/// Popup text of an affected-area circle.
pub fn affected_area_popup(radius_km: f64, lang: Language) -> String {
    format!("{}: {radius_km:.0} km radius", tr(keys::AFFECTED_AREA, lang))
}

/// One history row.
pub fn history_row(entry: &HistoryEntry, lang: Language) -> String {
    format!(
        "{}\n  {}: {}\n  {}: {}",
        entry.place,
        tr(keys::MAGNITUDE, lang),
        entry.magnitude,
        tr(keys::TIME, lang),
        local_time(entry.occurred_at),
    )
}

/// One realtime row, with the ETA and radius annotations it carries.
pub fn realtime_row(entry: &RealtimeEntry, lang: Language) -> String {
    let mut row = format!(
        "{}\n  {}: {}",
        entry.place,
        tr(keys::MAGNITUDE, lang),
        entry.magnitude
    );
    if let Some(eta) = entry.eta_seconds {
        row.push_str(&format!(
            "\n  {}: {eta} {}.",
            tr(keys::ESTIMATED_TIME, lang),
            tr(keys::SECONDS, lang),
        ));
    }
    if entry.user_in_radius {
        row.push_str("\n  ");
        row.push_str(tr(keys::WITHIN_RADIUS, lang));
    }
    row
}

/// Static labels re-rendered on startup, after each snapshot and on every
/// language change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticLabels {
    /// Application title.
    pub title: String,
    /// Safety section heading.
    pub safety_heading: String,
    /// Safety instructions in display order.
    pub safety: Vec<String>,
    /// Notification toggle label for the current permission.
    pub notification_toggle: String,
}

impl StaticLabels {
    /// Render every static label for `lang`.
    pub fn render(lang: Language, notification: Permission) -> Self {
        Self {
            title: tr(keys::TITLE, lang).to_owned(),
            safety_heading: tr(keys::SAFETY_INSTRUCTIONS, lang).to_owned(),
            safety: keys::SAFETY_LIST
                .iter()
                .map(|key| tr(key, lang).to_owned())
                .collect(),
            notification_toggle: toggle_label(notification, lang).to_owned(),
        }
    }
}

/// Label of the notification toggle: "Disable" when granted, else "Enable".
pub fn toggle_label(notification: Permission, lang: Language) -> &'static str {
    if notification == Permission::Granted {
        tr(keys::DISABLE_PUSH, lang)
    } else {
        tr(keys::ENABLE_PUSH, lang)
    }
}
