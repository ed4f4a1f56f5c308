//! Presentation collaborators: map, lists, labels, loading indicator and
//! alert banner.
//!
//! The monitor only ever pushes state into a [`Presenter`]; it never reads
//! anything back. [`TerminalPresenter`] renders to stdout, with map draw
//! commands emitted as JSON lines so an external map view can follow them.

use std::io::Write;

use quakewatch_core::alert::AlertPhase;
use quakewatch_core::i18n::{keys, tr};
use quakewatch_core::messages::{self, StaticLabels};
use quakewatch_core::session::SessionView;
use quakewatch_types::{DisplayLists, Language, MapCommand};
use tracing::warn;

/// Receives everything the monitor displays.
///
/// Implementations must return quickly; any slow work belongs in a task
/// the implementation spawns itself.
pub trait Presenter: Send + Sync {
    /// Apply map draw commands in order.
    fn draw(&self, commands: &[MapCommand]);

    /// Replace both event lists.
    fn render_lists(&self, lists: &DisplayLists, language: Language);

    /// Replace the static labels.
    fn render_labels(&self, labels: &StaticLabels);

    /// Show or clear the loading indicator.
    fn set_loading(&self, loading: bool);

    /// Show the alert banner.
    fn show_banner(&self, text: &str);

    /// Hide the alert banner.
    fn hide_banner(&self);

    /// Answer a `status` command.
    fn show_status(&self, view: &SessionView, phase: AlertPhase);
}

/// Holds the loading indicator on for as long as it lives.
pub struct LoadingGuard<'a> {
    presenter: &'a dyn Presenter,
}

impl<'a> LoadingGuard<'a> {
    /// Turn the indicator on.
    pub fn new(presenter: &'a dyn Presenter) -> Self {
        presenter.set_loading(true);
        Self { presenter }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.presenter.set_loading(false);
    }
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// Renders the monitor to standard output.
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl TerminalPresenter {
    fn emit(text: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{text}") {
            warn!(error = %e, "failed to write to terminal");
        }
    }

    /// Both lists under their translated headings, one row per line.
    fn lists_text(lists: &DisplayLists, language: Language) -> String {
        let mut text = format!("== {} ==", tr(keys::PREVIOUS_EARTHQUAKES, language));
        for entry in &lists.history {
            text.push('\n');
            text.push_str(&messages::history_row(entry, language));
        }
        text.push_str(&format!("\n== {} ==", tr(keys::REALTIME_EARTHQUAKES, language)));
        for entry in &lists.realtime {
            text.push('\n');
            text.push_str(&messages::realtime_row(entry, language));
        }
        text
    }
}

impl Presenter for TerminalPresenter {
    fn draw(&self, commands: &[MapCommand]) {
        for command in commands {
            match serde_json::to_string(command) {
                Ok(json) => Self::emit(&format!("[map] {json}")),
                Err(e) => warn!(error = %e, "failed to encode map command"),
            }
        }
    }

    fn render_lists(&self, lists: &DisplayLists, language: Language) {
        Self::emit(&Self::lists_text(lists, language));
    }

    fn render_labels(&self, labels: &StaticLabels) {
        let mut text = format!("# {}\n{}:", labels.title, labels.safety_heading);
        for (i, instruction) in labels.safety.iter().enumerate() {
            text.push_str(&format!("\n  {}. {instruction}", i.saturating_add(1)));
        }
        text.push_str(&format!("\n[notify] {}", labels.notification_toggle));
        Self::emit(&text);
    }

    fn set_loading(&self, loading: bool) {
        if loading {
            Self::emit("... loading");
        }
    }

    fn show_banner(&self, text: &str) {
        Self::emit(&format!("\n{}\n{text}\n{}", "!".repeat(40), "!".repeat(40)));
    }

    fn hide_banner(&self) {
        Self::emit("(alert dismissed)");
    }

    fn show_status(&self, view: &SessionView, phase: AlertPhase) {
        let alert = match phase {
            AlertPhase::Idle => "idle".to_owned(),
            AlertPhase::Active { id, stage } => format!("active {id} ({stage:?})"),
        };
        Self::emit(&format!(
            "location {} | language {} | geolocation {} | notifications {} | alert {alert}",
            view.user_location,
            view.language,
            view.permissions.geolocation,
            view.permissions.notification,
        ));
    }
}
