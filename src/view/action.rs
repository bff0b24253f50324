//! Action Button State Machine
//!
//! Optimistic UI for interactive controls, independent of any DOM:
//!
//! ```text
//! Idle --begin--> Pending --succeed--> Done            (terminal, absorbing)
//!                         --succeed--> Idle, flipped   (toggle)
//!                         --succeed--> Idle            (repeatable)
//!                         --fail-----> Idle, restored
//! ```
//!
//! Transitions out of `Pending` happen only when a request completes.

use maud::{html, Markup};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

/// What success means for a control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Stays disabled after success ("Join" becomes "Joined")
    Terminal,
    /// Flips its pressed state and re-enables ("Like")
    Toggle,
    /// Re-enables unchanged, for form submits ("Publish")
    Repeatable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonPhase {
    Idle,
    Pending,
    Done,
}

impl ButtonPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonPhase::Idle => "idle",
            ButtonPhase::Pending => "pending",
            ButtonPhase::Done => "done",
        }
    }
}

/// Result of leaving the pending phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Terminal,
    Toggled,
    Repeated,
    Restored,
}

/// Why an activation was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionRejected {
    #[error("action already in flight")]
    InFlight,
    #[error("action already completed")]
    Completed,
    #[error("control is disabled")]
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionButton {
    kind: ActionKind,
    phase: ButtonPhase,
    label: String,
    enabled: bool,
    pressed: bool,
    /// Label to put back if the pending request fails
    restore_label: Option<String>,
}

/// Handle shared between a region and the code that activates the control
pub type SharedButton = Arc<Mutex<ActionButton>>;

impl ActionButton {
    pub fn new(kind: ActionKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            phase: ButtonPhase::Idle,
            label: label.into(),
            enabled: true,
            pressed: false,
            restore_label: None,
        }
    }

    /// A terminal control whose action already happened (e.g. already joined)
    pub fn completed(label: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Terminal,
            phase: ButtonPhase::Done,
            label: label.into(),
            enabled: false,
            pressed: true,
            restore_label: None,
        }
    }

    pub fn toggle(label: impl Into<String>, pressed: bool) -> Self {
        Self {
            pressed,
            ..Self::new(ActionKind::Toggle, label)
        }
    }

    pub fn into_shared(self) -> SharedButton {
        Arc::new(Mutex::new(self))
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn phase(&self) -> ButtonPhase {
        self.phase
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn is_pending(&self) -> bool {
        self.phase == ButtonPhase::Pending
    }

    /// Lock the control for an in-flight request
    pub fn begin(&mut self, pending_label: &str) -> Result<(), ActionRejected> {
        match self.phase {
            ButtonPhase::Pending => return Err(ActionRejected::InFlight),
            ButtonPhase::Done => return Err(ActionRejected::Completed),
            ButtonPhase::Idle if !self.enabled => return Err(ActionRejected::Disabled),
            ButtonPhase::Idle => {}
        }

        self.restore_label = Some(std::mem::replace(&mut self.label, pending_label.to_string()));
        self.enabled = false;
        self.phase = ButtonPhase::Pending;
        Ok(())
    }

    /// The request succeeded. Returns `None` if nothing was pending.
    pub fn succeed(&mut self, label: &str) -> Option<Transition> {
        if self.phase != ButtonPhase::Pending {
            return None;
        }

        self.restore_label = None;
        self.label = label.to_string();

        let transition = match self.kind {
            ActionKind::Terminal => {
                self.phase = ButtonPhase::Done;
                self.pressed = true;
                Transition::Terminal
            }
            ActionKind::Toggle => {
                self.phase = ButtonPhase::Idle;
                self.enabled = true;
                self.pressed = !self.pressed;
                Transition::Toggled
            }
            ActionKind::Repeatable => {
                self.phase = ButtonPhase::Idle;
                self.enabled = true;
                Transition::Repeated
            }
        };
        Some(transition)
    }

    /// The request failed: back to idle with the original label
    pub fn fail(&mut self) -> Option<Transition> {
        if self.phase != ButtonPhase::Pending {
            return None;
        }

        if let Some(label) = self.restore_label.take() {
            self.label = label;
        }
        self.phase = ButtonPhase::Idle;
        self.enabled = true;
        Some(Transition::Restored)
    }

    /// Adopt server-reported state. Only idle controls are touched, so an
    /// in-flight action is never overwritten.
    pub fn reconcile(&mut self, label: impl Into<String>, pressed: bool) -> bool {
        if self.phase != ButtonPhase::Idle {
            return false;
        }
        self.label = label.into();
        self.pressed = pressed;
        true
    }

    /// Mark an idle terminal control as done without a request of its own,
    /// e.g. another control on the page already performed the same action.
    pub fn complete(&mut self, label: impl Into<String>) -> bool {
        if self.kind != ActionKind::Terminal || self.phase != ButtonPhase::Idle {
            return false;
        }
        self.label = label.into();
        self.phase = ButtonPhase::Done;
        self.enabled = false;
        self.pressed = true;
        true
    }

    pub fn render(&self, key: &str, class: &str) -> Markup {
        let class = if self.pressed {
            format!("{} pressed", class)
        } else {
            class.to_string()
        };

        html! {
            button type="button" class=(class) data-action=(key) data-state=(self.phase.as_str()) disabled[!self.enabled] {
                (self.label)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_success_is_absorbing() {
        let mut button = ActionButton::new(ActionKind::Terminal, "Join");

        button.begin("Joining...").unwrap();
        assert!(button.is_pending());
        assert!(!button.is_enabled());
        assert_eq!(button.label(), "Joining...");

        assert_eq!(button.succeed("Joined"), Some(Transition::Terminal));
        assert_eq!(button.phase(), ButtonPhase::Done);
        assert!(!button.is_enabled());
        assert_eq!(button.label(), "Joined");

        assert_eq!(button.begin("Joining..."), Err(ActionRejected::Completed));
        assert_eq!(button.fail(), None);
        assert!(!button.reconcile("Join", false));
        assert_eq!(button.label(), "Joined");
    }

    #[test]
    fn test_failure_restores_original_label() {
        let mut button = ActionButton::new(ActionKind::Terminal, "Join");

        button.begin("Joining...").unwrap();
        assert_eq!(button.fail(), Some(Transition::Restored));
        assert_eq!(button.phase(), ButtonPhase::Idle);
        assert!(button.is_enabled());
        assert_eq!(button.label(), "Join");

        // A new attempt is allowed after failure
        assert!(button.begin("Joining...").is_ok());
    }

    #[test]
    fn test_second_activation_while_pending_is_rejected() {
        let mut button = ActionButton::toggle("10", false);

        button.begin("...").unwrap();
        assert_eq!(button.begin("..."), Err(ActionRejected::InFlight));
        assert_eq!(button.label(), "...");
    }

    #[test]
    fn test_toggle_round_trip() {
        let original = ActionButton::toggle("10", false);
        let mut button = original.clone();

        button.begin("...").unwrap();
        assert_eq!(button.succeed("11"), Some(Transition::Toggled));
        assert!(button.is_pressed());
        assert!(button.is_enabled());

        button.begin("...").unwrap();
        button.succeed("10");
        assert_eq!(button, original);
    }

    #[test]
    fn test_repeatable_keeps_pressed_state() {
        let mut button = ActionButton::new(ActionKind::Repeatable, "Publish");

        button.begin("Publishing...").unwrap();
        assert_eq!(button.succeed("Publish"), Some(Transition::Repeated));
        assert!(!button.is_pressed());
        assert!(button.is_enabled());
        assert_eq!(button.phase(), ButtonPhase::Idle);
    }

    #[test]
    fn test_reconcile_skips_pending() {
        let mut button = ActionButton::toggle("3", false);
        button.begin("...").unwrap();
        assert!(!button.reconcile("4", true));

        button.succeed("4");
        assert!(button.reconcile("7", false));
        assert_eq!(button.label(), "7");
        assert!(!button.is_pressed());
    }

    #[test]
    fn test_complete_only_idle_terminal() {
        let mut pending = ActionButton::new(ActionKind::Terminal, "Join");
        pending.begin("Joining...").unwrap();
        assert!(!pending.complete("Joined"));

        let mut toggle = ActionButton::toggle("1", false);
        assert!(!toggle.complete("Joined"));

        let mut idle = ActionButton::new(ActionKind::Terminal, "Join");
        assert!(idle.complete("Joined"));
        assert_eq!(idle, ActionButton::completed("Joined"));
    }

    #[test]
    fn test_completed_button() {
        let button = ActionButton::completed("Joined");
        assert_eq!(button.phase(), ButtonPhase::Done);
        assert!(!button.is_enabled());

        let html = button.render("join:1", "join-btn").into_string();
        assert!(html.contains("disabled"));
        assert!(html.contains("join-btn pressed"));
        assert!(html.contains(">Joined</button>"));
    }

    #[test]
    fn test_render_escapes_label() {
        let button = ActionButton::new(ActionKind::Repeatable, "<b>Save</b>");
        let html = button.render("save", "btn").into_string();
        assert!(html.contains("&lt;b&gt;Save&lt;/b&gt;"));
        assert!(!html.contains("disabled"));
    }
}
