//! View Layer
//!
//! A DOM-free model of what each page shows:
//!
//! - `Region`: a container replaced wholesale on every render
//! - `ActionButton`: optimistic per-control state machine
//! - `NotificationCenter`: transient, auto-dismissing messages
//! - `ViewController`: fetch, render, act and reconcile against the API

pub mod action;
pub mod controller;
pub mod notify;
pub mod region;
pub mod render;

pub use action::{ActionButton, ActionKind, ActionRejected, ButtonPhase, SharedButton, Transition};
pub use controller::{
    render_collection, ActionLabels, ActionOutcome, ActionRequest, LoadOutcome, ViewController,
};
pub use notify::{Notification, NotificationCenter, NotificationKind, NotificationPhase};
pub use region::{Card, Control, CountFormat, Region, RegionState};
