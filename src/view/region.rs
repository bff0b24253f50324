//! View Regions
//!
//! A region is a container the page fills with cards. Every update
//! replaces the whole region: cards, bound controls and placeholder go
//! together, and the generation counter moves forward.

use maud::{html, Markup};
use std::collections::BTreeMap;

use super::action::{ActionButton, SharedButton};
use super::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionState {
    Blank,
    Loading,
    Items(usize),
    Empty,
    Error,
}

impl RegionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionState::Blank => "blank",
            RegionState::Loading => "loading",
            RegionState::Items(_) => "items",
            RegionState::Empty => "empty",
            RegionState::Error => "error",
        }
    }
}

/// An action button attached to a card
#[derive(Debug, Clone)]
pub struct Control {
    pub key: String,
    pub class: &'static str,
    pub button: SharedButton,
}

/// One rendered item: static markup plus its live controls
#[derive(Debug, Clone)]
pub struct Card {
    pub class: &'static str,
    pub key: String,
    pub body: Markup,
    pub controls: Vec<Control>,
}

impl Card {
    pub fn new(class: &'static str, key: impl Into<String>, body: Markup) -> Self {
        Self {
            class,
            key: key.into(),
            body,
            controls: Vec::new(),
        }
    }

    pub fn control(mut self, key: impl Into<String>, class: &'static str, button: ActionButton) -> Self {
        self.controls.push(Control {
            key: key.into(),
            class,
            button: button.into_shared(),
        });
        self
    }
}

/// How a region's count label reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountFormat {
    /// "1 member", "3 members"
    Noun {
        singular: &'static str,
        plural: &'static str,
    },
    /// "(3)"
    Parenthesized,
}

impl CountFormat {
    pub fn format(&self, count: u64) -> String {
        match self {
            CountFormat::Noun { singular, plural } => render::plural(count, singular, plural),
            CountFormat::Parenthesized => format!("({})", count),
        }
    }
}

#[derive(Debug)]
pub struct Region {
    name: &'static str,
    state: RegionState,
    cards: Vec<Card>,
    /// Keys are unique within a region
    controls: BTreeMap<String, SharedButton>,
    placeholder: Markup,
    skeletons: usize,
    count_format: Option<CountFormat>,
    count: Option<u64>,
    generation: u64,
}

impl Region {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: RegionState::Blank,
            cards: Vec::new(),
            controls: BTreeMap::new(),
            placeholder: html! {},
            skeletons: 3,
            count_format: None,
            count: None,
            generation: 0,
        }
    }

    pub fn with_count(mut self, format: CountFormat) -> Self {
        self.count_format = Some(format);
        self
    }

    /// Number of skeleton cards shown while loading
    pub fn with_skeletons(mut self, skeletons: usize) -> Self {
        self.skeletons = skeletons;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> RegionState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn button(&self, key: &str) -> Option<SharedButton> {
        self.controls.get(key).cloned()
    }

    pub fn control_keys(&self) -> impl Iterator<Item = &str> {
        self.controls.keys().map(String::as_str)
    }

    pub fn count(&self) -> Option<u64> {
        self.count
    }

    pub fn count_text(&self) -> Option<String> {
        match (self.count_format, self.count) {
            (Some(format), Some(count)) => Some(format.format(count)),
            _ => None,
        }
    }

    pub fn set_count(&mut self, count: u64) {
        if self.count_format.is_some() {
            self.count = Some(count);
        }
    }

    fn replace(&mut self, state: RegionState, cards: Vec<Card>, placeholder: Markup) {
        self.controls = cards
            .iter()
            .flat_map(|card| card.controls.iter())
            .map(|control| (control.key.clone(), control.button.clone()))
            .collect();
        self.cards = cards;
        self.placeholder = placeholder;
        self.state = state;
        self.generation += 1;
    }

    pub fn show_loading(&mut self) {
        let placeholder = render::loading(self.skeletons);
        self.replace(RegionState::Loading, Vec::new(), placeholder);
    }

    pub fn show_cards(&mut self, cards: Vec<Card>) {
        let state = RegionState::Items(cards.len());
        self.replace(state, cards, html! {});
    }

    pub fn show_empty(&mut self, markup: Markup) {
        self.replace(RegionState::Empty, Vec::new(), markup);
    }

    pub fn show_error(&mut self, markup: Markup) {
        self.replace(RegionState::Error, Vec::new(), markup);
    }

    pub fn clear(&mut self) {
        self.replace(RegionState::Blank, Vec::new(), html! {});
        self.count = None;
    }

    pub fn html(&self) -> Markup {
        html! {
            section.region data-region=(self.name) data-state=(self.state.as_str()) {
                @if let Some(count) = self.count_text() {
                    span.count { (count) }
                }
                @if self.cards.is_empty() {
                    (self.placeholder)
                } @else {
                    @for card in &self.cards {
                        div class=(card.class) data-key=(card.key) {
                            (card.body)
                            @if !card.controls.is_empty() {
                                div.card-actions {
                                    @for control in &card.controls {
                                        (control.button.lock().render(&control.key, control.class))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
