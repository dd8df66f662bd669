//! Name substring criterion.

use std::cell::RefCell;
use vista_core::{property, Notifier, PropertyName};

use crate::change::FilterChange;
use crate::criterion::{Criterion, Named};

/// Admits items whose name contains the search text, ignoring case.
#[derive(Default)]
pub struct TextCriterion {
    text: RefCell<String>,
    signals: Notifier<FilterChange>,
}

impl Clone for TextCriterion {
    fn clone(&self) -> Self {
        Self {
            text: RefCell::new(self.text.borrow().clone()),
            signals: Notifier::new(),
        }
    }
}

impl TextCriterion {
    pub fn new() -> Self {
        Self::default()
    }

    /// The normalized (lowercase) search text.
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    /// Replaces the search text.
    ///
    /// Extending the text tightens, shortening it loosens. Any other edit
    /// is `Changed`.
    pub fn set_text(&self, text: &str) -> bool {
        let next = text.to_lowercase();
        let change = {
            let mut current = self.text.borrow_mut();
            if *current == next {
                return false;
            }
            let change = if next.contains(current.as_str()) {
                FilterChange::Tightened
            } else if current.contains(next.as_str()) {
                FilterChange::Loosened
            } else {
                FilterChange::Changed
            };
            *current = next;
            change
        };
        tracing::trace!(criterion = "text", change = change.name(), "criterion updated");
        self.signals.emit(change);
        true
    }
}

impl<T: Named + ?Sized> Criterion<T> for TextCriterion {
    fn kind_name(&self) -> &'static str {
        "text"
    }

    fn filter(&self, item: &T) -> bool {
        let text = self.text.borrow();
        text.is_empty() || item.display_name().to_lowercase().contains(text.as_str())
    }

    fn is_active(&self) -> bool {
        !self.text.borrow().is_empty()
    }

    fn clear_filter(&self) {
        self.text.borrow_mut().clear();
        self.signals.emit(FilterChange::Loosened);
    }

    fn signals(&self) -> &Notifier<FilterChange> {
        &self.signals
    }

    fn watched_properties(&self) -> &'static [PropertyName] {
        &[property::NAME]
    }
}
