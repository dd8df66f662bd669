//! Timeline configuration.

use vista_core::Granularity;

/// Options controlling how a timeline lays out its display.
///
/// # Example
///
/// ```rust
/// use vista_core::Granularity;
/// use vista_timeline::TimelineOptions;
///
/// let options = TimelineOptions::new().with_finest(Granularity::Month);
/// assert_eq!(options.levels(), vec![Granularity::Year, Granularity::Month]);
/// assert!(TimelineOptions::new().with_labels(false).levels().is_empty());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimelineOptions {
    /// Insert bucket labels between items.
    pub labels: bool,
    /// The finest label granularity emitted.
    pub finest: Granularity,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            labels: true,
            finest: Granularity::Day,
        }
    }
}

impl TimelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels(mut self, labels: bool) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_finest(mut self, finest: Granularity) -> Self {
        self.finest = finest;
        self
    }

    /// Label levels in effect, coarsest first. Empty when labels are off.
    pub fn levels(&self) -> Vec<Granularity> {
        if !self.labels {
            return Vec::new();
        }
        Granularity::down_to(self.finest).collect()
    }
}
