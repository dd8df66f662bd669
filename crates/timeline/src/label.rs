//! Bucket labels and display entries.

use std::fmt;
use vista_core::{Dated, Granularity, Identity, ItemId, Timestamp};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A synthetic Year, Month or Day boundary marker.
///
/// The label's timestamp is the bucket itself: the timestamp of the first
/// item in the bucket truncated to the label's granularity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Label {
    granularity: Granularity,
    timestamp: Timestamp,
}

impl Label {
    /// The label of the `granularity` bucket containing `ts`.
    pub fn new(granularity: Granularity, ts: Timestamp) -> Self {
        Self {
            granularity,
            timestamp: ts.bucket(granularity),
        }
    }

    #[inline]
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// True if `ts` falls in this label's bucket.
    #[inline]
    pub fn contains(&self, ts: &Timestamp) -> bool {
        ts.bucket(self.granularity) == self.timestamp
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granularity {
            Granularity::Year => write!(f, "{}", self.timestamp.year_value()),
            Granularity::Month => {
                let month = self.timestamp.month_value() as usize;
                f.write_str(MONTH_NAMES[(month + 11) % 12])
            }
            Granularity::Day => {
                let day = self.timestamp.day_value();
                write!(f, "{day}{}", ordinal_suffix(day))
            }
        }
    }
}

fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// One entry of a display sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayEntry<V> {
    Label(Label),
    Item(V),
}

impl<V> DisplayEntry<V> {
    #[inline]
    pub fn is_label(&self) -> bool {
        matches!(self, DisplayEntry::Label(_))
    }

    pub fn as_item(&self) -> Option<&V> {
        match self {
            DisplayEntry::Item(item) => Some(item),
            DisplayEntry::Label(_) => None,
        }
    }

    pub fn as_label(&self) -> Option<&Label> {
        match self {
            DisplayEntry::Label(label) => Some(label),
            DisplayEntry::Item(_) => None,
        }
    }
}

impl<V: Identity> DisplayEntry<V> {
    /// The item's identity; labels have none.
    pub fn item_id(&self) -> Option<ItemId> {
        self.as_item().map(Identity::id)
    }
}

impl<V: Dated> DisplayEntry<V> {
    /// The entry's position on the time axis.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            DisplayEntry::Label(label) => label.timestamp(),
            DisplayEntry::Item(item) => item.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_text() {
        let ts = Timestamp::ymd_hms(2024, 3, 5, 10, 0, 0).unwrap();
        assert_eq!(Label::new(Granularity::Year, ts).to_string(), "2024");
        assert_eq!(Label::new(Granularity::Month, ts).to_string(), "March");
        assert_eq!(Label::new(Granularity::Day, ts).to_string(), "5th");
        let dec = Timestamp::ym(2024, 12).unwrap();
        assert_eq!(Label::new(Granularity::Month, dec).to_string(), "December");
    }

    #[test]
    fn test_ordinal_suffixes() {
        let cases = [
            (1, "1st"),
            (2, "2nd"),
            (3, "3rd"),
            (4, "4th"),
            (11, "11th"),
            (12, "12th"),
            (13, "13th"),
            (21, "21st"),
            (22, "22nd"),
            (23, "23rd"),
            (31, "31st"),
        ];
        for (day, text) in cases {
            let ts = Timestamp::ymd(2024, 1, day).unwrap();
            assert_eq!(Label::new(Granularity::Day, ts).to_string(), text);
        }
    }

    #[test]
    fn test_label_is_bucket() {
        let ts = Timestamp::ymd_hms(2024, 3, 5, 10, 0, 0).unwrap();
        let month = Label::new(Granularity::Month, ts);
        assert_eq!(month.timestamp(), Timestamp::ym(2024, 3).unwrap());
        assert!(month.contains(&Timestamp::ymd(2024, 3, 31).unwrap()));
        assert!(!month.contains(&Timestamp::ymd(2024, 4, 1).unwrap()));
        // A year-precision timestamp falls in the first month of its year.
        let jan = Label::new(Granularity::Month, Timestamp::year(2024).unwrap());
        assert_eq!(jan.to_string(), "January");
    }

    #[test]
    fn test_entry_accessors() {
        let label: DisplayEntry<ItemId> = DisplayEntry::Label(Label::new(
            Granularity::Year,
            Timestamp::year(2020).unwrap(),
        ));
        let item = DisplayEntry::Item(ItemId::new(4));
        assert!(label.is_label());
        assert_eq!(label.item_id(), None);
        assert_eq!(item.item_id(), Some(ItemId::new(4)));
        assert!(item.as_label().is_none());
    }
}
