//! Pure layout rules for labeled display sequences.
//!
//! A well-formed display is sorted by `(timestamp, id)`. Every item is
//! preceded, at every label level, by the label of its bucket: either
//! directly before it, or before an earlier item of the same bucket with
//! no coarser-or-equal label in between. A label is never empty: it is
//! followed by an item or by a strictly finer label.

use std::ops::Range;
use vista_core::{Dated, Granularity, Identity, ItemId, Timestamp};

use crate::label::{DisplayEntry, Label};

/// Total order of items on the timeline.
pub type SortKey = (Timestamp, ItemId);

#[inline]
pub(crate) fn sort_key<V: Dated + Identity>(item: &V) -> SortKey {
    (item.timestamp(), item.id())
}

/// Lays out already sorted items with every label they need.
pub(crate) fn layout<V: Clone + Dated>(items: &[V], levels: &[Granularity]) -> Vec<DisplayEntry<V>> {
    let mut entries = Vec::with_capacity(items.len() * (levels.len() + 1));
    let mut previous: Option<Timestamp> = None;
    for item in items {
        let ts = item.timestamp();
        let first = match previous {
            None => 0,
            Some(prev) => levels
                .iter()
                .position(|g| prev.bucket(*g) != ts.bucket(*g))
                .unwrap_or(levels.len()),
        };
        entries.extend(levels[first..].iter().map(|g| DisplayEntry::Label(Label::new(*g, ts))));
        entries.push(DisplayEntry::Item(item.clone()));
        previous = Some(ts);
    }
    entries
}

/// Index of the first entry that does not sort before `key`.
///
/// Items sort before `key` when their key is smaller; labels sort before it
/// when their bucket starts at or before `key`'s timestamp. For a displayed
/// item this is the item's own index.
pub(crate) fn locate<V>(entries: &[DisplayEntry<V>], key: SortKey, key_of: impl Fn(&V) -> SortKey) -> usize {
    let start = key.0.start();
    entries.partition_point(|entry| match entry {
        DisplayEntry::Item(item) => key_of(item) < key,
        DisplayEntry::Label(label) => label.timestamp().start() <= start,
    })
}

/// The bucket open at each level just before `entries.len()`.
fn open_buckets<V>(entries: &[DisplayEntry<V>], levels: &[Granularity]) -> Vec<Option<Timestamp>> {
    let mut chain = vec![None; levels.len()];
    let mut bound = levels.len();
    for entry in entries.iter().rev() {
        if bound == 0 {
            break;
        }
        let DisplayEntry::Label(label) = entry else { continue };
        let Some(level) = levels.iter().position(|g| *g == label.granularity()) else {
            continue;
        };
        // A label closes every finer bucket opened before it.
        if level < bound {
            chain[level] = Some(label.timestamp());
            bound = level;
        }
    }
    chain
}

/// Where a new item goes and which labels must be inserted with it.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Insertion {
    pub index: usize,
    pub labels: Vec<Label>,
}

pub(crate) fn plan_insertion<V>(
    entries: &[DisplayEntry<V>],
    key: SortKey,
    levels: &[Granularity],
    key_of: impl Fn(&V) -> SortKey,
) -> Insertion {
    let index = locate(entries, key, key_of);
    let ts = key.0;
    let chain = open_buckets(&entries[..index], levels);
    let first = levels
        .iter()
        .zip(chain.iter())
        .position(|(g, open)| *open != Some(ts.bucket(*g)))
        .unwrap_or(levels.len());
    Insertion {
        index,
        labels: levels[first..].iter().map(|g| Label::new(*g, ts)).collect(),
    }
}

/// The entries to drop when removing the item at `index`: the item plus
/// every preceding label left empty by its departure.
pub(crate) fn removal_span<V>(entries: &[DisplayEntry<V>], index: usize) -> Range<usize> {
    let next = match entries.get(index + 1) {
        None => None,
        Some(DisplayEntry::Label(label)) => Some(label.granularity()),
        Some(DisplayEntry::Item(_)) => return index..index + 1,
    };
    let mut start = index;
    while start > 0 {
        match &entries[start - 1] {
            DisplayEntry::Label(label) if next.map_or(true, |g| g <= label.granularity()) => start -= 1,
            _ => break,
        }
    }
    start..index + 1
}

/// The index of the first label that is followed by the end of the
/// sequence or by a label of equal or coarser granularity.
pub(crate) fn first_empty_label<V>(entries: &[DisplayEntry<V>]) -> Option<usize> {
    entries.iter().enumerate().position(|(i, entry)| {
        let DisplayEntry::Label(label) = entry else { return false };
        match entries.get(i + 1) {
            None => true,
            Some(DisplayEntry::Label(next)) => next.granularity() <= label.granularity(),
            Some(DisplayEntry::Item(_)) => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_core::Precision;

    #[derive(Clone, Debug, PartialEq)]
    struct Pin(u64, Timestamp);

    impl Dated for Pin {
        fn timestamp(&self) -> Timestamp {
            self.1
        }
    }

    impl Identity for Pin {
        fn id(&self) -> ItemId {
            ItemId::new(self.0)
        }
    }

    const LEVELS: [Granularity; 3] = Granularity::ALL;

    fn day(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::ymd(y, m, d).unwrap()
    }

    fn render(entries: &[DisplayEntry<Pin>]) -> Vec<String> {
        entries
            .iter()
            .map(|e| match e {
                DisplayEntry::Label(l) => l.to_string(),
                DisplayEntry::Item(p) => format!("#{}", p.0),
            })
            .collect()
    }

    fn insert(entries: &mut Vec<DisplayEntry<Pin>>, pin: Pin, levels: &[Granularity]) {
        let plan = plan_insertion(entries, sort_key(&pin), levels, sort_key);
        let mut run: Vec<DisplayEntry<Pin>> = plan.labels.into_iter().map(DisplayEntry::Label).collect();
        run.push(DisplayEntry::Item(pin));
        entries.splice(plan.index..plan.index, run);
    }

    fn remove(entries: &mut Vec<DisplayEntry<Pin>>, pin: &Pin) {
        let index = locate(entries, sort_key(pin), sort_key);
        assert_eq!(entries[index].as_item(), Some(pin));
        let span = removal_span(entries, index);
        entries.drain(span);
    }

    #[test]
    fn test_layout_emits_all_levels_first() {
        let pins = vec![
            Pin(1, day(2023, 12, 31)),
            Pin(2, day(2024, 1, 1)),
            Pin(3, day(2024, 1, 1)),
            Pin(4, day(2024, 3, 5)),
        ];
        let entries = layout(&pins, &LEVELS);
        assert_eq!(
            render(&entries),
            vec![
                "2023", "December", "31st", "#1", "2024", "January", "1st", "#2", "#3", "March", "5th", "#4"
            ]
        );
        assert_eq!(first_empty_label(&entries), None);
    }

    #[test]
    fn test_insert_into_empty() {
        let mut entries = Vec::new();
        insert(&mut entries, Pin(1, day(2024, 3, 5)), &LEVELS);
        assert_eq!(render(&entries), vec!["2024", "March", "5th", "#1"]);
    }

    #[test]
    fn test_insert_reuses_open_buckets() {
        let mut entries = layout(&[Pin(1, day(2024, 3, 5))], &LEVELS);

        // Same day: no labels.
        insert(&mut entries, Pin(2, day(2024, 3, 5)), &LEVELS);
        // Same month, new day.
        insert(&mut entries, Pin(3, day(2024, 3, 9)), &LEVELS);
        // Earlier day in the same month goes before the existing day label.
        insert(&mut entries, Pin(4, day(2024, 3, 1)), &LEVELS);

        assert_eq!(
            render(&entries),
            vec!["2024", "March", "1st", "#4", "5th", "#1", "#2", "9th", "#3"]
        );
    }

    #[test]
    fn test_insert_before_everything_keeps_labels_well_formed() {
        let mut entries = layout(&[Pin(1, day(2024, 3, 5))], &LEVELS);
        insert(&mut entries, Pin(2, day(2023, 7, 1)), &LEVELS);
        insert(&mut entries, Pin(3, day(2024, 2, 10)), &LEVELS);

        assert_eq!(
            render(&entries),
            vec!["2023", "July", "1st", "#2", "2024", "February", "10th", "#3", "March", "5th", "#1"]
        );
    }

    #[test]
    fn test_coarse_precision_sorts_at_range_start() {
        let mut entries = layout(&[Pin(1, Timestamp::ymd_hms(2024, 1, 1, 9, 0, 0).unwrap())], &LEVELS);
        insert(&mut entries, Pin(2, Timestamp::year(2024).unwrap()), &LEVELS);
        assert_eq!(render(&entries), vec!["2024", "January", "1st", "#2", "#1"]);
        assert_eq!(entries[3].as_item().unwrap().1.precision(), Precision::Year);
    }

    #[test]
    fn test_remove_cascades_empty_labels() {
        let pins = vec![
            Pin(1, day(2024, 3, 5)),
            Pin(2, day(2024, 3, 9)),
            Pin(3, day(2024, 4, 1)),
        ];
        let mut entries = layout(&pins, &LEVELS);

        // Removing the only item of March 9th drops just the day label.
        remove(&mut entries, &pins[1]);
        assert_eq!(
            render(&entries),
            vec!["2024", "March", "5th", "#1", "April", "1st", "#3"]
        );

        // Removing the only item of March drops the month and day labels,
        // the year stays because April follows.
        remove(&mut entries, &pins[0]);
        assert_eq!(render(&entries), vec!["2024", "April", "1st", "#3"]);

        remove(&mut entries, &pins[2]);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_remove_keeps_labels_shared_with_next_item() {
        let pins = vec![Pin(1, day(2024, 3, 5)), Pin(2, day(2024, 3, 5))];
        let mut entries = layout(&pins, &LEVELS);
        remove(&mut entries, &pins[0]);
        assert_eq!(render(&entries), vec!["2024", "March", "5th", "#2"]);
    }

    #[test]
    fn test_month_finest_level() {
        let levels = [Granularity::Year, Granularity::Month];
        let mut entries = Vec::new();
        insert(&mut entries, Pin(1, day(2024, 3, 5)), &levels);
        insert(&mut entries, Pin(2, day(2024, 3, 9)), &levels);
        assert_eq!(render(&entries), vec!["2024", "March", "#1", "#2"]);
    }

    #[test]
    fn test_no_levels_means_no_labels() {
        let mut entries = Vec::new();
        insert(&mut entries, Pin(2, day(2024, 3, 5)), &[]);
        insert(&mut entries, Pin(1, day(2024, 3, 5)), &[]);
        assert_eq!(render(&entries), vec!["#1", "#2"]);
    }

    #[test]
    fn test_first_empty_label() {
        let ts = day(2024, 3, 5);
        let entries: Vec<DisplayEntry<Pin>> = vec![
            DisplayEntry::Label(Label::new(Granularity::Year, ts)),
            DisplayEntry::Label(Label::new(Granularity::Month, ts)),
            DisplayEntry::Label(Label::new(Granularity::Month, day(2024, 4, 1))),
            DisplayEntry::Item(Pin(1, day(2024, 4, 1))),
        ];
        assert_eq!(first_empty_label(&entries), Some(1));
        assert_eq!(first_empty_label(&entries[2..]), None);
    }
}
