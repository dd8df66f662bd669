use std::collections::BTreeSet;
use vista_core::{Dated, Identity, ItemId, Timestamp};

use crate::criterion::{MapAssociated, Named, Tagged};

#[derive(Clone, Debug)]
pub struct Item {
    pub id: ItemId,
    pub tags: BTreeSet<String>,
    pub taken: Timestamp,
    pub places: Vec<ItemId>,
    pub name: String,
}

impl Item {
    pub fn new(id: u64, tags: &[&str], taken: Timestamp) -> Self {
        Self {
            id: ItemId::new(id),
            tags: tags.iter().map(|t| String::from(*t)).collect(),
            taken,
            places: Vec::new(),
            name: format!("IMG_{id:04}"),
        }
    }

    pub fn at(mut self, place: u64) -> Self {
        self.places.push(ItemId::new(place));
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = String::from(name);
        self
    }
}

impl Identity for Item {
    fn id(&self) -> ItemId {
        self.id
    }
}

impl Dated for Item {
    fn timestamp(&self) -> Timestamp {
        self.taken
    }
}

impl Tagged for Item {
    fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

impl MapAssociated for Item {
    fn is_associated_with(&self, map_item: ItemId) -> bool {
        self.places.contains(&map_item)
    }
}

impl Named for Item {
    fn display_name(&self) -> String {
        self.name.clone()
    }
}

pub fn day(y: i32, m: u32, d: u32) -> Timestamp {
    Timestamp::ymd(y, m, d).unwrap()
}

/// A small population spread over two years with mixed tags and places.
pub fn population() -> Vec<Item> {
    vec![
        Item::new(1, &["beach", "sunset"], day(2023, 7, 14)).at(100).named("Sunset at Nice"),
        Item::new(2, &["beach"], day(2023, 8, 2)).at(100),
        Item::new(3, &["forest"], day(2024, 1, 9)).at(200).named("Black Forest"),
        Item::new(4, &[], day(2024, 3, 5)),
        Item::new(5, &["beach", "family"], day(2024, 3, 5)).at(200).named("Family beach day"),
        Item::new(6, &["family"], Timestamp::year(2024).unwrap()),
        Item::new(7, &["sunset"], day(2024, 12, 31)).named("New year eve"),
    ]
}

/// Records every signal a notifier emits.
pub fn record(
    notifier: &vista_core::Notifier<crate::FilterChange>,
) -> std::rc::Rc<std::cell::RefCell<Vec<crate::FilterChange>>> {
    let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let l = log.clone();
    notifier.subscribe(move |change| l.borrow_mut().push(*change));
    log
}
