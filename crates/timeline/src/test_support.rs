use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::rc::Rc;
use vista_core::{
    property, Dated, Identity, ItemId, Notifier, NotifyPropertyChanged, PropertyName, Selectable, Timestamp,
    ViewFlags,
};
use vista_filter::{Criterion, FilterChange, Named, Tagged};

/// A displayable item with mutable timestamp and tags.
pub struct Shot {
    id: ItemId,
    taken: Cell<Timestamp>,
    tags: RefCell<BTreeSet<String>>,
    flags: ViewFlags,
    changed: Notifier<PropertyName>,
}

pub type ShotRef = Rc<Shot>;

impl Shot {
    pub fn new(id: u64, taken: Timestamp, tags: &[&str]) -> ShotRef {
        Rc::new(Self {
            id: ItemId::new(id),
            taken: Cell::new(taken),
            tags: RefCell::new(tags.iter().map(|t| String::from(*t)).collect()),
            flags: ViewFlags::new(),
            changed: Notifier::new(),
        })
    }

    pub fn retime(&self, taken: Timestamp) {
        self.taken.set(taken);
        self.changed.emit(property::TIMESTAMP);
    }

    pub fn tag(&self, tag: &str) {
        self.tags.borrow_mut().insert(String::from(tag));
        self.changed.emit(property::TAGS);
    }

    pub fn untag(&self, tag: &str) {
        self.tags.borrow_mut().remove(tag);
        self.changed.emit(property::TAGS);
    }
}

impl Identity for Shot {
    fn id(&self) -> ItemId {
        self.id
    }
}

impl Dated for Shot {
    fn timestamp(&self) -> Timestamp {
        self.taken.get()
    }
}

impl Selectable for Shot {
    fn is_selected(&self) -> bool {
        self.flags.is_selected()
    }

    fn set_selected(&self, selected: bool) {
        self.flags.set_selected(selected, &self.changed);
    }
}

impl NotifyPropertyChanged for Shot {
    fn property_changed(&self) -> &Notifier<PropertyName> {
        &self.changed
    }
}

impl Tagged for Shot {
    fn has_tag(&self, tag: &str) -> bool {
        self.tags.borrow().contains(tag)
    }
}

impl Named for Shot {
    fn display_name(&self) -> String {
        format!("shot {}", self.id.raw())
    }
}

/// Admits shots whose raw id is at least the floor, logging every id it
/// is asked about.
#[derive(Default)]
pub struct FloorCriterion {
    floor: Cell<u64>,
    asked: RefCell<Vec<u64>>,
    signals: Notifier<FilterChange>,
}

impl Clone for FloorCriterion {
    fn clone(&self) -> Self {
        Self {
            floor: Cell::new(self.floor.get()),
            asked: RefCell::new(Vec::new()),
            signals: Notifier::new(),
        }
    }
}

impl FloorCriterion {
    pub fn set_floor(&self, floor: u64) {
        let change = match floor.cmp(&self.floor.replace(floor)) {
            Ordering::Equal => return,
            Ordering::Greater => FilterChange::Tightened,
            Ordering::Less => FilterChange::Loosened,
        };
        self.signals.emit(change);
    }

    /// Ids evaluated since the last call, sorted.
    pub fn take_asked(&self) -> Vec<u64> {
        let mut asked = self.asked.take();
        asked.sort_unstable();
        asked
    }
}

impl Criterion<ShotRef> for FloorCriterion {
    fn kind_name(&self) -> &'static str {
        "floor"
    }

    fn filter(&self, item: &ShotRef) -> bool {
        let raw = item.id().raw();
        self.asked.borrow_mut().push(raw);
        raw >= self.floor.get()
    }

    fn is_active(&self) -> bool {
        self.floor.get() > 0
    }

    fn clear_filter(&self) {
        self.floor.set(0);
        self.signals.emit(FilterChange::Loosened);
    }

    fn signals(&self) -> &Notifier<FilterChange> {
        &self.signals
    }

    fn watched_properties(&self) -> &'static [PropertyName] {
        &[]
    }
}

pub fn day(y: i32, m: u32, d: u32) -> Timestamp {
    Timestamp::ymd(y, m, d).unwrap()
}
