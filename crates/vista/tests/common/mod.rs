//! Shared fixtures: a photo library projected into views, shown on a
//! timeline and rolled up by tag.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use vista::{
    property, Dated, DisplayEntry, FnExtractor, Identity, ItemId, Named, Notifier, NotifyPropertyChanged,
    ObservableVec, Projector, PropertyName, Rollup, Selectable, SubscriptionId, Tagged, TimelineOptions,
    TimelineView, Timestamp, ViewFlags, FilterSet,
};

pub const CAMERA: PropertyName = "camera";

/// Domain model item.
pub struct Photo {
    id: ItemId,
    name: String,
    taken: Cell<Timestamp>,
    pub tags: ObservableVec<String>,
    camera: RefCell<Option<String>>,
    changed: Notifier<PropertyName>,
}

pub type PhotoRef = Rc<Photo>;

impl Photo {
    pub fn new(id: u64, taken: Timestamp, tags: &[&str]) -> PhotoRef {
        Rc::new(Self {
            id: ItemId::new(id),
            name: format!("IMG_{id:04}"),
            taken: Cell::new(taken),
            tags: ObservableVec::from_vec(tags.iter().map(|t| t.to_string()).collect()),
            camera: RefCell::new(None),
            changed: Notifier::new(),
        })
    }

    pub fn retime(&self, taken: Timestamp) {
        self.taken.set(taken);
        self.changed.emit(property::TIMESTAMP);
    }

    pub fn tag(&self, tag: &str) {
        self.tags.push(tag.to_string());
        self.changed.emit(property::TAGS);
    }

    pub fn untag(&self, tag: &str) {
        if let Some(index) = self.tags.position(|t| t == tag) {
            self.tags.remove_at(index).unwrap();
            self.changed.emit(property::TAGS);
        }
    }

    pub fn set_camera(&self, camera: Option<&str>) {
        *self.camera.borrow_mut() = camera.map(str::to_string);
        self.changed.emit(CAMERA);
    }

    pub fn camera(&self) -> Option<String> {
        self.camera.borrow().clone()
    }

    /// Number of listeners on the model's own notifier.
    pub fn listener_count(&self) -> usize {
        self.changed.len()
    }
}

impl Identity for Photo {
    fn id(&self) -> ItemId {
        self.id
    }
}

impl NotifyPropertyChanged for Photo {
    fn property_changed(&self) -> &Notifier<PropertyName> {
        &self.changed
    }
}

/// View item: a photo plus view-only flags. Forwards the model's property
/// changes on its own notifier.
pub struct PhotoView {
    pub model: PhotoRef,
    flags: ViewFlags,
    changed: Notifier<PropertyName>,
    forward: Cell<Option<SubscriptionId>>,
}

pub type PhotoViewRef = Rc<PhotoView>;

impl PhotoView {
    pub fn create(model: &PhotoRef) -> PhotoViewRef {
        Rc::new_cyclic(|weak: &Weak<PhotoView>| {
            let weak = weak.clone();
            let forward = model.property_changed().subscribe(move |name: &PropertyName| {
                if let Some(view) = weak.upgrade() {
                    view.changed.emit(*name);
                }
            });
            PhotoView {
                model: model.clone(),
                flags: ViewFlags::new(),
                changed: Notifier::new(),
                forward: Cell::new(Some(forward)),
            }
        })
    }

    pub fn teardown(&self) {
        if let Some(id) = self.forward.take() {
            self.model.property_changed().unsubscribe(id);
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.forward.get().is_none()
    }

    pub fn is_in_view(&self) -> bool {
        self.flags.is_in_view()
    }

    pub fn set_in_view(&self, in_view: bool) {
        self.flags.set_in_view(in_view, &self.changed);
    }
}

impl Identity for PhotoView {
    fn id(&self) -> ItemId {
        self.model.id
    }
}

impl Dated for PhotoView {
    fn timestamp(&self) -> Timestamp {
        self.model.taken.get()
    }
}

impl Selectable for PhotoView {
    fn is_selected(&self) -> bool {
        self.flags.is_selected()
    }

    fn set_selected(&self, selected: bool) {
        self.flags.set_selected(selected, &self.changed);
    }
}

impl NotifyPropertyChanged for PhotoView {
    fn property_changed(&self) -> &Notifier<PropertyName> {
        &self.changed
    }
}

impl Tagged for PhotoView {
    fn has_tag(&self, tag: &str) -> bool {
        self.model.tags.with_items(|tags| tags.iter().any(|t| t == tag))
    }
}

impl Named for PhotoView {
    fn display_name(&self) -> String {
        self.model.name.clone()
    }
}

pub type TagRollup = Rollup<PhotoViewRef, FnExtractor<PhotoViewRef, String>>;
pub type CameraRollup = Rollup<PhotoViewRef, FnExtractor<PhotoViewRef, String>>;

/// Source, projection, timeline and rollups wired together.
pub struct Library {
    pub source: ObservableVec<PhotoRef>,
    pub projector: Projector<PhotoRef, PhotoViewRef>,
    pub timeline: TimelineView<PhotoViewRef>,
    pub tags: TagRollup,
    pub cameras: CameraRollup,
}

impl Library {
    pub fn new(photos: Vec<PhotoRef>) -> Self {
        Self::with_options(photos, TimelineOptions::default())
    }

    pub fn with_options(photos: Vec<PhotoRef>, options: TimelineOptions) -> Self {
        vista::init_test_tracing();
        let source = ObservableVec::from_vec(photos);
        let projector = Projector::new(PhotoView::create, |view: &PhotoViewRef| view.model.clone())
            .with_teardown(|view: &PhotoViewRef| view.teardown());
        projector.attach(&source).unwrap();

        let timeline = TimelineView::new(FilterSet::new(), options);
        timeline.attach(&projector.view()).unwrap();

        let tags = Rollup::new(FnExtractor::multi(|view: &PhotoViewRef| Some(view.model.tags.clone())));
        tags.attach(&projector.view()).unwrap();

        let cameras = Rollup::new(FnExtractor::single(CAMERA, |view: &PhotoViewRef| view.model.camera()));
        cameras.attach(&projector.view()).unwrap();

        Self {
            source,
            projector,
            timeline,
            tags,
            cameras,
        }
    }

    pub fn view_of(&self, id: u64) -> PhotoViewRef {
        self.projector.find(ItemId::new(id)).unwrap()
    }

    /// Checks every derived structure against the source.
    pub fn assert_consistent(&self) {
        let models = self.source.snapshot();
        let views = self.projector.view().snapshot();
        assert_eq!(models.len(), views.len(), "projection length");
        for (model, view) in models.iter().zip(&views) {
            assert!(Rc::ptr_eq(model, &view.model), "projection order");
        }
        self.timeline.check_invariants().unwrap();
        self.tags.check_invariants().unwrap();
        self.cameras.check_invariants().unwrap();
    }
}

pub fn day(y: i32, m: u32, d: u32) -> Timestamp {
    Timestamp::ymd(y, m, d).unwrap()
}

/// The display rendered as label text and `#id` items.
pub fn render(timeline: &TimelineView<PhotoViewRef>) -> Vec<String> {
    timeline
        .display()
        .snapshot()
        .iter()
        .map(|entry| match entry {
            DisplayEntry::Label(label) => label.to_string(),
            DisplayEntry::Item(view) => format!("#{}", view.id().raw()),
        })
        .collect()
}

pub fn sorted(values: Vec<String>) -> Vec<String> {
    let mut values = values;
    values.sort();
    values
}
