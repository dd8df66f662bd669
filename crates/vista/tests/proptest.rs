//! Property-based tests for the assembled pipeline.

mod common;

use std::collections::BTreeSet;

use common::{day, Library, Photo, PhotoRef};
use proptest::prelude::*;
use vista::{TagCriterion, TimeRangeCriterion};

const TAGS: [&str; 3] = ["red", "green", "blue"];

#[derive(Clone, Debug)]
enum Op {
    Push(u8),
    RemoveAt(usize),
    Set(usize, u8),
    Tag(usize, usize),
    Untag(usize, usize),
    Retime(usize, u8),
    Camera(usize, Option<u8>),
    Require(usize),
    Unrequire(usize),
    Since(Option<u8>),
    Reset,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u8>().prop_map(Op::Push),
        2 => any::<usize>().prop_map(Op::RemoveAt),
        1 => (any::<usize>(), any::<u8>()).prop_map(|(i, s)| Op::Set(i, s)),
        2 => (any::<usize>(), 0..TAGS.len()).prop_map(|(i, t)| Op::Tag(i, t)),
        2 => (any::<usize>(), 0..TAGS.len()).prop_map(|(i, t)| Op::Untag(i, t)),
        2 => (any::<usize>(), any::<u8>()).prop_map(|(i, s)| Op::Retime(i, s)),
        1 => (any::<usize>(), proptest::option::of(0u8..3)).prop_map(|(i, c)| Op::Camera(i, c)),
        1 => (0..TAGS.len()).prop_map(Op::Require),
        1 => (0..TAGS.len()).prop_map(Op::Unrequire),
        1 => proptest::option::of(any::<u8>()).prop_map(Op::Since),
        1 => Just(Op::Reset),
    ]
}

struct Harness {
    library: Library,
    next_id: u64,
}

impl Harness {
    fn new() -> Self {
        Self {
            library: Library::new(Vec::new()),
            next_id: 1,
        }
    }

    fn photo(&mut self, slot: u8) -> PhotoRef {
        let id = self.next_id;
        self.next_id += 1;
        let tags: Vec<&str> = TAGS
            .iter()
            .enumerate()
            .filter(|(i, _)| slot & (1 << i) != 0)
            .map(|(_, t)| *t)
            .collect();
        Photo::new(id, when(slot), &tags)
    }

    fn pick(&self, index: usize) -> Option<PhotoRef> {
        let len = self.library.source.len();
        (len > 0).then(|| self.library.source.get(index % len)).flatten()
    }

    fn apply(&mut self, op: Op) {
        let source = self.library.source.clone();
        match op {
            Op::Push(slot) => source.push(self.photo(slot)),
            Op::RemoveAt(index) => {
                if !source.is_empty() {
                    source.remove_at(index % source.len()).unwrap();
                }
            }
            Op::Set(index, slot) => {
                if !source.is_empty() {
                    let photo = self.photo(slot);
                    source.set(index % source.len(), photo).unwrap();
                }
            }
            Op::Tag(index, tag) => {
                if let Some(photo) = self.pick(index) {
                    photo.tag(TAGS[tag]);
                }
            }
            Op::Untag(index, tag) => {
                if let Some(photo) = self.pick(index) {
                    photo.untag(TAGS[tag]);
                }
            }
            Op::Retime(index, slot) => {
                if let Some(photo) = self.pick(index) {
                    photo.retime(when(slot));
                }
            }
            Op::Camera(index, camera) => {
                if let Some(photo) = self.pick(index) {
                    let name = camera.map(|c| format!("cam{c}"));
                    photo.set_camera(name.as_deref());
                }
            }
            Op::Require(tag) => {
                self.library.timeline.filters().criterion::<TagCriterion>().require(TAGS[tag]);
            }
            Op::Unrequire(tag) => {
                self.library.timeline.filters().criterion::<TagCriterion>().unrequire(TAGS[tag]);
            }
            Op::Since(slot) => {
                self.library
                    .timeline
                    .filters()
                    .criterion::<TimeRangeCriterion>()
                    .set_start(slot.map(when));
            }
            Op::Reset => {
                let mut items = source.snapshot();
                items.reverse();
                source.reset_with(items);
            }
        }
    }

    fn tag_union(&self) -> BTreeSet<String> {
        self.library
            .source
            .snapshot()
            .iter()
            .flat_map(|photo| photo.tags.snapshot())
            .collect()
    }

    fn camera_union(&self) -> BTreeSet<String> {
        self.library
            .source
            .snapshot()
            .iter()
            .filter_map(|photo| photo.camera())
            .collect()
    }
}

fn when(slot: u8) -> vista::Timestamp {
    day(2020 + i32::from(slot % 3), 1 + u32::from(slot / 3 % 12), 1 + u32::from(slot % 28))
}

proptest! {
    /// Every derived structure stays consistent with the source.
    #[test]
    fn pipeline_stays_consistent(ops in prop::collection::vec(op(), 1..40)) {
        let mut harness = Harness::new();
        for op in ops {
            harness.apply(op);
            harness.library.assert_consistent();
        }
    }

    /// The rollups always equal the union over the current photos.
    #[test]
    fn rollups_equal_unions(ops in prop::collection::vec(op(), 1..40)) {
        let mut harness = Harness::new();
        for op in ops {
            harness.apply(op);
            let tags: BTreeSet<String> = harness.library.tags.snapshot().into_iter().collect();
            prop_assert_eq!(tags, harness.tag_union());
            let cameras: BTreeSet<String> = harness.library.cameras.snapshot().into_iter().collect();
            prop_assert_eq!(cameras, harness.camera_union());
        }
    }

    /// The displayed items are exactly the photos the filters admit.
    #[test]
    fn display_matches_filters(ops in prop::collection::vec(op(), 1..40)) {
        let mut harness = Harness::new();
        for op in ops {
            harness.apply(op);
            let filters = harness.library.timeline.filters();
            let expected: BTreeSet<u64> = harness
                .library
                .projector
                .view()
                .snapshot()
                .iter()
                .filter(|view| filters.filter(view))
                .map(|view| vista::Identity::id(view).raw())
                .collect();
            let shown: BTreeSet<u64> = harness
                .library
                .timeline
                .display()
                .items()
                .iter()
                .map(|view| vista::Identity::id(view).raw())
                .collect();
            prop_assert_eq!(shown, expected);
        }
    }
}
