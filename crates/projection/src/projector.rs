//! Model to view projector.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use vista_core::{Error, FaultHandler, Identity, ItemId, OwnerCell, Result, SubscriptionId};
use vista_feed::{ChangeEvent, ObservableVec};

type Create<M, V> = Rc<dyn Fn(&M) -> V>;
type ModelOf<V, M> = Rc<dyn Fn(&V) -> M>;
type Teardown<V> = Rc<dyn Fn(&V)>;

/// Attachment to a source sequence.
struct Attachment<M> {
    source: ObservableVec<M>,
    subscription: SubscriptionId,
}

struct ProjectorState<M> {
    attachment: Option<Attachment<M>>,
}

struct ProjectorInner<M, V> {
    create: Create<M, V>,
    model_of: ModelOf<V, M>,
    teardown: RefCell<Option<Teardown<V>>>,
    output: ObservableVec<V>,
    cell: OwnerCell<ProjectorState<M>>,
}

/// Maintains exactly one view item per model item, in source order.
///
/// `Projector` is a shared handle; clones drive the same projection.
pub struct Projector<M, V> {
    inner: Rc<ProjectorInner<M, V>>,
}

impl<M, V> Clone for Projector<M, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M, V> Projector<M, V>
where
    M: Clone + Identity + 'static,
    V: Clone + 'static,
{
    /// Creates a detached projector.
    ///
    /// `create` builds the view for a model item; `model_of` maps a view
    /// back to the model item it was created for.
    pub fn new<C, F>(create: C, model_of: F) -> Self
    where
        C: Fn(&M) -> V + 'static,
        F: Fn(&V) -> M + 'static,
    {
        Self {
            inner: Rc::new(ProjectorInner {
                create: Rc::new(create),
                model_of: Rc::new(model_of),
                teardown: RefCell::new(None),
                output: ObservableVec::new(),
                cell: OwnerCell::new(ProjectorState { attachment: None }),
            }),
        }
    }

    /// Installs a hook run on every view item as it is discarded.
    pub fn with_teardown(self, teardown: impl Fn(&V) + 'static) -> Self {
        *self.inner.teardown.borrow_mut() = Some(Rc::new(teardown));
        self
    }

    /// Replaces the fault handler used for errors raised while handling
    /// source events.
    pub fn set_fault_handler(&self, handler: FaultHandler) {
        self.inner.cell.set_fault_handler(handler);
    }

    /// The projected sequence.
    pub fn view(&self) -> ObservableVec<V> {
        self.inner.output.clone()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.output.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.output.is_empty()
    }

    /// The view item created for the model item with identity `id`.
    pub fn find(&self, id: ItemId) -> Option<V> {
        let model_of = &self.inner.model_of;
        self.inner
            .output
            .with_items(|views| views.iter().find(|v| model_of(v).id() == id).cloned())
    }

    /// Starts mirroring `source`, replacing any previous attachment. The
    /// view is rebuilt from the source's current contents.
    pub fn attach(&self, source: &ObservableVec<M>) -> Result<()> {
        let weak: Weak<ProjectorInner<M, V>> = Rc::downgrade(&self.inner);
        let subscription = source.subscribe(move |event: &ChangeEvent<M>| {
            if let Some(inner) = weak.upgrade() {
                let event = event.clone();
                let handle = inner.clone();
                inner
                    .cell
                    .run_or_report(move |state| handle.apply_event(state, &event));
            }
        });

        let inner = self.inner.clone();
        let source = source.clone();
        self.inner.cell.run(move |state| {
            if let Some(previous) = state.attachment.take() {
                previous.source.unsubscribe(previous.subscription);
            }
            let items = source.snapshot();
            state.attachment = Some(Attachment { source, subscription });
            tracing::debug!(items = items.len(), "projector attached");
            inner.rebuild_views(items);
            Ok(())
        })
    }

    /// Stops listening to the source. Existing views are kept.
    pub fn detach(&self) -> Result<()> {
        self.inner.cell.run(|state| {
            if let Some(previous) = state.attachment.take() {
                previous.source.unsubscribe(previous.subscription);
                tracing::debug!("projector detached");
            }
            Ok(())
        })
    }

    /// Detaches and tears down every live view.
    pub fn cleanup(&self) -> Result<()> {
        self.detach()?;
        let inner = self.inner.clone();
        self.inner.cell.run(move |_| {
            inner.teardown_all();
            inner.output.clear();
            Ok(())
        })
    }

    /// Applies one change event from the model sequence.
    ///
    /// On a consistency failure the view is rebuilt from the attached
    /// source (if any) before the error is returned.
    pub fn apply(&self, event: &ChangeEvent<M>) -> Result<()> {
        let inner = self.inner.clone();
        let event = event.clone();
        self.inner.cell.run(move |state| inner.apply_event(state, &event))
    }

    /// Discards every view and projects `items` afresh, published as one
    /// `Reset`.
    pub fn rebuild(&self, items: Vec<M>) -> Result<()> {
        let inner = self.inner.clone();
        self.inner.cell.run(move |_| {
            inner.rebuild_views(items);
            Ok(())
        })
    }
}

impl<M, V> ProjectorInner<M, V>
where
    M: Clone + Identity + 'static,
    V: Clone + 'static,
{
    fn apply_event(&self, state: &mut ProjectorState<M>, event: &ChangeEvent<M>) -> Result<()> {
        let outcome = self.apply_unchecked(event);
        if let Err(err) = &outcome {
            tracing::warn!(error = %err, "projection desynced from source");
            if let Some(attachment) = &state.attachment {
                let items = attachment.source.snapshot();
                self.rebuild_views(items);
            }
        }
        outcome
    }

    fn apply_unchecked(&self, event: &ChangeEvent<M>) -> Result<()> {
        event.validate()?;
        match event {
            ChangeEvent::Add { index, items } => self.insert_views(*index, items),
            ChangeEvent::Remove { items, .. } => self.remove_views(items),
            ChangeEvent::Replace { index, removed, added } => {
                self.remove_views(removed)?;
                self.insert_views(*index, added)
            }
            ChangeEvent::Reset { items } => {
                self.rebuild_views(items.clone());
                Ok(())
            }
        }
    }

    fn insert_views(&self, index: usize, models: &[M]) -> Result<()> {
        let views: Vec<V> = models.iter().map(|m| (self.create)(m)).collect();
        tracing::trace!(index, count = views.len(), "projecting added items");
        self.output.insert_many(index, views).map_err(|err| {
            Error::consistency(format!("projected add does not fit the view: {err}"))
        })
    }

    fn remove_views(&self, models: &[M]) -> Result<()> {
        for model in models {
            let id = model.id();
            let position = self.output.position(|v| (self.model_of)(v).id() == id);
            let Some(position) = position else {
                return Err(Error::consistency(format!("no view exists for removed item {id}")));
            };
            let view = self.output.remove_at(position)?;
            self.teardown_one(&view);
        }
        Ok(())
    }

    fn rebuild_views(&self, models: Vec<M>) {
        self.teardown_all();
        let views: Vec<V> = models.iter().map(|m| (self.create)(m)).collect();
        tracing::debug!(count = views.len(), "projection rebuilt");
        self.output.reset_with(views);
    }

    fn teardown_one(&self, view: &V) {
        let hook = self.teardown.borrow().clone();
        if let Some(hook) = hook {
            hook(view);
        }
    }

    fn teardown_all(&self) {
        let hook = self.teardown.borrow().clone();
        if let Some(hook) = hook {
            for view in self.output.snapshot() {
                hook(&view);
            }
        }
    }
}

impl<M, V> Drop for ProjectorInner<M, V> {
    fn drop(&mut self) {
        if let Some(attachment) = self.cell.get_mut().attachment.take() {
            attachment.source.unsubscribe(attachment.subscription);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Clone, Debug, PartialEq)]
    struct Model(u64);

    impl Identity for Model {
        fn id(&self) -> ItemId {
            ItemId::new(self.0)
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    struct View {
        model: Model,
        caption: String,
    }

    fn projector() -> Projector<Model, View> {
        Projector::new(
            |m: &Model| View {
                model: m.clone(),
                caption: format!("item {}", m.0),
            },
            |v: &View| v.model.clone(),
        )
    }

    fn ids(projector: &Projector<Model, View>) -> Vec<u64> {
        projector.view().snapshot().iter().map(|v| v.model.0).collect()
    }

    #[test]
    fn test_attach_projects_existing_items() {
        let source = ObservableVec::from_vec(vec![Model(1), Model(2)]);
        let p = projector();
        p.attach(&source).unwrap();

        assert_eq!(ids(&p), vec![1, 2]);
        assert_eq!(p.find(ItemId::new(2)).unwrap().caption, "item 2");
    }

    #[test]
    fn test_mirrors_add_remove_replace() {
        let source = ObservableVec::from_vec(vec![Model(1)]);
        let p = projector();
        p.attach(&source).unwrap();

        source.insert_many(0, vec![Model(5), Model(6)]).unwrap();
        assert_eq!(ids(&p), vec![5, 6, 1]);

        source.remove_at(1).unwrap();
        assert_eq!(ids(&p), vec![5, 1]);

        source.set(0, Model(9)).unwrap();
        assert_eq!(ids(&p), vec![9, 1]);

        source.reset_with(vec![Model(3)]);
        assert_eq!(ids(&p), vec![3]);
    }

    #[test]
    fn test_teardown_runs_for_departing_views() {
        let torn = Rc::new(RefCell::new(Vec::new()));
        let t = torn.clone();
        let p = projector().with_teardown(move |v: &View| t.borrow_mut().push(v.model.0));
        let source = ObservableVec::from_vec(vec![Model(1), Model(2), Model(3)]);
        p.attach(&source).unwrap();

        source.remove_at(1).unwrap();
        assert_eq!(*torn.borrow(), vec![2]);

        p.cleanup().unwrap();
        assert_eq!(*torn.borrow(), vec![2, 1, 3]);
        assert!(p.is_empty());

        // Detached: further source changes are ignored.
        source.push(Model(8));
        assert!(p.is_empty());
    }

    #[test]
    fn test_unknown_remove_is_consistency_error_and_recovers() {
        let source = ObservableVec::from_vec(vec![Model(1), Model(2)]);
        let p = projector();
        p.attach(&source).unwrap();

        let err = p.apply(&ChangeEvent::remove(0, vec![Model(42)])).unwrap_err();
        assert!(matches!(err, Error::Consistency { .. }));
        // Recovery rebuilt from the source.
        assert_eq!(ids(&p), vec![1, 2]);
    }

    #[test]
    fn test_mismatched_replace_is_rejected() {
        let p = projector();
        let bad = ChangeEvent::Replace {
            index: 0,
            removed: vec![Model(1)],
            added: vec![],
        };
        assert!(matches!(p.apply(&bad), Err(Error::Consistency { .. })));
    }

    #[test]
    fn test_source_desync_goes_to_fault_handler() {
        let source = ObservableVec::from_vec(vec![Model(1)]);
        let p = projector();
        let faults = Rc::new(Cell::new(0));
        let f = faults.clone();
        p.set_fault_handler(Rc::new(move |_| f.set(f.get() + 1)));
        p.attach(&source).unwrap();

        // Drop the view behind the projector's back, then remove from the source.
        p.view().clear();
        source.remove_at(0).unwrap();

        assert_eq!(faults.get(), 1);
        assert!(p.is_empty());
    }

    #[test]
    fn test_reentrant_source_mutation_is_serialized() {
        let source = ObservableVec::from_vec(Vec::new());
        let p = projector();
        p.attach(&source).unwrap();

        // Reacting to the first projected view by adding another model item.
        let writer = source.clone();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        p.view().subscribe(move |_| {
            if !f.replace(true) {
                writer.push(Model(2));
            }
        });

        source.push(Model(1));
        assert_eq!(ids(&p), vec![1, 2]);
        assert_eq!(source.len(), p.len());
    }

    #[test]
    fn test_reset_uses_contents_at_emit_time() {
        let source = ObservableVec::from_vec(vec![Model(5)]);
        // Registered before the projector, so it runs first on every event.
        let writer = source.clone();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        source.subscribe(move |event| {
            if event.kind() == vista_feed::ChangeKind::Reset && !f.replace(true) {
                writer.push(Model(2));
            }
        });
        let p = projector();
        p.attach(&source).unwrap();

        source.reset_with(vec![Model(1)]);
        assert_eq!(source.snapshot(), vec![Model(1), Model(2)]);
        assert_eq!(ids(&p), vec![1, 2]);
    }

    #[test]
    fn test_reset_without_source_projects_payload() {
        let p = projector();
        p.apply(&ChangeEvent::reset(vec![Model(4), Model(7)])).unwrap();
        assert_eq!(ids(&p), vec![4, 7]);
    }

    #[test]
    fn test_dropping_projector_unsubscribes() {
        let source = ObservableVec::from_vec(vec![Model(1)]);
        {
            let p = projector();
            p.attach(&source).unwrap();
            assert_eq!(source.subscriber_count(), 1);
        }
        assert_eq!(source.subscriber_count(), 0);
    }
}
