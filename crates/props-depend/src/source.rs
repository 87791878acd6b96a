use std::any::Any;
use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// Type-erased view of a [`Source`], used to wire sources into the graph.
pub trait AnySource {
    /// Stable name of the source (for example `ensemble.step`).
    fn name(&self) -> &str;
    /// Number of writes performed so far.
    fn version(&self) -> u64;
    /// Downcasting hook used by [`Inputs`](crate::Inputs).
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to an erased source.
pub type SourceRef = Rc<dyn AnySource>;

pub(crate) struct SourceCell<T> {
    name: String,
    value: RefCell<T>,
    version: Cell<u64>,
}

impl<T> SourceCell<T> {
    pub(crate) fn borrow(&self) -> Ref<'_, T> {
        self.value.borrow()
    }
}

impl<T: 'static> AnySource for SourceCell<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> u64 {
        self.version.get()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Raw reactive value owned by the simulation.
///
/// Cloning a `Source` clones the handle, not the value: every clone observes
/// the same cell and the same version counter.
pub struct Source<T> {
    inner: Rc<SourceCell<T>>,
}

impl<T: 'static> Source<T> {
    /// Creates a source at version zero.
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            inner: Rc::new(SourceCell {
                name: name.into(),
                value: RefCell::new(value),
                version: Cell::new(0),
            }),
        }
    }

    /// Name the source was created with.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current version; bumped by [`Source::set`] and [`Source::update`].
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Borrows the current value.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.inner.borrow()
    }

    /// Replaces the value and invalidates every dependent node.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.bump();
    }

    /// Mutates the value in place and invalidates every dependent node.
    pub fn update<R>(&self, mutate: impl FnOnce(&mut T) -> R) -> R {
        let result = {
            let mut guard = self.inner.value.borrow_mut();
            mutate(&mut *guard)
        };
        self.bump();
        result
    }

    /// Returns the erased handle used when declaring graph dependencies.
    pub fn erased(&self) -> SourceRef {
        self.inner.clone()
    }

    fn bump(&self) {
        self.inner.version.set(self.inner.version.get() + 1);
    }
}

impl<T: Clone + 'static> Source<T> {
    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.inner.borrow().clone()
    }
}

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("name", &self.inner.name)
            .field("version", &self.inner.version.get())
            .field("value", &self.inner.value)
            .finish()
    }
}
