//! Category to catch block mapping with hierarchy-aware lookup.
//!
//! [`CatchMap`] stores at most one catch block per [`Category`]. Lookup with
//! [`CatchMap::get`] starts at the raised category and walks its ancestors until a
//! registered handler is found, so the most specific registration always wins
//! regardless of the order in which handlers were added.

use std::{fmt, rc::Rc};

use indexmap::IndexMap;

use crate::category::Category;

/// A handler invoked with a failure value.
///
/// Returning `Err` raises a new failure from the handler; the dispatcher does not
/// catch it. Handlers are reference counted so a single handler can be registered
/// against several categories.
pub type CatchBlock<'a, E> = Rc<dyn Fn(E) -> std::result::Result<(), E> + 'a>;

/// Mapping from [`Category`] to [`CatchBlock`].
///
/// A freshly constructed map always holds a no-op handler for [`Category::ANY`], so
/// every category resolves to some handler. Registering a category twice silently
/// replaces the earlier handler. Registration order is kept for iteration only.
pub struct CatchMap<'a, E> {
    blocks: IndexMap<Category, CatchBlock<'a, E>>,
}

impl<'a, E> CatchMap<'a, E> {
    /// Creates a map holding only the no-op [`Category::ANY`] handler.
    #[must_use]
    pub fn new() -> Self {
        let mut blocks: IndexMap<Category, CatchBlock<'a, E>> = IndexMap::new();
        blocks.insert(Category::ANY, Rc::new(|_| Ok(())));
        CatchMap { blocks }
    }

    /// Map without the `ANY` entry, for exercising the unresolved lookup path.
    #[cfg(test)]
    pub(crate) fn without_default() -> Self {
        CatchMap {
            blocks: IndexMap::new(),
        }
    }

    /// Registers `block` for `category`, replacing any existing handler.
    ///
    /// # Arguments
    ///
    /// * `category` - The category to handle
    /// * `block` - The handler to invoke for failures resolving to `category`
    pub fn put(&mut self, category: Category, block: CatchBlock<'a, E>) {
        if self.blocks.insert(category, block).is_some() {
            tracing::trace!(%category, "replaced catch block");
        } else {
            tracing::trace!(%category, "registered catch block");
        }
    }

    /// Resolves `category` to the handler of its most specific registered ancestor.
    ///
    /// # Returns
    ///
    /// The matching handler, or `None` if neither `category` nor any ancestor has a
    /// registration.
    #[must_use]
    pub fn get(&self, category: Category) -> Option<&CatchBlock<'a, E>> {
        self.resolve(category).map(|(_, block)| block)
    }

    /// Like [`CatchMap::get`] but also reports which registered category matched.
    #[must_use]
    pub fn resolve(&self, category: Category) -> Option<(Category, &CatchBlock<'a, E>)> {
        category
            .ancestors()
            .find_map(|candidate| self.blocks.get(&candidate).map(|block| (candidate, block)))
    }

    /// Returns the handler registered for exactly `category`, ignoring ancestors.
    #[must_use]
    pub fn get_exact(&self, category: Category) -> Option<&CatchBlock<'a, E>> {
        self.blocks.get(&category)
    }

    /// Returns `true` if `category` itself has a registration.
    #[must_use]
    pub fn contains(&self, category: Category) -> bool {
        self.blocks.contains_key(&category)
    }

    /// Number of registered categories, including [`Category::ANY`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Registered categories in first-registration order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.blocks.keys().copied()
    }
}

impl<E> Default for CatchMap<'_, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for CatchMap<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.blocks.keys()).finish()
    }
}
