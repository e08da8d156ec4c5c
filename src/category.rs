//! Error categories and their ancestor hierarchy.
//!
//! A [`Category`] names a class of failures. Every category except [`Category::ANY`]
//! declares a parent, so the set of categories forms a tree rooted at `ANY`. Catch
//! blocks are registered against categories, and a raised failure is routed to the
//! handler of its most specific registered ancestor.
//!
//! # Declaring a Hierarchy
//!
//! Categories are plain `const` values, so a hierarchy is declared once and shared
//! by reference:
//!
//! ```rust
//! use trycatcher::Category;
//!
//! const IO_FAILURE: Category = Category::new("IOFailure", &Category::ANY);
//! const FILE_NOT_FOUND: Category = Category::new("FileNotFound", &IO_FAILURE);
//!
//! assert!(FILE_NOT_FOUND.is_a(&IO_FAILURE));
//! assert!(FILE_NOT_FOUND.is_a(&Category::ANY));
//! assert!(!IO_FAILURE.is_a(&FILE_NOT_FOUND));
//! ```
//!
//! # Identity
//!
//! Two categories are equal when their names and their whole parent chains are
//! equal. Reusing a name under a different parent produces a distinct category.

use std::fmt;

/// A classification of failures, positioned in a tree rooted at [`Category::ANY`].
///
/// Categories are cheap `Copy` values: a static name and a reference to the parent.
/// Lookup walks from a category towards the root using [`Category::ancestors`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Category {
    name: &'static str,
    parent: Option<&'static Category>,
}

impl Category {
    /// The root category. Every other category descends from it.
    pub const ANY: Category = Category {
        name: "Any",
        parent: None,
    };

    /// Creates a category named `name` whose parent is `parent`.
    ///
    /// # Arguments
    ///
    /// * `name` - Human readable name, used in logs and error messages
    /// * `parent` - The direct ancestor of the new category
    #[must_use]
    pub const fn new(name: &'static str, parent: &'static Category) -> Self {
        Category {
            name,
            parent: Some(parent),
        }
    }

    /// Returns the category's name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the direct parent, or `None` for [`Category::ANY`].
    #[must_use]
    pub const fn parent(&self) -> Option<&'static Category> {
        self.parent
    }

    /// Returns `true` if this is the root category.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Iterates from this category up to the root, most specific first.
    ///
    /// The iterator always yields `self` first and [`Category::ANY`] last.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors { next: Some(*self) }
    }

    /// Returns `true` if `other` is this category or one of its ancestors.
    #[must_use]
    pub fn is_a(&self, other: &Category) -> bool {
        self.ancestors().any(|category| category == *other)
    }

    /// Number of edges between this category and the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over a category and its ancestors, returned by [`Category::ancestors`].
#[derive(Clone, Debug)]
pub struct Ancestors {
    next: Option<Category>,
}

impl Iterator for Ancestors {
    type Item = Category;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.copied();
        Some(current)
    }
}

/// A failure value that knows its most-derived [`Category`].
///
/// Implement this for the error type a try block returns. The reported category is
/// the starting point of handler resolution.
///
/// # Examples
///
/// ```rust
/// use trycatcher::{Categorized, Category};
///
/// const PARSE: Category = Category::new("ParseError", &Category::ANY);
///
/// #[derive(Debug)]
/// struct ParseFailure {
///     line: usize,
/// }
///
/// impl Categorized for ParseFailure {
///     fn category(&self) -> Category {
///         PARSE
///     }
/// }
///
/// assert_eq!(ParseFailure { line: 3 }.category(), PARSE);
/// ```
pub trait Categorized {
    /// Returns the most specific category describing this failure.
    fn category(&self) -> Category;
}

impl Categorized for Category {
    fn category(&self) -> Category {
        *self
    }
}

impl<T: Categorized + ?Sized> Categorized for Box<T> {
    fn category(&self) -> Category {
        (**self).category()
    }
}
