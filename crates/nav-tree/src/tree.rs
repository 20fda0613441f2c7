//! Page tree trait and error types.
//!
//! Provides the [`PageTree`] trait that menus use to read pages, along with
//! [`TreeError`] for unified error handling across backends.
//!
//! # Query Convention
//!
//! Backends receive a [`PageQuery`] and must:
//! - return rows ordered by materialized path
//! - return base-type rows (`specific == None`) unless the query asks for
//!   specific rows
//! - have no side effects

use std::collections::BTreeSet;

use crate::filter::{PageFilter, PageQuery};
use crate::page::{Page, PageId};
use crate::path::ancestor_paths;

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum TreeErrorKind {
    /// Page does not exist.
    NotFound,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Operation timed out.
    Timeout,
    /// Stored data violates tree invariants.
    Corrupt,
    /// Other/unknown error category.
    Other,
}

/// Tree error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct TreeError {
    /// Semantic error category.
    pub kind: TreeErrorKind,
    /// Page context (if applicable).
    pub page_id: Option<PageId>,
    /// Backend identifier (e.g., "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TreeError {
    /// Create a new tree error.
    #[must_use]
    pub fn new(kind: TreeErrorKind) -> Self {
        Self {
            kind,
            page_id: None,
            backend: None,
            source: None,
        }
    }

    /// Attach page context.
    #[must_use]
    pub fn with_page(mut self, id: PageId) -> Self {
        self.page_id = Some(id);
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error for a page.
    #[must_use]
    pub fn not_found(id: PageId) -> Self {
        Self::new(TreeErrorKind::NotFound).with_page(id)
    }
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (page: 42)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            TreeErrorKind::NotFound => "Page not found",
            TreeErrorKind::Unavailable => "Unavailable",
            TreeErrorKind::Timeout => "Timeout",
            TreeErrorKind::Corrupt => "Corrupt tree",
            TreeErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(id) = self.page_id {
            write!(f, " (page: {id})")?;
        }

        Ok(())
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Read access to the content platform's page tree.
///
/// Implementations may block on network or database round-trips. Menus call
/// them synchronously and never retry.
pub trait PageTree: Send + Sync {
    /// Run a query and return matching rows in path order.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if the backend fails.
    fn query(&self, query: &PageQuery) -> Result<Vec<Page>, TreeError>;

    /// Fetch a single base-type row by id.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if the backend fails. A missing page is
    /// `Ok(None)`.
    fn get(&self, id: PageId) -> Result<Option<Page>, TreeError>;

    /// Resolve one row to its concrete type.
    ///
    /// Rows that are already specific are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] with [`TreeErrorKind::NotFound`] if the page no
    /// longer exists.
    fn specific(&self, page: &Page) -> Result<Page, TreeError>;

    /// Strict ancestors of a page, shallowest first.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if the backend fails.
    fn ancestors(&self, page: &Page) -> Result<Vec<Page>, TreeError> {
        let paths: BTreeSet<String> = ancestor_paths(&page.path)
            .into_iter()
            .map(str::to_owned)
            .collect();
        if paths.is_empty() {
            return Ok(Vec::new());
        }
        self.query(&PageQuery::new(PageFilter::PathIn(paths)))
    }
}
