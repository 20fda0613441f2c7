//! Page tree abstraction for navigation menus.
//!
//! This crate provides a [`PageTree`] trait over the content platform's page
//! storage. Pages are arranged in a materialized-path tree; menus read them
//! through composable [`PageFilter`] expressions and never write. This enables:
//!
//! - **Unit testing** menus without a database
//! - **Backend flexibility** (SQL, search index, in-memory snapshot)
//! - **Clean separation** between menu resolution and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Page`] and [`Site`] records
//! - [`path`] helpers for materialized path arithmetic
//! - [`PageFilter`] and [`PageQuery`] describing what to fetch
//! - [`PageTree`] trait with `query()`, `get()`, `specific()` and `ancestors()`
//! - [`MockPageTree`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use nav_tree::{PageFilter, PageQuery, PageTree};
//!
//! let filter = PageFilter::base().and(PageFilter::branch(&section.path, section.depth, section.depth + 2));
//! for page in tree.query(&PageQuery::new(filter))? {
//!     println!("{} {}", page.path, page.title);
//! }
//! ```

mod filter;
#[cfg(feature = "mock")]
mod mock;
mod page;
pub mod path;
mod tree;

pub use filter::{PageFilter, PageQuery};
#[cfg(feature = "mock")]
pub use mock::{MockPageTree, NewPage};
pub use page::{Page, PageId, Site, SiteId, SpecificFields};
pub use tree::{PageTree, TreeError, TreeErrorKind};
