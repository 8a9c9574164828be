//! # Catalog Crate
//!
//! Domain records and the collaborator seam for the recommendation core.
//!
//! ## Main Components
//!
//! - **types**: Core records (UserProfile, ContentItem, ContextSignal) and
//!   the `CatalogProvider` trait the engine reads through
//! - **loader**: Load JSON fixtures into an in-memory `CatalogIndex`
//! - **error**: Error types for catalog loading and validation
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogIndex, CatalogProvider, ContentItem, UserProfile};
//!
//! let mut index = CatalogIndex::new();
//! index.insert_user(UserProfile::new("u1"));
//! index.insert_content(ContentItem::new("c1", "Some Film"));
//!
//! let user = index.find_user("u1").unwrap();
//! ```

pub mod error;
pub mod loader;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use loader::load_from_dir;
pub use types::{
    // Type aliases
    ContentId,
    UserId,
    // Core types
    CatalogIndex,
    CatalogProvider,
    ContentItem,
    ContextSignal,
    UserProfile,
    WatchRecord,
};
