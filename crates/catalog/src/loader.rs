//! Load catalog fixtures from JSON files.
//!
//! The demo CLI and integration tests read `users.json` and `content.json`
//! from a data directory. The real service layer supplies records through
//! `CatalogProvider` instead.

use crate::error::{CatalogError, Result};
use crate::types::{CatalogIndex, ContentItem, UserProfile};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load a CatalogIndex from a directory containing `users.json` and
/// `content.json`.
pub fn load_from_dir(dir: &Path) -> Result<CatalogIndex> {
    let users: Vec<UserProfile> = load_json(&dir.join("users.json"))?;
    let content: Vec<ContentItem> = load_json(&dir.join("content.json"))?;

    let mut index = CatalogIndex::new();
    for user in users {
        index.insert_user(user);
    }
    for item in content {
        validate_content(&item)?;
        index.insert_content(item);
    }
    Ok(index)
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CatalogError::Json {
        file: path.display().to_string(),
        source,
    })
}

/// Ratings outside [0, 10] indicate a corrupt fixture, not a neutral default.
fn validate_content(item: &ContentItem) -> Result<()> {
    if let Some(rating) = item.rating {
        if !(0.0..=10.0).contains(&rating) {
            return Err(CatalogError::InvalidValue {
                field: format!("content[{}].rating", item.id),
                value: rating.to_string(),
            });
        }
    }
    Ok(())
}
