//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably by the domain layer.

use anyhow::Result;
use async_trait::async_trait;
use shared::DiaryPost;

/// A submitted diary post before the store has assigned its id and
/// creation timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDiaryPost {
    pub panda_name: String,
    pub comment: String,
    pub image_filename: Option<String>,
}

/// One page of diary posts together with the total match count, so callers
/// can compute page counts without a second query.
#[derive(Debug, Clone, PartialEq)]
pub struct PostPage {
    pub posts: Vec<DiaryPost>,
    pub total: i64,
}

/// Trait defining the interface for diary post storage operations
///
/// All listing operations page with a zero-based page index and return posts
/// ordered by creation timestamp descending (most recent first).
#[async_trait]
pub trait DiaryPostStorage: Send + Sync {
    /// Durably append a post; the store assigns the id and creation timestamp
    async fn save(&self, post: &NewDiaryPost) -> Result<DiaryPost>;

    /// List all posts
    async fn find_all(&self, page: u32, size: u32) -> Result<PostPage>;

    /// List posts for one animal (exact name match)
    async fn find_by_panda_name(&self, name: &str, page: u32, size: u32) -> Result<PostPage>;

    /// List posts whose animal name contains `q`, ignoring case
    async fn find_by_panda_name_containing_ignore_case(&self, q: &str, page: u32, size: u32) -> Result<PostPage>;
}
