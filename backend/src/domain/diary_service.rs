//! Visitor diary posts: validation, creation and listing.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::storage::traits::{DiaryPostStorage, NewDiaryPost, PostPage};
use shared::{DiaryPage, DiaryPost};

use super::query;
use super::upload::{ImageStore, UploadError, UploadedImage};

/// Matches the column bound of the persisted comment field.
pub const MAX_COMMENT_LENGTH: usize = 1000;
const DEFAULT_PAGE_SIZE: i64 = 10;

/// A submitted diary post before validation.
#[derive(Debug, Clone)]
pub struct CreatePostCommand {
    pub panda_name: String,
    pub comment: String,
    pub image: Option<UploadedImage>,
}

/// Rejected operations carry the offending field so the form can show a
/// message next to it. Nothing is persisted when validation rejects.
#[derive(Debug, thiserror::Error)]
pub enum DiaryError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DiaryError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { field, message: message.into() }
    }
}

/// Service for managing visitor diary posts
#[derive(Clone)]
pub struct DiaryService {
    repository: Arc<dyn DiaryPostStorage>,
    images: ImageStore,
}

impl DiaryService {
    pub fn new(repository: Arc<dyn DiaryPostStorage>, images: ImageStore) -> Self {
        Self { repository, images }
    }

    /// Validate and persist a post. A photo is required and must carry an
    /// image content type; the stored filename is attached to the post.
    pub async fn create_post(&self, command: CreatePostCommand) -> Result<DiaryPost, DiaryError> {
        let panda_name = command.panda_name.trim().to_string();
        if panda_name.is_empty() {
            return Err(DiaryError::validation("pandaName", "an animal name is required"));
        }
        if command.comment.chars().count() > MAX_COMMENT_LENGTH {
            return Err(DiaryError::validation(
                "comment",
                format!("comments are limited to {MAX_COMMENT_LENGTH} characters"),
            ));
        }
        let Some(image) = command.image else {
            return Err(DiaryError::validation("image", "a photo is required"));
        };

        let image_filename = self.images.store(&image).map_err(|e| match e {
            UploadError::NotAnImage => {
                warn!("rejected diary post for {}: non-image upload", panda_name);
                DiaryError::validation("image", "only image uploads are accepted")
            }
            UploadError::Io(io) => DiaryError::Internal(io.into()),
        })?;

        let post = NewDiaryPost {
            panda_name,
            comment: command.comment.trim().to_string(),
            image_filename: Some(image_filename),
        };
        let saved = self.repository.save(&post).await?;
        info!("created diary post {} for {}", saved.id, saved.panda_name);
        Ok(saved)
    }

    /// Post listing, newest first. An exact animal-name filter wins over a
    /// substring search; with neither, every post is listed.
    pub async fn list_posts(
        &self,
        panda_name: Option<&str>,
        q: Option<&str>,
        page: i64,
        size: i64,
    ) -> Result<DiaryPage> {
        let page = page.max(0) as u32;
        let size = if size <= 0 { DEFAULT_PAGE_SIZE } else { size } as u32;

        let result = if let Some(name) = non_blank(panda_name) {
            self.repository.find_by_panda_name(name, page, size).await?
        } else if let Some(q) = non_blank(q) {
            self.repository
                .find_by_panda_name_containing_ignore_case(q, page, size)
                .await?
        } else {
            self.repository.find_all(page, size).await?
        };

        Ok(to_page(result, page, size))
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn to_page(result: PostPage, page: u32, size: u32) -> DiaryPage {
    DiaryPage {
        total_pages: query::total_pages(result.total as usize, i64::from(size), DEFAULT_PAGE_SIZE),
        posts: result.posts,
        page,
        size,
        total: result.total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::storage::sqlite::SqliteDiaryPostRepository;
    use tempfile::tempdir;

    async fn setup_test() -> (DiaryService, tempfile::TempDir) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let repository = SqliteDiaryPostRepository::new(db);
        let dir = tempdir().unwrap();
        let images = ImageStore::new(dir.path().to_path_buf()).unwrap();
        (DiaryService::new(Arc::new(repository), images), dir)
    }

    fn photo() -> UploadedImage {
        UploadedImage {
            filename: Some("photo.jpg".to_string()),
            content_type: Some("image/jpeg".to_string()),
            bytes: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn test_create_post_stores_image_and_saves() {
        let (service, dir) = setup_test().await;

        let command = CreatePostCommand {
            panda_name: " カイ ".to_string(),
            comment: "今日も元気でした".to_string(),
            image: Some(photo()),
        };
        let saved = service.create_post(command).await.unwrap();

        assert_eq!(saved.panda_name, "カイ");
        let stored = saved.image_filename.expect("image filename attached");
        assert!(stored.ends_with(".jpg"));
        assert!(dir.path().join(&stored).exists());
    }

    #[tokio::test]
    async fn test_create_post_requires_panda_name() {
        let (service, _dir) = setup_test().await;

        let command = CreatePostCommand {
            panda_name: "  ".to_string(),
            comment: "comment".to_string(),
            image: Some(photo()),
        };
        let err = service.create_post(command).await.unwrap_err();
        assert!(matches!(err, DiaryError::Validation { field: "pandaName", .. }));
    }

    #[tokio::test]
    async fn test_create_post_requires_image() {
        let (service, _dir) = setup_test().await;

        let command = CreatePostCommand {
            panda_name: "カイ".to_string(),
            comment: "comment".to_string(),
            image: None,
        };
        let err = service.create_post(command).await.unwrap_err();
        assert!(matches!(err, DiaryError::Validation { field: "image", .. }));
    }

    #[tokio::test]
    async fn test_create_post_rejects_non_image_upload() {
        let (service, _dir) = setup_test().await;

        let command = CreatePostCommand {
            panda_name: "カイ".to_string(),
            comment: "comment".to_string(),
            image: Some(UploadedImage {
                filename: Some("notes.txt".to_string()),
                content_type: Some("text/plain".to_string()),
                bytes: vec![1],
            }),
        };
        let err = service.create_post(command).await.unwrap_err();
        assert!(matches!(err, DiaryError::Validation { field: "image", .. }));

        // nothing was persisted
        let page = service.list_posts(None, None, 0, 10).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_create_post_rejects_overlong_comment() {
        let (service, _dir) = setup_test().await;

        let command = CreatePostCommand {
            panda_name: "カイ".to_string(),
            comment: "あ".repeat(MAX_COMMENT_LENGTH + 1),
            image: Some(photo()),
        };
        let err = service.create_post(command).await.unwrap_err();
        assert!(matches!(err, DiaryError::Validation { field: "comment", .. }));
    }

    #[tokio::test]
    async fn test_list_posts_filters_and_pages() {
        let (service, _dir) = setup_test().await;

        for (name, comment) in [("カイ", "one"), ("リン", "two"), ("カイ", "three")] {
            let command = CreatePostCommand {
                panda_name: name.to_string(),
                comment: comment.to_string(),
                image: Some(photo()),
            };
            service.create_post(command).await.unwrap();
        }

        let all = service.list_posts(None, None, 0, 10).await.unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.total_pages, 1);
        // newest first
        assert_eq!(all.posts[0].comment, "three");

        let kai = service.list_posts(Some("カイ"), None, 0, 10).await.unwrap();
        assert_eq!(kai.total, 2);

        // exact filter wins over substring search
        let both = service.list_posts(Some("カイ"), Some("リン"), 0, 10).await.unwrap();
        assert_eq!(both.total, 2);

        let searched = service.list_posts(None, Some("リン"), 0, 10).await.unwrap();
        assert_eq!(searched.total, 1);

        // defaults kick in for non-positive paging values
        let defaulted = service.list_posts(None, None, -1, 0).await.unwrap();
        assert_eq!(defaulted.page, 0);
        assert_eq!(defaulted.size, 10);
    }
}
