use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::domain::assets::{encode_path_segment, AssetResolver};
use crate::domain::catalog_service::CatalogService;
use crate::domain::diary_service::{CreatePostCommand, DiaryError, DiaryService};
use crate::domain::query;
use crate::domain::upload::UploadedImage;
use shared::{CatalogPage, PandaCard, PandaDetail, RedPanda};

const CATALOG_PAGE_SIZE: i64 = 12;
const DETAIL_POSTS_PAGE_SIZE: i64 = 5;
const POSTS_PAGE_SIZE: i64 = 10;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub resolver: AssetResolver,
    pub diary: DiaryService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        catalog: CatalogService,
        resolver: AssetResolver,
        diary: DiaryService,
        config: Arc<AppConfig>,
    ) -> Self {
        Self { catalog, resolver, diary, config }
    }
}

/// Query parameters for the catalog listing
#[derive(Deserialize, Debug)]
pub struct CatalogParams {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// Query parameters for paginated sub-listings
#[derive(Deserialize, Debug)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// Query parameters for the diary post listing
#[derive(Deserialize, Debug)]
pub struct PostsParams {
    #[serde(rename = "pandaName")]
    pub panda_name: Option<String>,
    pub q: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// Field-level message for a rejected operation or a missing resource.
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub field: Option<String>,
    pub message: String,
}

impl ErrorBody {
    fn message(message: impl Into<String>) -> Self {
        Self { field: None, message: message.into() }
    }
}

/// GET /. The catalog is the landing page.
pub async fn home() -> Redirect {
    Redirect::to("/redpandas")
}

/// GET /redpandas. The card catalog: searched, split into in-park and
/// departed partitions, paginated, with thumbnails resolved per card.
pub async fn list_redpandas(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> impl IntoResponse {
    info!("GET /redpandas - params: {:?}", params);

    let page = params.page.unwrap_or(0);
    let size = params.size.unwrap_or(CATALOG_PAGE_SIZE);

    let all = state.catalog.load().await;
    let result = query::query_catalog(&all, params.q.as_deref(), page, size, CATALOG_PAGE_SIZE);

    let in_park_cards = cards_for(&state.resolver, result.in_park.items).await;
    let past_cards = cards_for(&state.resolver, result.past.items).await;

    let effective_size = if size <= 0 { CATALOG_PAGE_SIZE } else { size };
    Json(CatalogPage {
        q: params.q,
        page: page.max(0) as u32,
        size: effective_size as u32,
        in_park_total: result.in_park.total,
        in_park_total_pages: result.in_park.total_pages,
        in_park_cards,
        past_total: result.past.total,
        past_total_pages: result.past.total_pages,
        past_cards,
    })
}

/// GET /redpandas/:name. One animal with its image slide set and its
/// diary posts page.
pub async fn redpanda_detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<PageParams>,
) -> Response {
    info!("GET /redpandas/{} - params: {:?}", name, params);

    let page = params.page.unwrap_or(0);
    let size = params.size.unwrap_or(DETAIL_POSTS_PAGE_SIZE);

    let Some(panda) = state.catalog.find_by_name(&name).await else {
        let body = ErrorBody::message(format!("no such animal: {name}"));
        return (StatusCode::NOT_FOUND, Json(body)).into_response();
    };

    let images = state.resolver.image_urls_or_placeholder(&name).await;

    match state.diary.list_posts(Some(&name), None, page, size).await {
        Ok(posts) => (StatusCode::OK, Json(PandaDetail { panda, images, posts })).into_response(),
        Err(e) => {
            error!("Error listing diary posts for {}: {:?}", name, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing diary posts").into_response()
        }
    }
}

/// GET /pandas/*path. Photos are served from the object store; this route
/// only hands out the redirect.
pub async fn asset_redirect(State(state): State<AppState>, Path(path): Path<String>) -> Redirect {
    let encoded = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(encode_path_segment)
        .collect::<Vec<_>>()
        .join("/");
    let base = state.config.asset_base_url.trim_end_matches('/');
    Redirect::temporary(&format!("{base}/pandas/{encoded}"))
}

/// GET /posts. Diary post listing with exact-name and substring filters.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PostsParams>,
) -> Response {
    info!("GET /posts - params: {:?}", params);

    let page = params.page.unwrap_or(0);
    let size = params.size.unwrap_or(POSTS_PAGE_SIZE);

    match state
        .diary
        .list_posts(params.panda_name.as_deref(), params.q.as_deref(), page, size)
        .await
    {
        Ok(posts) => (StatusCode::OK, Json(posts)).into_response(),
        Err(e) => {
            error!("Error listing diary posts: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing diary posts").into_response()
        }
    }
}

/// GET /posts/postables. The animals a new post can be filed under.
pub async fn list_postables(State(state): State<AppState>) -> Json<Vec<RedPanda>> {
    Json(state.catalog.load_postable().await)
}

/// POST /posts. Create a diary post from a multipart form
/// (pandaName, comment, image).
pub async fn create_post(State(state): State<AppState>, multipart: Multipart) -> Response {
    let command = match read_post_form(multipart).await {
        Ok(command) => command,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorBody::message(message))).into_response();
        }
    };
    info!("POST /posts - pandaName: {}", command.panda_name);

    match state.diary.create_post(command).await {
        Ok(post) => (StatusCode::CREATED, Json(post)).into_response(),
        Err(DiaryError::Validation { field, message }) => {
            let body = ErrorBody { field: Some(field.to_string()), message };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Err(DiaryError::Internal(e)) => {
            error!("Error creating diary post: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save post").into_response()
        }
    }
}

async fn read_post_form(mut multipart: Multipart) -> Result<CreatePostCommand, String> {
    let mut panda_name = String::new();
    let mut comment = String::new();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "pandaName" => panda_name = field.text().await.map_err(|e| e.to_string())?,
            "comment" => comment = field.text().await.map_err(|e| e.to_string())?,
            "image" => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| e.to_string())?;
                // an empty file input still submits a nameless empty part
                if !bytes.is_empty() {
                    image = Some(UploadedImage { filename, content_type, bytes: bytes.to_vec() });
                }
            }
            _ => {}
        }
    }

    Ok(CreatePostCommand { panda_name, comment, image })
}

async fn cards_for(resolver: &AssetResolver, pandas: Vec<RedPanda>) -> Vec<PandaCard> {
    let thumbs = join_all(pandas.iter().map(|p| resolver.first_image_url(&p.name))).await;
    pandas
        .into_iter()
        .zip(thumbs)
        .map(|(panda, thumb_url)| PandaCard { panda, thumb_url })
        .collect()
}
