use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use axum_extra::extract::Query as MultiQuery;
use axum_helpers::{UuidPath, ValidatedJson};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::error::UserResult;
use crate::models::{Address, UserDetail, UserRequest, UserStatus, UserSummary};
use crate::query::Page;
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_user,
        get_user,
        update_user,
        change_status,
        delete_user,
        list_users,
        list_users_multi_sort,
        search_users,
    ),
    components(schemas(
        UserRequest,
        UserDetail,
        UserSummary,
        Address,
        UserStatus,
        ResponseData<UserDetail>
    )),
    tags(
        (name = "Users", description = "User management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/status", patch(change_status))
        .route("/list", get(list_users))
        .route("/list-multi-sort", get(list_users_multi_sort))
        .route("/search", get(search_users))
        .with_state(shared_service)
}

/// Uniform response envelope: HTTP status echoed in the body, a human
/// message, and the payload when there is one.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResponseData<T> {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ResponseData<T> {
    fn reply(status: StatusCode, message: &str, data: T) -> impl IntoResponse {
        (
            status,
            Json(Self {
                status: status.as_u16(),
                message: message.to_string(),
                data: Some(data),
            }),
        )
    }

}

fn default_page_no() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}

/// Paging parameters with a single optional sort token.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    #[serde(default = "default_page_no")]
    page_no: u64,
    #[serde(default = "default_page_size")]
    page_size: u64,
    sort_by: Option<String>,
}

/// Paging parameters where `sortBy` may repeat.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
struct MultiSortParams {
    #[serde(default = "default_page_no")]
    page_no: u64,
    #[serde(default = "default_page_size")]
    page_size: u64,
    #[serde(default)]
    sort_by: Vec<String>,
}

/// Search parameters: free-text term plus repeatable `sortBy`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
    search: Option<String>,
    #[serde(default = "default_page_no")]
    page_no: u64,
    #[serde(default = "default_page_size")]
    page_size: u64,
    #[serde(default)]
    sort_by: Vec<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
struct StatusParams {
    status: UserStatus,
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = ResponseData<UserDetail>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already in use")
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<UserRequest>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(input).await?;
    Ok(ResponseData::reply(
        StatusCode::CREATED,
        "User created",
        user,
    ))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = ResponseData<UserDetail>),
        (status = 404, description = "User not found")
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
) -> UserResult<impl IntoResponse> {
    let user = service.get_user(id).await?;
    Ok(ResponseData::reply(StatusCode::OK, "User found", user))
}

/// Fully replace a user
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UserRequest,
    responses(
        (status = 202, description = "User updated", body = ResponseData<UserDetail>),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UserRequest>,
) -> UserResult<impl IntoResponse> {
    let user = service.update_user(id, input).await?;
    Ok(ResponseData::reply(
        StatusCode::ACCEPTED,
        "User updated",
        user,
    ))
}

/// Change only a user's account status
#[utoipa::path(
    patch,
    path = "/{id}/status",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        StatusParams
    ),
    responses(
        (status = 202, description = "Status changed", body = ResponseData<UserDetail>),
        (status = 404, description = "User not found")
    )
)]
async fn change_status<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
    Query(params): Query<StatusParams>,
) -> UserResult<impl IntoResponse> {
    let user = service.change_status(id, params.status).await?;
    Ok(ResponseData::reply(
        StatusCode::ACCEPTED,
        "User status changed",
        user,
    ))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = ResponseData<UserDetail>),
        (status = 404, description = "User not found")
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
) -> UserResult<impl IntoResponse> {
    service.delete_user(id).await?;

    // HTTP 200 so the envelope survives the wire (a 204 response may not
    // carry a body); the body's status field reports the deletion as 204.
    Ok((
        StatusCode::OK,
        Json(ResponseData::<UserDetail> {
            status: StatusCode::NO_CONTENT.as_u16(),
            message: "User deleted".to_string(),
            data: None,
        }),
    ))
}

/// One page of users, at most one sort token
#[utoipa::path(
    get,
    path = "/list",
    tag = "Users",
    params(ListParams),
    responses(
        (status = 200, description = "Page of users", body = ResponseData<UserDetail>),
        (status = 400, description = "Invalid paging or sort parameters")
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Query(params): Query<ListParams>,
) -> UserResult<impl IntoResponse> {
    let sort: Vec<String> = params.sort_by.into_iter().collect();
    let page = service
        .list_users(params.page_no, params.page_size, &sort)
        .await?;
    Ok(ResponseData::reply(StatusCode::OK, "Users listed", page))
}

/// One page of users, `sortBy` repeatable for multi-field ordering
#[utoipa::path(
    get,
    path = "/list-multi-sort",
    tag = "Users",
    params(MultiSortParams),
    responses(
        (status = 200, description = "Page of users", body = ResponseData<UserDetail>),
        (status = 400, description = "Invalid paging or sort parameters")
    )
)]
async fn list_users_multi_sort<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    MultiQuery(params): MultiQuery<MultiSortParams>,
) -> UserResult<impl IntoResponse> {
    let page = service
        .list_users(params.page_no, params.page_size, &params.sort_by)
        .await?;
    Ok(ResponseData::reply(StatusCode::OK, "Users listed", page))
}

/// Search users by name or email substring
#[utoipa::path(
    get,
    path = "/search",
    tag = "Users",
    params(SearchParams),
    responses(
        (status = 200, description = "Page of matching users", body = ResponseData<UserSummary>),
        (status = 400, description = "Invalid paging or sort parameters")
    )
)]
async fn search_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    MultiQuery(params): MultiQuery<SearchParams>,
) -> UserResult<impl IntoResponse> {
    let page = service
        .search_users(
            params.page_no,
            params.page_size,
            &params.sort_by,
            params.search,
        )
        .await?;
    Ok(ResponseData::reply(StatusCode::OK, "Users found", page))
}
