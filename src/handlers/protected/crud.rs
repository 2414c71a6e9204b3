// handlers/protected/crud.rs - generic CRUD handlers for id-keyed entities
//
// Mounted per entity with the policy as a type parameter, for example
// `get(crud::list::<Branch, AdminPolicy>)`.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::PolicyGuard;
use crate::database::{EntityModel, Repository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Authorized};

/// GET /api/{entity}
pub async fn list<T, P>(_auth: Authorized<P>, State(state): State<AppState>) -> ApiResult<Vec<T>>
where
    T: EntityModel + Clone,
    P: PolicyGuard,
{
    let records = Repository::<T>::new(state.ctx).list().await?;
    Ok(ApiResponse::success(records))
}

/// GET /api/{entity}/:id
pub async fn show<T, P>(_auth: Authorized<P>, State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<T>
where
    T: EntityModel + Clone,
    P: PolicyGuard,
{
    let record = Repository::<T>::new(state.ctx).get(id).await?;
    Ok(ApiResponse::success(record))
}

/// POST /api/{entity}
pub async fn create<T, P>(_auth: Authorized<P>, State(state): State<AppState>, Json(record): Json<T>) -> ApiResult<T>
where
    T: EntityModel + Clone,
    P: PolicyGuard,
{
    let record = Repository::<T>::new(state.ctx).create(record).await?;
    Ok(ApiResponse::created(record))
}

/// PUT /api/{entity}/:id - fields present in the body replace stored ones
pub async fn update<T, P>(
    _auth: Authorized<P>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<Value>,
) -> ApiResult<T>
where
    T: EntityModel + Clone,
    P: PolicyGuard,
{
    let repo = Repository::<T>::new(state.ctx);
    let current = repo.get(id).await?;
    let merged = merge(&current, changes)?;
    let record = repo.update(merged).await?;
    Ok(ApiResponse::success(record))
}

/// DELETE /api/{entity}/:id
pub async fn delete<T, P>(_auth: Authorized<P>, State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()>
where
    T: EntityModel + Clone,
    P: PolicyGuard,
{
    Repository::<T>::new(state.ctx).delete(id).await?;
    Ok(ApiResponse::no_content())
}

/// Overlay the fields of `changes` on `current`. Key fields are ignored so a
/// body can never move a record to another key.
pub fn merge<T: EntityModel>(current: &T, changes: Value) -> Result<T, ApiError> {
    let Value::Object(changes) = changes else {
        return Err(ApiError::bad_request("Request body must be a JSON object"));
    };

    let mut stored = serde_json::to_value(current)
        .map_err(|e| ApiError::internal_server_error(format!("Failed to serialize record: {}", e)))?;
    let key_columns = ["id", "user_id", "task_id", "project_id"];
    let is_link = matches!(current.key(), crate::database::KeyValue::Pair(..));

    if let Value::Object(fields) = &mut stored {
        for (name, value) in changes {
            let is_key = name == "id" || (is_link && key_columns.contains(&name.as_str()));
            if !is_key {
                fields.insert(name, value);
            }
        }
    }

    serde_json::from_value(stored).map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))
}
