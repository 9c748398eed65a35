//! In-memory REST fixture with users and their nested projects.
//!
//! Records are free-form JSON objects. Ids are sequential indices per
//! collection starting at 0; deleted slots are tombstoned so ids stay stable.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

pub type Record = Map<String, Value>;

#[derive(Default)]
struct User {
    record: Record,
    projects: Vec<Option<Record>>,
}

#[derive(Default)]
pub struct Store {
    users: Vec<Option<User>>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Deserialize)]
struct ProjectPath {
    user: usize,
    id: usize,
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/", delete(reset))
        .route("/users", get(list_users).post(create_user).delete(remove_users))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route(
            "/users/{user}/projects",
            get(list_projects).post(create_project).delete(remove_projects),
        )
        .route(
            "/users/{user}/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn live(slots: &[Option<Record>]) -> Vec<Record> {
    slots.iter().flatten().cloned().collect()
}

fn with_id(mut record: Record, id: usize) -> Record {
    record.insert("id".to_string(), Value::from(id));
    record
}

fn user_mut(store: &mut Store, id: usize) -> Result<&mut User, StatusCode> {
    store
        .users
        .get_mut(id)
        .and_then(Option::as_mut)
        .ok_or(StatusCode::NOT_FOUND)
}

fn user_ref(store: &Store, id: usize) -> Result<&User, StatusCode> {
    store
        .users
        .get(id)
        .and_then(Option::as_ref)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn reset(State(db): State<Db>) -> StatusCode {
    db.write().await.users.clear();
    tracing::debug!("store reset");
    StatusCode::NO_CONTENT
}

// --- users ---

async fn list_users(State(db): State<Db>) -> Json<Vec<Record>> {
    let store = db.read().await;
    Json(
        store
            .users
            .iter()
            .flatten()
            .map(|user| user.record.clone())
            .collect(),
    )
}

async fn remove_users(State(db): State<Db>) -> StatusCode {
    db.write().await.users.clear();
    StatusCode::NO_CONTENT
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<Record>,
) -> (StatusCode, Json<Record>) {
    let mut store = db.write().await;
    let id = store.users.len();
    let record = with_id(input, id);
    store.users.push(Some(User {
        record: record.clone(),
        projects: Vec::new(),
    }));
    tracing::debug!(id, "user created");
    (StatusCode::CREATED, Json(record))
}

async fn get_user(State(db): State<Db>, Path(id): Path<usize>) -> Result<Json<Record>, StatusCode> {
    let store = db.read().await;
    user_ref(&store, id).map(|user| Json(user.record.clone()))
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<usize>,
    Json(input): Json<Record>,
) -> Result<Json<Record>, StatusCode> {
    let mut store = db.write().await;
    let user = user_mut(&mut store, id)?;
    user.record = with_id(input, id);
    Ok(Json(user.record.clone()))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<usize>) -> StatusCode {
    let mut store = db.write().await;
    match store.users.get_mut(id) {
        Some(slot @ Some(_)) => {
            *slot = None;
            StatusCode::NO_CONTENT
        }
        _ => StatusCode::NOT_FOUND,
    }
}

// --- projects ---

async fn list_projects(
    State(db): State<Db>,
    Path(user): Path<usize>,
) -> Result<Json<Vec<Record>>, StatusCode> {
    let store = db.read().await;
    user_ref(&store, user).map(|user| Json(live(&user.projects)))
}

async fn remove_projects(State(db): State<Db>, Path(user): Path<usize>) -> StatusCode {
    let mut store = db.write().await;
    match user_mut(&mut store, user) {
        Ok(user) => {
            user.projects.clear();
            StatusCode::NO_CONTENT
        }
        Err(status) => status,
    }
}

async fn create_project(
    State(db): State<Db>,
    Path(user): Path<usize>,
    Json(input): Json<Record>,
) -> Result<(StatusCode, Json<Record>), StatusCode> {
    let mut store = db.write().await;
    let owner = user_mut(&mut store, user)?;
    let id = owner.projects.len();
    let record = with_id(input, id);
    owner.projects.push(Some(record.clone()));
    tracing::debug!(user, id, "project created");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_project(
    State(db): State<Db>,
    Path(path): Path<ProjectPath>,
) -> Result<Json<Record>, StatusCode> {
    let store = db.read().await;
    let owner = user_ref(&store, path.user)?;
    owner
        .projects
        .get(path.id)
        .and_then(Option::as_ref)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_project(
    State(db): State<Db>,
    Path(path): Path<ProjectPath>,
    Json(input): Json<Record>,
) -> Result<Json<Record>, StatusCode> {
    let mut store = db.write().await;
    let owner = user_mut(&mut store, path.user)?;
    let slot = owner
        .projects
        .get_mut(path.id)
        .and_then(Option::as_mut)
        .ok_or(StatusCode::NOT_FOUND)?;
    *slot = with_id(input, path.id);
    Ok(Json(slot.clone()))
}

async fn delete_project(State(db): State<Db>, Path(path): Path<ProjectPath>) -> StatusCode {
    let mut store = db.write().await;
    let Ok(owner) = user_mut(&mut store, path.user) else {
        return StatusCode::NOT_FOUND;
    };
    match owner.projects.get_mut(path.id) {
        Some(slot @ Some(_)) => {
            *slot = None;
            StatusCode::NO_CONTENT
        }
        _ => StatusCode::NOT_FOUND,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn with_id_overrides_client_id() {
        let stored = with_id(record(json!({ "id": "spoofed", "name": "Name" })), 3);
        assert_eq!(Value::Object(stored), json!({ "id": 3, "name": "Name" }));
    }

    #[test]
    fn live_skips_tombstones() {
        let slots = vec![
            Some(record(json!({ "id": 0 }))),
            None,
            Some(record(json!({ "id": 2 }))),
        ];
        let ids: Vec<_> = live(&slots).into_iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(0), json!(2)]);
    }

    #[test]
    fn missing_user_is_not_found() {
        let mut store = Store::default();
        assert_eq!(user_mut(&mut store, 0).err(), Some(StatusCode::NOT_FOUND));
        store.users.push(None);
        assert_eq!(user_ref(&store, 0).err(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn project_path_deserializes_named_params() {
        let path: ProjectPath = serde_json::from_value(json!({ "user": 1, "id": 2 })).unwrap();
        assert_eq!((path.user, path.id), (1, 2));
    }
}
