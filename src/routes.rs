use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use tracing::debug;

use crate::{
    AppState,
    entities::{director, genre, movie},
    error::{AppError, AppResult},
    models::{FieldMap, MovieQuery},
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/{id}", get(get_movie).put(update_movie).delete(delete_movie))
        .route("/genres", get(list_genres))
        .route("/genres/{id}", get(get_genre))
        .route("/directors", get(list_directors))
        .route("/directors/{id}", get(get_director))
        .with_state(state)
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MovieQuery>,
) -> AppResult<Json<Vec<movie::Model>>> {
    let movies = match q.filter() {
        Some(Ok(filter)) => state.movies.get_filtered(filter).await?,
        Some(Err(raw)) => {
            debug!(value = %raw, "filter value is not an integer, nothing matches");
            Vec::new()
        },
        None => state.movies.get_all().await?,
    };
    Ok(Json(movies))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Json(fields): Json<FieldMap>,
) -> AppResult<impl IntoResponse> {
    let movie = state.movies.create(fields).await?;
    Ok((StatusCode::CREATED, [(header::LOCATION, format!("/movies/{}", movie.id))]))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<movie::Model>> {
    let movie = state.movies.get_one(id).await?.ok_or(AppError::movie_not_found(id))?;
    Ok(Json(movie))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(fields): Json<FieldMap>,
) -> AppResult<StatusCode> {
    state.movies.update(id, fields).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.movies.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_genres(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<genre::Model>>> {
    Ok(Json(state.references.genres().await?))
}

pub async fn get_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<genre::Model>> {
    let genre =
        state.references.genre(id).await?.ok_or(AppError::NotFound { kind: "genre", id })?;
    Ok(Json(genre))
}

pub async fn list_directors(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<director::Model>>> {
    Ok(Json(state.references.directors().await?))
}

pub async fn get_director(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<director::Model>> {
    let director =
        state.references.director(id).await?.ok_or(AppError::NotFound { kind: "director", id })?;
    Ok(Json(director))
}
