use sea_orm::{NotSet, Set};
use tracing::{debug, info};

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{FieldMap, MovieFields, MovieFilter},
    store::MovieStore,
};

/// Movie operations as seen by the HTTP layer. Absence of a record is
/// reported here, as [`AppError::NotFound`], rather than left to callers.
#[derive(Clone)]
pub struct MovieService {
    store: MovieStore,
}

impl MovieService {
    pub fn new(store: MovieStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, fields: FieldMap) -> AppResult<movie::Model> {
        let movie = self.store.create(fields).await?;
        info!(movie_id = movie.id, "movie created");
        Ok(movie)
    }

    pub async fn get_one(&self, id: i32) -> AppResult<Option<movie::Model>> {
        self.store.get_one(id).await
    }

    pub async fn get_all(&self) -> AppResult<Vec<movie::Model>> {
        self.store.get_all().await
    }

    pub async fn get_all_by_director(&self, director_id: i32) -> AppResult<Vec<movie::Model>> {
        self.store.get_all_by_director(director_id).await
    }

    pub async fn get_all_by_genre(&self, genre_id: i32) -> AppResult<Vec<movie::Model>> {
        self.store.get_all_by_genre(genre_id).await
    }

    pub async fn get_all_by_year(&self, year: i32) -> AppResult<Vec<movie::Model>> {
        self.store.get_all_by_year(year).await
    }

    pub async fn get_filtered(&self, filter: MovieFilter) -> AppResult<Vec<movie::Model>> {
        debug!(?filter, "listing movies");
        match filter {
            MovieFilter::Director(id) => self.get_all_by_director(id).await,
            MovieFilter::Genre(id) => self.get_all_by_genre(id).await,
            MovieFilter::Year(year) => self.get_all_by_year(year).await,
        }
    }

    /// Replaces every non-key column with the value from `fields`; keys the
    /// map lacks are written as null. The identifier never changes.
    pub async fn update(&self, id: i32, fields: FieldMap) -> AppResult<()> {
        let fields = MovieFields::from_map(fields)?;
        if fields.id.is_some_and(|new_id| new_id != id) {
            debug!(movie_id = id, ignored_id = ?fields.id, "ignoring id in update body");
        }

        let changes = movie::ActiveModel {
            id: NotSet,
            title: Set(fields.title),
            description: Set(fields.description),
            trailer: Set(fields.trailer),
            year: Set(fields.year),
            rating: Set(fields.rating),
            genre_id: Set(fields.genre_id),
            director_id: Set(fields.director_id),
        };

        match self.store.update(id, changes).await? {
            0 => Err(AppError::movie_not_found(id)),
            _ => {
                info!(movie_id = id, "movie updated");
                Ok(())
            },
        }
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        match self.store.delete(id).await? {
            0 => Err(AppError::movie_not_found(id)),
            _ => {
                info!(movie_id = id, "movie deleted");
                Ok(())
            },
        }
    }
}
