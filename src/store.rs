use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IdenStatic, Iterable,
    NotSet, QueryFilter, Set,
};
use tracing::debug;

use crate::{
    entities::{director, genre, movie},
    error::AppResult,
    models::{FieldMap, MovieFields},
};

/// Row-level access to the `movie` table. Every write is its own statement,
/// committed before the call returns.
#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, fields: FieldMap) -> AppResult<movie::Model> {
        if let Some(key) =
            fields.keys().find(|key| !movie::Column::iter().any(|col| col.as_str() == key.as_str()))
        {
            return Err(DbErr::Custom(format!("movie has no column named `{key}`")).into());
        }

        let fields = MovieFields::from_map(fields)?;
        let model = movie::ActiveModel {
            id: fields.id.map_or(NotSet, Set),
            title: Set(fields.title),
            description: Set(fields.description),
            trailer: Set(fields.trailer),
            year: Set(fields.year),
            rating: Set(fields.rating),
            genre_id: Set(fields.genre_id),
            director_id: Set(fields.director_id),
        };

        let created = model.insert(&self.db).await?;
        debug!(movie_id = created.id, "movie inserted");
        Ok(created)
    }

    pub async fn get_one(&self, id: i32) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn get_all(&self) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find().all(&self.db).await?)
    }

    pub async fn get_all_by_director(&self, director_id: i32) -> AppResult<Vec<movie::Model>> {
        self.find_where(movie::Column::DirectorId, director_id).await
    }

    pub async fn get_all_by_genre(&self, genre_id: i32) -> AppResult<Vec<movie::Model>> {
        self.find_where(movie::Column::GenreId, genre_id).await
    }

    pub async fn get_all_by_year(&self, year: i32) -> AppResult<Vec<movie::Model>> {
        self.find_where(movie::Column::Year, year).await
    }

    /// Writes every `Set` column of `changes` to the row with `id` in a single
    /// `UPDATE`. Returns the number of rows touched (0 or 1).
    pub async fn update(&self, id: i32, changes: movie::ActiveModel) -> AppResult<u64> {
        let result = movie::Entity::update_many()
            .set(changes)
            .filter(movie::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        debug!(movie_id = id, rows = result.rows_affected, "movie update executed");
        Ok(result.rows_affected)
    }

    /// Single `DELETE` by id. Returns the number of rows removed (0 or 1).
    pub async fn delete(&self, id: i32) -> AppResult<u64> {
        let result = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        debug!(movie_id = id, rows = result.rows_affected, "movie delete executed");
        Ok(result.rows_affected)
    }

    async fn find_where(&self, column: movie::Column, value: i32) -> AppResult<Vec<movie::Model>> {
        let rows = movie::Entity::find().filter(column.eq(value)).all(&self.db).await?;
        debug!(column = column.as_str(), value, count = rows.len(), "filtered movies");
        Ok(rows)
    }
}

/// Read-only lookups for the tables movies point at.
#[derive(Clone)]
pub struct ReferenceStore {
    db: DatabaseConnection,
}

impl ReferenceStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn genres(&self) -> AppResult<Vec<genre::Model>> {
        Ok(genre::Entity::find().all(&self.db).await?)
    }

    pub async fn genre(&self, id: i32) -> AppResult<Option<genre::Model>> {
        Ok(genre::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn directors(&self) -> AppResult<Vec<director::Model>> {
        Ok(director::Entity::find().all(&self.db).await?)
    }

    pub async fn director(&self, id: i32) -> AppResult<Option<director::Model>> {
        Ok(director::Entity::find_by_id(id).one(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::ConnectOptions;
    use serde_json::json;
    use tokio::task::JoinSet;

    use super::*;
    use crate::{
        db::{connect_and_migrate, connect_in_memory},
        error::AppError,
    };

    fn fields(value: serde_json::Value) -> FieldMap {
        value.as_object().cloned().unwrap()
    }

    async fn store() -> MovieStore {
        MovieStore::new(connect_in_memory().await)
    }

    fn ids(movies: Vec<movie::Model>) -> Vec<i32> {
        let mut ids: Vec<i32> = movies.into_iter().map(|m| m.id).collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn create_then_get_one_returns_supplied_fields() {
        let store = store().await;
        let created = store
            .create(fields(json!({"title": "Dune", "year": 2021, "genre_id": 1, "director_id": 2})))
            .await
            .unwrap();

        let loaded = store.get_one(created.id).await.unwrap().unwrap();
        assert_eq!(loaded.title.as_deref(), Some("Dune"));
        assert_eq!(loaded.year, Some(2021));
        assert_eq!(loaded.genre_id, Some(1));
        assert_eq!(loaded.director_id, Some(2));
        assert_eq!(loaded.description, None);
        assert_eq!(loaded.trailer, None);
        assert_eq!(loaded.rating, None);
        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn create_honours_explicit_id() {
        let store = store().await;
        let created = store.create(fields(json!({"id": 42, "title": "Heat"}))).await.unwrap();
        assert_eq!(created.id, 42);
        assert!(store.get_one(42).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn create_rejects_unknown_column() {
        let store = store().await;
        let err = store.create(fields(json!({"title": "Dune", "budget": 1}))).await.unwrap_err();
        assert!(matches!(err, AppError::Db(_)));
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_one_missing_is_none() {
        let store = store().await;
        assert!(store.get_one(999_999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn filters_match_only_their_column() {
        let store = store().await;
        let a = store
            .create(fields(json!({"title": "A", "director_id": 1, "genre_id": 10, "year": 2000})))
            .await
            .unwrap();
        let b = store
            .create(fields(json!({"title": "B", "director_id": 1, "genre_id": 20, "year": 2010})))
            .await
            .unwrap();
        let c = store
            .create(fields(json!({"title": "C", "director_id": 2, "genre_id": 10, "year": 2010})))
            .await
            .unwrap();

        assert_eq!(ids(store.get_all().await.unwrap()), vec![a.id, b.id, c.id]);
        assert_eq!(ids(store.get_all_by_director(1).await.unwrap()), vec![a.id, b.id]);
        assert_eq!(ids(store.get_all_by_genre(10).await.unwrap()), vec![a.id, c.id]);
        assert_eq!(ids(store.get_all_by_year(2010).await.unwrap()), vec![b.id, c.id]);
        assert!(store.get_all_by_director(99).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_report_affected_rows() {
        let store = store().await;
        let created = store.create(fields(json!({"title": "Draft"}))).await.unwrap();

        let changes = movie::ActiveModel { title: Set(Some("Final".into())), ..Default::default() };
        assert_eq!(store.update(created.id, changes.clone()).await.unwrap(), 1);
        assert_eq!(store.update(created.id + 1, changes).await.unwrap(), 0);

        let loaded = store.get_one(created.id).await.unwrap().unwrap();
        assert_eq!(loaded.title.as_deref(), Some("Final"));

        assert_eq!(store.delete(created.id).await.unwrap(), 1);
        assert_eq!(store.delete(created.id).await.unwrap(), 0);
        assert!(store.get_one(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn references_without_lookup_rows_are_stored_on_a_pooled_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("movies.db").display());
        let mut options = ConnectOptions::new(url);
        options.max_connections(4).min_connections(4).sqlx_logging(false);
        let store = MovieStore::new(connect_and_migrate(options).await.unwrap());

        // spread writes over every pooled connection
        let mut tasks = JoinSet::new();
        for year in 2000..2008 {
            let store = store.clone();
            tasks.spawn(async move {
                store
                    .create(fields(json!({
                        "title": "Orphan",
                        "year": year,
                        "genre_id": 1,
                        "director_id": 2
                    })))
                    .await
            });
        }
        let mut created = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            created.push(joined.unwrap().unwrap());
        }

        assert_eq!(store.get_all_by_genre(1).await.unwrap().len(), 8);
        assert_eq!(store.get_all_by_director(2).await.unwrap().len(), 8);

        let changes = movie::ActiveModel {
            genre_id: Set(Some(77)),
            director_id: Set(Some(88)),
            ..Default::default()
        };
        assert_eq!(store.update(created[0].id, changes).await.unwrap(), 1);
        let loaded = store.get_one(created[0].id).await.unwrap().unwrap();
        assert_eq!((loaded.genre_id, loaded.director_id), (Some(77), Some(88)));
    }

    #[tokio::test]
    async fn reference_lookups() {
        let db = connect_in_memory().await;
        genre::ActiveModel { id: NotSet, name: Set("Drama".into()) }.insert(&db).await.unwrap();
        let director =
            director::ActiveModel { id: NotSet, name: Set("Denis Villeneuve".into()) }
                .insert(&db)
                .await
                .unwrap();

        let refs = ReferenceStore::new(db);
        assert_eq!(refs.genres().await.unwrap().len(), 1);
        assert_eq!(refs.director(director.id).await.unwrap(), Some(director));
        assert!(refs.genre(999).await.unwrap().is_none());
        assert_eq!(refs.directors().await.unwrap().len(), 1);
    }
}
