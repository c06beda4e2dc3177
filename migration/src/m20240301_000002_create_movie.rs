use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // genre_id / director_id are plain columns: movies may reference rows
        // that do not exist (yet) in the lookup tables.
        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(pk_auto(Movie::Id))
                    .col(string_null(Movie::Title))
                    .col(text_null(Movie::Description))
                    .col(string_null(Movie::Trailer))
                    .col(integer_null(Movie::Year))
                    .col(double_null(Movie::Rating))
                    .col(integer_null(Movie::GenreId))
                    .col(integer_null(Movie::DirectorId))
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_movie_genre_id", Movie::GenreId),
            ("idx_movie_director_id", Movie::DirectorId),
            ("idx_movie_year", Movie::Year),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Movie::Table)
                        .col(col)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Title,
    Description,
    Trailer,
    Year,
    Rating,
    GenreId,
    DirectorId,
}
