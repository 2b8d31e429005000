use std::collections::HashMap;

use quiz_core::model::CorpusEntry;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnection, SqliteRow};

use super::SqliteCorpus;
use crate::repository::{CorpusSource, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

impl SqliteCorpus {
    /// Store one movie and its quotes in order. Returns the new movie id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the insert fails; nothing is written in that case.
    pub async fn insert_entry(&self, entry: &CorpusEntry) -> Result<i64, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let movie_id = insert_movie(&mut *tx, entry).await?;
        tx.commit().await.map_err(conn)?;
        Ok(movie_id)
    }

    /// Swap the whole corpus for `entries` in one transaction. Returns the number of movies
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any statement fails; the previous corpus is kept in that case.
    pub async fn replace_all(&self, entries: &[CorpusEntry]) -> Result<u64, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let cleared = sqlx::query("DELETE FROM movies")
            .execute(&mut *tx)
            .await
            .map_err(conn)?
            .rows_affected();
        for entry in entries {
            insert_movie(&mut *tx, entry).await?;
        }
        tx.commit().await.map_err(conn)?;
        Ok(cleared)
    }

    /// Remove every movie (quotes cascade). Returns the number of movies deleted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the delete fails.
    pub async fn clear(&self) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM movies")
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(res.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the count query fails.
    pub async fn movie_count(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM movies")
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        u64::try_from(n).map_err(|_| StorageError::Serialization("negative count".into()))
    }
}

#[async_trait::async_trait]
impl CorpusSource for SqliteCorpus {
    async fn fetch_corpus(&self) -> Result<Vec<CorpusEntry>, StorageError> {
        let movie_rows = sqlx::query("SELECT id, name, display_label FROM movies ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        let quote_rows = sqlx::query(
            r"
            SELECT id, movie_id, text
            FROM quotes
            ORDER BY movie_id ASC, position ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut quotes: HashMap<i64, Vec<String>> = HashMap::new();
        for row in &quote_rows {
            match quote_from_row(row) {
                Ok((movie_id, text)) => quotes.entry(movie_id).or_default().push(text),
                Err(err) => err.skip(),
            }
        }

        let mut entries = Vec::with_capacity(movie_rows.len());
        for row in &movie_rows {
            match movie_from_row(row) {
                Ok((movie_id, mut entry)) => {
                    entry.quotes = quotes.remove(&movie_id).unwrap_or_default();
                    entries.push(entry);
                }
                Err(err) => err.skip(),
            }
        }

        tracing::info!(movies = entries.len(), quotes = quote_rows.len(), "loaded sqlite corpus");
        Ok(entries)
    }
}

async fn insert_movie(db: &mut SqliteConnection, entry: &CorpusEntry) -> Result<i64, StorageError> {
    let res = sqlx::query("INSERT INTO movies (name, display_label) VALUES (?1, ?2)")
        .bind(entry.movie_name.as_str())
        .bind(entry.display_label.as_deref())
        .execute(&mut *db)
        .await
        .map_err(conn)?;
    let movie_id = res.last_insert_rowid();

    for (position, quote) in entry.quotes.iter().enumerate() {
        let position = i64::try_from(position)
            .map_err(|_| StorageError::Serialization("quote position overflow".into()))?;
        sqlx::query("INSERT INTO quotes (movie_id, position, text) VALUES (?1, ?2, ?3)")
            .bind(movie_id)
            .bind(position)
            .bind(quote.as_str())
            .execute(&mut *db)
            .await
            .map_err(conn)?;
    }
    Ok(movie_id)
}

fn movie_from_row(row: &SqliteRow) -> Result<(i64, CorpusEntry), StorageError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| StorageError::malformed("movie", e))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| StorageError::malformed(format!("movie {id}"), e))?;
    let label: Option<String> = row
        .try_get("display_label")
        .map_err(|e| StorageError::malformed(format!("movie {id}"), e))?;

    let entry = CorpusEntry::new(name, Vec::<String>::new());
    let entry = match label {
        Some(label) => entry.with_display_label(label),
        None => entry,
    };
    Ok((id, entry))
}

fn quote_from_row(row: &SqliteRow) -> Result<(i64, String), StorageError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| StorageError::malformed("quote", e))?;
    let movie_id: i64 = row
        .try_get("movie_id")
        .map_err(|e| StorageError::malformed(format!("quote {id}"), e))?;
    let text: String = row
        .try_get("text")
        .map_err(|e| StorageError::malformed(format!("quote {id}"), e))?;
    Ok((movie_id, text))
}
