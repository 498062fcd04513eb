//! Persistent favorites.
//!
//! Favorites are denormalized recipe snapshots keyed by recipe id. They live
//! in their own table and are never touched by partition garbage collection,
//! so they survive restarts, generation rollovers and loss of connectivity.

use super::connection::RadarDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A recipe snapshot as the UI displays it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub thumbnail_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
    /// Other display fields (ingredients, measures, source link).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A saved recipe plus the instant it was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    #[serde(flatten)]
    pub recipe: Recipe,
    /// Epoch milliseconds of the latest save.
    pub saved_at: i64,
}

impl RadarDb {
    /// Save a recipe, stamping the current time.
    ///
    /// Upsert keyed by recipe id: saving again overwrites the record.
    pub async fn save_favorite(&self, recipe: &Recipe) -> Result<Favorite, Error> {
        if recipe.id.is_empty() {
            return Err(Error::InvalidInput("recipe id cannot be empty".into()));
        }

        let favorite = Favorite { recipe: recipe.clone(), saved_at: chrono::Utc::now().timestamp_millis() };
        let id = favorite.recipe.id.clone();
        let record_json = serde_json::to_string(&favorite)?;
        let saved_at = favorite.saved_at;

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO favorites (id, record_json, saved_at) VALUES (?1, ?2, ?3)
                    ON CONFLICT(id) DO UPDATE SET
                        record_json = excluded.record_json,
                        saved_at = excluded.saved_at",
                    params![id, record_json, saved_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        tracing::debug!(id = %favorite.recipe.id, "saved favorite");
        Ok(favorite)
    }

    /// Remove a favorite. Removing an absent id is not an error.
    ///
    /// Returns whether a record was deleted.
    pub async fn remove_favorite(&self, id: &str) -> Result<bool, Error> {
        let id = id.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM favorites WHERE id = ?1", params![id])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Get a favorite by recipe id.
    pub async fn get_favorite(&self, id: &str) -> Result<Option<Favorite>, Error> {
        let id = id.to_string();
        let record = self
            .conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row("SELECT record_json FROM favorites WHERE id = ?1", params![id], |row| {
                    row.get(0)
                });

                match result {
                    Ok(json) => Ok(Some(json)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        record.map(|json| serde_json::from_str(&json).map_err(Error::from)).transpose()
    }

    /// All favorites. Physical order is not part of the contract; callers sort.
    pub async fn list_favorites(&self) -> Result<Vec<Favorite>, Error> {
        let records = self
            .conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT record_json FROM favorites")?;
                let rows = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        records
            .iter()
            .map(|json| serde_json::from_str(json).map_err(Error::from))
            .collect()
    }

    /// Whether a recipe is saved.
    pub async fn is_favorite(&self, id: &str) -> Result<bool, Error> {
        let id = id.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool =
                    conn.query_row("SELECT EXISTS(SELECT 1 FROM favorites WHERE id = ?1)", params![id], |row| {
                        row.get(0)
                    })?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Remove the recipe if saved, otherwise save it.
    ///
    /// Returns true when the recipe is saved after the call.
    pub async fn toggle_favorite(&self, recipe: &Recipe) -> Result<bool, Error> {
        if self.is_favorite(&recipe.id).await? {
            self.remove_favorite(&recipe.id).await?;
            Ok(false)
        } else {
            self.save_favorite(recipe).await?;
            Ok(true)
        }
    }

    /// Number of saved favorites.
    pub async fn favorite_count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM favorites", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
