//! Versioned cache partitions.
//!
//! A partition is a named bucket of stored responses. Names embed the
//! generation tag (`<logical>-<tag>`), and activation of a new generation
//! deletes every partition carrying a different tag in one transaction.
//! Partitions are created lazily on first write. Once a generation has been
//! activated, single-entry writes to any other generation are refused, so a
//! pruned partition cannot come back.

use std::fmt;

use super::connection::RadarDb;
use super::hash::RequestIdentity;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Name of a cache partition: logical bucket plus generation tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionName {
    pub logical: String,
    pub tag: String,
}

impl PartitionName {
    pub fn new(logical: impl Into<String>, tag: impl Into<String>) -> Self {
        Self { logical: logical.into(), tag: tag.into() }
    }

    /// Split a stored name at its last `-`.
    ///
    /// Returns None when there is no separator or either side is empty.
    pub fn parse(name: &str) -> Option<Self> {
        let (logical, tag) = name.rsplit_once('-')?;
        if logical.is_empty() || tag.is_empty() {
            return None;
        }
        Some(Self::new(logical, tag))
    }
}

impl fmt::Display for PartitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.logical, self.tag)
    }
}

/// A response as held in a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl StoredResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, headers: Vec::new(), body: body.into() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Row prepared for insertion; headers are already encoded.
struct EntryRow {
    key: String,
    method: String,
    url: String,
    status: u16,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn encode(identity: &RequestIdentity, response: &StoredResponse) -> Result<Self, Error> {
        if !response.is_success() {
            return Err(Error::InvalidInput(format!(
                "refusing to cache status {} for {}",
                response.status, identity.url
            )));
        }
        Ok(Self {
            key: identity.key(),
            method: identity.method.clone(),
            url: identity.url.clone(),
            status: response.status,
            headers_json: serde_json::to_string(&response.headers)?,
            body: response.body.clone(),
        })
    }
}

fn insert_entry(conn: &rusqlite::Connection, partition: &str, row: &EntryRow, now: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)",
        params![partition, now],
    )?;
    conn.execute(
        "INSERT INTO partition_entries (partition, identity_key, method, url, status, headers_json, body, stored_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(partition, identity_key) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![partition, &row.key, &row.method, &row.url, row.status, &row.headers_json, &row.body, now],
    )?;
    Ok(())
}

fn active_tag(conn: &rusqlite::Connection) -> rusqlite::Result<Option<String>> {
    match conn.query_row("SELECT tag FROM active_generation WHERE id = 1", [], |row| row.get(0)) {
        Ok(tag) => Ok(Some(tag)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

impl RadarDb {
    /// Look up the entry for `identity` in `partition`.
    ///
    /// A missing partition is a plain miss.
    pub async fn match_entry(
        &self, partition: &str, identity: &RequestIdentity,
    ) -> Result<Option<StoredResponse>, Error> {
        let partition = partition.to_string();
        let key = identity.key();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(u16, String, Vec<u8>)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, headers_json, body FROM partition_entries
                    WHERE partition = ?1 AND identity_key = ?2",
                )?;

                let result = stmt.query_row(params![partition, key], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)));

                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        match row {
            Some((status, headers_json, body)) => {
                let headers = serde_json::from_str(&headers_json)?;
                Ok(Some(StoredResponse { status, headers, body }))
            }
            None => Ok(None),
        }
    }

    /// Store or overwrite the entry for `identity` in `partition`.
    ///
    /// Only 2xx responses are accepted; anything else is `InvalidInput`.
    /// When a generation is active, `partition` must carry its tag, otherwise
    /// the write is `RetiredGeneration` and nothing is created.
    pub async fn put_entry(
        &self, partition: &str, identity: &RequestIdentity, response: &StoredResponse,
    ) -> Result<(), Error> {
        let partition = partition.to_string();
        let row = EntryRow::encode(identity, response)?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                if let Some(active) = active_tag(conn)?
                    && PartitionName::parse(&partition).is_none_or(|p| p.tag != active)
                {
                    return Err(Error::RetiredGeneration { partition });
                }
                insert_entry(conn, &partition, &row, &now)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store several entries in one transaction. Either all land or none do.
    ///
    /// Not bound to the active generation: install writes the next
    /// generation's shell before it is activated.
    ///
    /// Returns the number of entries written.
    pub async fn put_entries(
        &self, partition: &str, entries: &[(RequestIdentity, StoredResponse)],
    ) -> Result<usize, Error> {
        let partition = partition.to_string();
        let rows = entries
            .iter()
            .map(|(identity, response)| EntryRow::encode(identity, response))
            .collect::<Result<Vec<_>, _>>()?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                for row in &rows {
                    insert_entry(&tx, &partition, row, &now)?;
                }
                tx.commit()?;
                Ok(rows.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Tag recorded by the last `retain_generation`, if any.
    pub async fn active_generation(&self) -> Result<Option<String>, Error> {
        self.conn
            .call(|conn| -> Result<Option<String>, Error> { Ok(active_tag(conn)?) })
            .await
            .map_err(Error::from)
    }

    /// Names of all existing partitions, sorted.
    pub async fn partition_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM partitions ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries stored in `partition`.
    pub async fn entry_count(&self, partition: &str) -> Result<u64, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM partition_entries WHERE partition = ?1",
                    params![partition],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a partition and its entries.
    ///
    /// Returns whether the partition existed.
    pub async fn delete_partition(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM partitions WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Make `tag` the active generation and delete every partition whose
    /// tag differs.
    ///
    /// Recording the tag, enumeration and deletion happen in one transaction,
    /// so readers see either the old set of partitions or the new one. Names
    /// that do not parse as `<logical>-<tag>` are treated as foreign and
    /// deleted too. Returns the deleted names.
    pub async fn retain_generation(&self, tag: &str) -> Result<Vec<String>, Error> {
        let tag = tag.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO active_generation (id, tag, activated_at) VALUES (1, ?1, ?2)
                    ON CONFLICT(id) DO UPDATE SET tag = excluded.tag, activated_at = excluded.activated_at",
                    params![tag, now],
                )?;
                let names = {
                    let mut stmt = tx.prepare("SELECT name FROM partitions ORDER BY name")?;
                    stmt.query_map([], |row| row.get::<_, String>(0))?
                        .collect::<Result<Vec<_>, _>>()?
                };

                let stale: Vec<String> = names
                    .into_iter()
                    .filter(|name| PartitionName::parse(name).is_none_or(|p| p.tag != tag))
                    .collect();

                for name in &stale {
                    tx.execute("DELETE FROM partitions WHERE name = ?1", params![name])?;
                }
                tx.commit()?;
                Ok(stale)
            })
            .await
            .map_err(Error::from)
    }
}
