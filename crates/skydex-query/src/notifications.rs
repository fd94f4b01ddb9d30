//! The notifications-feed pagination variant.
//!
//! A specialised `PageQuery` mode: records mentioning a given DID (a coarse
//! `json LIKE '%did%'` prefilter) authored by someone other than that DID,
//! optionally restricted to a collection set, sorted by `(rkey DESC, uri
//! DESC)` — rkeys are time-sortable identifiers so this already gives
//! chronological order without touching `indexed_at`. Its cursor is the
//! simple `rkey '|' uri` pair rather than the general N-field cursor, since
//! the sort here is fixed rather than caller-specified.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use skydex_core::Record;

use crate::db::DbHandle;
use crate::error::QueryError;
use crate::value::Value;
use crate::where_builder::IndexAllocator;

/// One page of the notifications feed.
#[derive(Clone, Debug, PartialEq)]
pub struct NotificationsPage {
    pub records: Vec<Record>,
    pub next_cursor: Option<String>,
}

/// Orchestrates a notifications-feed page fetch.
pub struct NotificationsPageQuery;

impl NotificationsPageQuery {
    pub async fn run(
        db: &dyn DbHandle,
        for_did: &str,
        collections: &[String],
        limit: u32,
        after: Option<&str>,
    ) -> Result<NotificationsPage, QueryError> {
        let dialect = db.dialect();
        let mut allocator = IndexAllocator::new(1);

        let mention_idx = allocator.push(Value::text(format!("%{for_did}%")));
        let not_did_idx = allocator.push(Value::text(for_did));
        let mut where_sql = format!(
            "json {} {} AND did != {}",
            dialect.like_operator(),
            dialect.placeholder(mention_idx),
            dialect.placeholder(not_did_idx)
        );

        if !collections.is_empty() {
            let start = allocator.next_index();
            for collection in collections {
                allocator.push(Value::text(collection.clone()));
            }
            where_sql = format!(
                "{where_sql} AND collection IN ({})",
                dialect.placeholders(collections.len(), start)
            );
        }

        if let Some(cursor) = after {
            if let Ok((rkey, uri)) = Self::decode_cursor(cursor) {
                let rkey_lt_idx = allocator.push(Value::text(rkey.clone()));
                let rkey_eq_idx = allocator.push(Value::text(rkey));
                let uri_idx = allocator.push(Value::text(uri));
                let rkey_lt_ph = dialect.placeholder(rkey_lt_idx);
                let rkey_eq_ph = dialect.placeholder(rkey_eq_idx);
                let uri_ph = dialect.placeholder(uri_idx);
                where_sql = format!(
                    "{where_sql} AND (rkey < {rkey_lt_ph} OR (rkey = {rkey_eq_ph} AND uri < {uri_ph}))",
                );
            }
        }

        let sql = format!(
            "SELECT uri, cid, did, collection, json, indexed_at, rkey FROM record WHERE {where_sql} \
             ORDER BY rkey DESC, uri DESC LIMIT {}",
            limit + 1
        );

        let mut rows = db.fetch_records(&sql, &allocator.into_binds()).await?;
        let has_more = rows.len() > limit as usize;
        rows.truncate(limit as usize);

        let next_cursor = if has_more {
            rows.last().map(|r| Self::encode_cursor(&r.rkey, &r.uri))
        } else {
            None
        };

        Ok(NotificationsPage {
            records: rows,
            next_cursor,
        })
    }

    fn encode_cursor(rkey: &str, uri: &str) -> String {
        let raw = format!("{rkey}|{uri}");
        URL_SAFE_NO_PAD.encode(raw.as_bytes())
    }

    fn decode_cursor(cursor: &str) -> Result<(String, String), QueryError> {
        let raw = URL_SAFE_NO_PAD
            .decode(cursor.as_bytes())
            .map_err(|_| QueryError::InvalidCursor)?;
        let raw = String::from_utf8(raw).map_err(|_| QueryError::InvalidCursor)?;
        let (rkey, uri) = raw.split_once('|').ok_or(QueryError::InvalidCursor)?;
        Ok((rkey.to_string(), uri.to_string()))
    }
}
