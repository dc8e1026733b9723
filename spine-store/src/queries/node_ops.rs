//! Story-node CRUD: insert, status transitions, window and history reads.

use rusqlite::{params, Connection, OptionalExtension, Row};

use spine_core::errors::SpineResult;
use spine_core::event::{Confidence, EventStatus, EventType, StoryEvent};

use super::parse_ts;
use crate::to_store_err;

/// Insert a committed node. The caller owns the surrounding transaction
/// and version bump.
pub fn insert_node(conn: &Connection, event: &StoryEvent) -> SpineResult<()> {
    let parents_json = serde_json::to_string(&event.causal_parents)?;
    conn.execute(
        "INSERT INTO story_nodes (
            event_id, agent_id, event_type, content, source_service,
            local_reference, confidence, timestamp, ingested_at,
            causal_parents, status, superseded_by, intake_seq, content_hash
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            event.event_id,
            event.agent_id,
            event.event_type.as_str(),
            event.content,
            event.source_service,
            event.local_reference,
            event.confidence.value(),
            event.timestamp.to_rfc3339(),
            event.ingested_at.to_rfc3339(),
            parents_json,
            event.status.as_str(),
            event.superseded_by,
            event.intake_seq,
            event.content_hash,
        ],
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}

/// Apply a status transition. Returns the previous status.
pub fn update_status(
    conn: &Connection,
    event_id: &str,
    to_status: EventStatus,
    superseded_by: Option<&str>,
) -> SpineResult<EventStatus> {
    let from_raw: Option<String> = conn
        .query_row(
            "SELECT status FROM story_nodes WHERE event_id = ?1",
            [event_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_store_err(e.to_string()))?;

    let from_raw = from_raw.ok_or_else(|| {
        spine_core::SpineError::Store(spine_core::errors::StoreError::NotFound(
            event_id.to_string(),
        ))
    })?;
    let from_status = EventStatus::parse(&from_raw)
        .ok_or_else(|| to_store_err(format!("unknown status '{from_raw}' on {event_id}")))?;

    conn.execute(
        "UPDATE story_nodes SET status = ?1, superseded_by = ?2 WHERE event_id = ?3",
        params![to_status.as_str(), superseded_by, event_id],
    )
    .map_err(|e| to_store_err(e.to_string()))?;

    Ok(from_status)
}

pub fn get_node(conn: &Connection, event_id: &str) -> SpineResult<Option<StoryEvent>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {COLUMNS} FROM story_nodes WHERE event_id = ?1"
        ))
        .map_err(|e| to_store_err(e.to_string()))?;
    stmt.query_row([event_id], row_to_event)
        .optional()
        .map_err(|e| to_store_err(e.to_string()))?
        .transpose()
}

pub fn nodes_by_ids(conn: &Connection, ids: &[String]) -> SpineResult<Vec<StoryEvent>> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(event) = get_node(conn, id)? {
            out.push(event);
        }
    }
    Ok(out)
}

/// Most recent `n` nodes for an agent, newest first by intake sequence.
pub fn recent_window(
    conn: &Connection,
    agent_id: &str,
    n: usize,
    include_inactive: bool,
) -> SpineResult<Vec<StoryEvent>> {
    let sql = if include_inactive {
        format!(
            "SELECT {COLUMNS} FROM story_nodes
             WHERE agent_id = ?1
             ORDER BY intake_seq DESC LIMIT ?2"
        )
    } else {
        format!(
            "SELECT {COLUMNS} FROM story_nodes
             WHERE agent_id = ?1 AND status = 'active'
             ORDER BY intake_seq DESC LIMIT ?2"
        )
    };
    collect_events(conn, &sql, params![agent_id, n as i64])
}

/// Everything for an agent, oldest first. Audit reads only.
pub fn full_history(conn: &Connection, agent_id: &str) -> SpineResult<Vec<StoryEvent>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM story_nodes WHERE agent_id = ?1 ORDER BY intake_seq ASC"
    );
    collect_events(conn, &sql, params![agent_id])
}

pub fn count_by_status(
    conn: &Connection,
    agent_id: &str,
    status: EventStatus,
) -> SpineResult<usize> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM story_nodes WHERE agent_id = ?1 AND status = ?2",
            params![agent_id, status.as_str()],
            |row| row.get(0),
        )
        .map_err(|e| to_store_err(e.to_string()))?;
    Ok(count as usize)
}

const COLUMNS: &str = "event_id, agent_id, event_type, content, source_service, \
                       local_reference, confidence, timestamp, ingested_at, \
                       causal_parents, status, superseded_by, intake_seq, content_hash";

fn collect_events<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> SpineResult<Vec<StoryEvent>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_store_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, row_to_event)
        .map_err(|e| to_store_err(e.to_string()))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| to_store_err(e.to_string()))??);
    }
    Ok(out)
}

/// Map a story_nodes row (in COLUMNS order) to a StoryEvent.
/// Returns the domain error nested so query_map can surface SQL errors
/// separately from decode errors.
fn row_to_event(row: &Row<'_>) -> rusqlite::Result<SpineResult<StoryEvent>> {
    let event_id: String = row.get(0)?;
    let agent_id: String = row.get(1)?;
    let event_type_raw: String = row.get(2)?;
    let content: String = row.get(3)?;
    let source_service: String = row.get(4)?;
    let local_reference: Option<String> = row.get(5)?;
    let confidence: f64 = row.get(6)?;
    let timestamp_raw: String = row.get(7)?;
    let ingested_raw: String = row.get(8)?;
    let parents_json: String = row.get(9)?;
    let status_raw: String = row.get(10)?;
    let superseded_by: Option<String> = row.get(11)?;
    let intake_seq: i64 = row.get(12)?;
    let content_hash: String = row.get(13)?;

    Ok((|| -> SpineResult<StoryEvent> {
        let event_type = EventType::parse(&event_type_raw)
            .ok_or_else(|| to_store_err(format!("unknown event type '{event_type_raw}'")))?;
        let status = EventStatus::parse(&status_raw)
            .ok_or_else(|| to_store_err(format!("unknown status '{status_raw}'")))?;
        let causal_parents: Vec<String> = serde_json::from_str(&parents_json)?;
        Ok(StoryEvent {
            event_id,
            agent_id,
            event_type,
            content,
            source_service,
            local_reference,
            confidence: Confidence::new(confidence),
            timestamp: parse_ts(&timestamp_raw)?,
            ingested_at: parse_ts(&ingested_raw)?,
            causal_parents,
            status,
            superseded_by,
            intake_seq,
            content_hash,
        })
    })())
}
