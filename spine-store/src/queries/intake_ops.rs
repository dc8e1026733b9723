//! Intake-log operations: durable append with idempotency, pending
//! scan for startup replay, processed marking.

use rusqlite::{params, Connection, OptionalExtension};

use spine_core::errors::SpineResult;
use spine_core::event::EventEnvelope;

use crate::to_store_err;

/// A pending intake entry awaiting sequencer pickup.
#[derive(Debug, Clone)]
pub struct IntakeRow {
    pub event_id: String,
    pub agent_id: String,
    pub intake_seq: i64,
    pub envelope: EventEnvelope,
}

/// Result of a durable intake append.
#[derive(Debug, Clone)]
pub struct IntakeAppend {
    pub event_id: String,
    pub intake_seq: i64,
    pub deduplicated: bool,
}

/// Append an envelope to the intake log, assigning the agent's next
/// intake sequence. If `idempotency_key` matches an earlier entry the
/// original assignment is returned and nothing is written.
///
/// Single-writer discipline makes the check-then-insert race-free.
pub fn append(
    conn: &Connection,
    envelope: &EventEnvelope,
    event_id: &str,
    idempotency_key: Option<&str>,
) -> SpineResult<IntakeAppend> {
    if let Some(key) = idempotency_key {
        let existing: Option<(String, i64)> = conn
            .query_row(
                "SELECT event_id, intake_seq FROM intake_log WHERE idempotency_key = ?1",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| to_store_err(e.to_string()))?;
        if let Some((event_id, intake_seq)) = existing {
            return Ok(IntakeAppend {
                event_id,
                intake_seq,
                deduplicated: true,
            });
        }
    }

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_store_err(format!("intake append begin: {e}")))?;

    let next_seq: i64 = tx
        .query_row(
            "SELECT COALESCE(MAX(intake_seq), 0) + 1 FROM intake_log WHERE agent_id = ?1",
            [&envelope.agent_id],
            |row| row.get(0),
        )
        .map_err(|e| to_store_err(e.to_string()))?;

    let envelope_json = serde_json::to_string(envelope)?;
    tx.execute(
        "INSERT INTO intake_log (event_id, agent_id, intake_seq, idempotency_key, envelope)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            event_id,
            envelope.agent_id,
            next_seq,
            idempotency_key,
            envelope_json
        ],
    )
    .map_err(|e| to_store_err(e.to_string()))?;

    tx.commit()
        .map_err(|e| to_store_err(format!("intake append commit: {e}")))?;

    Ok(IntakeAppend {
        event_id: event_id.to_string(),
        intake_seq: next_seq,
        deduplicated: false,
    })
}

/// Mark an intake entry processed (its coherence analysis committed).
pub fn mark_processed(conn: &Connection, event_id: &str) -> SpineResult<()> {
    conn.execute(
        "UPDATE intake_log SET processed = 1 WHERE event_id = ?1",
        [event_id],
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}

/// All unprocessed, non-dead-lettered entries, ordered by agent then
/// intake sequence. The startup replay source.
pub fn pending(conn: &Connection) -> SpineResult<Vec<IntakeRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT i.event_id, i.agent_id, i.intake_seq, i.envelope
             FROM intake_log i
             WHERE i.processed = 0
               AND NOT EXISTS (
                   SELECT 1 FROM dead_letters d
                   WHERE d.event_id = i.event_id AND d.replayed = 0
               )
             ORDER BY i.agent_id, i.intake_seq",
        )
        .map_err(|e| to_store_err(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(|e| to_store_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let (event_id, agent_id, intake_seq, envelope_json) =
            row.map_err(|e| to_store_err(e.to_string()))?;
        let envelope: EventEnvelope = serde_json::from_str(&envelope_json)?;
        out.push(IntakeRow {
            event_id,
            agent_id,
            intake_seq,
            envelope,
        });
    }
    Ok(out)
}

/// Pending entry count for one agent (its lane's replay backlog).
pub fn pending_count(conn: &Connection, agent_id: &str) -> SpineResult<usize> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM intake_log WHERE agent_id = ?1 AND processed = 0",
            [agent_id],
            |row| row.get(0),
        )
        .map_err(|e| to_store_err(e.to_string()))?;
    Ok(count as usize)
}
