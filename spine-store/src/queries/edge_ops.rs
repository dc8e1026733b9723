//! Typed edge operations.

use rusqlite::{params, Connection};

use spine_core::errors::SpineResult;
use spine_core::models::{EdgeKind, EdgeRecord};

use super::parse_ts;
use crate::to_store_err;

/// Insert an edge. `INSERT OR IGNORE` keeps replays idempotent.
pub fn insert_edge(
    conn: &Connection,
    from_id: &str,
    to_id: &str,
    kind: EdgeKind,
    weakened: bool,
) -> SpineResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO story_edges (from_id, to_id, kind, weakened, created_at)
         VALUES (?1, ?2, ?3, ?4, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
        params![from_id, to_id, kind.as_str(), weakened as i32],
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}

/// All edges whose endpoints belong to the given agent.
pub fn edges_for_agent(conn: &Connection, agent_id: &str) -> SpineResult<Vec<EdgeRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT e.from_id, e.to_id, e.kind, e.weakened, e.created_at
             FROM story_edges e
             JOIN story_nodes n ON n.event_id = e.from_id
             WHERE n.agent_id = ?1",
        )
        .map_err(|e| to_store_err(e.to_string()))?;

    let rows = stmt
        .query_map([agent_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i32>(3)?,
                row.get::<_, String>(4)?,
            ))
        })
        .map_err(|e| to_store_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let (from_id, to_id, kind_raw, weakened, created_raw) =
            row.map_err(|e| to_store_err(e.to_string()))?;
        let kind = EdgeKind::parse(&kind_raw)
            .ok_or_else(|| to_store_err(format!("unknown edge kind '{kind_raw}'")))?;
        out.push(EdgeRecord {
            from_id,
            to_id,
            kind,
            weakened: weakened != 0,
            created_at: parse_ts(&created_raw)?,
        });
    }
    Ok(out)
}
