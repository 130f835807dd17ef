use rusqlite::{params, Connection};

use super::event::parse_uuid;
use crate::db::DatabaseError;
use crate::models::DocumentChunk;

pub fn insert_document_chunk(conn: &Connection, chunk: &DocumentChunk) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO document_chunks (id, filename, page_label, chunk_index, content)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            chunk.id.to_string(),
            chunk.filename,
            chunk.page_label,
            chunk.chunk_index,
            chunk.content,
        ],
    )?;
    Ok(())
}

pub fn list_document_chunks(conn: &Connection) -> Result<Vec<DocumentChunk>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, filename, page_label, chunk_index, content
         FROM document_chunks ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut chunks = Vec::new();
    for row in rows {
        let (id, filename, page_label, chunk_index, content) = row?;
        chunks.push(DocumentChunk {
            id: parse_uuid("document_chunks.id", &id)?,
            filename,
            page_label,
            chunk_index,
            content,
        });
    }
    Ok(chunks)
}

pub fn delete_all_document_chunks(conn: &Connection) -> Result<usize, DatabaseError> {
    Ok(conn.execute("DELETE FROM document_chunks", [])?)
}
