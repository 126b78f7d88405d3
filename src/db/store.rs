use super::{Db, models::Chunk, serialize_vector};
use rusqlite::{Result, params};

impl Db {
    /// Inserts a document with its chunks and embeddings in one transaction.
    ///
    /// Re-inserting an existing filename replaces its previous chunks
    /// (last write wins).
    pub fn insert_document(
        &mut self,
        filename: &str,
        chunks: &[Chunk<'_>],
        embeddings: &[Vec<f32>],
    ) -> Result<()> {
        assert_eq!(
            chunks.len(),
            embeddings.len(),
            "chunks and embeddings length mismatch"
        );

        let tx = self.conn.transaction()?;

        // Insert or update document and get the stable ID
        let doc_id: i64 = tx.query_row(
            r#"
            INSERT INTO documents (filename, indexed_at)
            VALUES (?, CURRENT_TIMESTAMP)
            ON CONFLICT(filename) DO UPDATE SET
                indexed_at = CURRENT_TIMESTAMP
            RETURNING id
            "#,
            params![filename],
            |row| row.get(0),
        )?;

        // Clean up old contents if any (same filename twice in a batch)
        tx.execute(
            "DELETE FROM vec_chunks WHERE rowid IN (SELECT id FROM chunks WHERE document_id = ?)",
            params![doc_id],
        )?;
        tx.execute("DELETE FROM chunks WHERE document_id = ?", params![doc_id])?;

        // Insert chunks and vectors
        for (i, chunk) in chunks.iter().enumerate() {
            tx.execute(
                "INSERT INTO chunks (document_id, position, content) VALUES (?, ?, ?)",
                params![doc_id, chunk.position as i64, chunk.content],
            )?;
            let chunk_id = tx.last_insert_rowid();

            let vector_blob = serialize_vector(&embeddings[i]);
            tx.execute(
                "INSERT INTO vec_chunks (rowid, embedding) VALUES (?, ?)",
                params![chunk_id, vector_blob],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Removes every entry from the store, returning the number of chunk
    /// rows removed. Clearing an already-empty store succeeds with 0 —
    /// absence of prior state is expected on first run.
    pub fn clear(&mut self) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM vec_chunks", [])?;
        let removed = tx.execute("DELETE FROM chunks", [])?;
        tx.execute("DELETE FROM documents", [])?;
        tx.commit()?;
        Ok(removed)
    }

    /// Number of indexed vector entries (chunks).
    pub fn count_entries(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM vec_chunks", [], |row| row.get(0))
    }

    /// Number of distinct indexed documents.
    pub fn count_documents(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
    }

    /// Filenames of all indexed documents.
    pub fn list_documents(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT filename FROM documents ORDER BY filename")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut docs = Vec::new();
        for row in rows {
            docs.push(row?);
        }

        Ok(docs)
    }
}
