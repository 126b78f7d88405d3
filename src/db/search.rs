use super::{Db, serialize_vector};
use rusqlite::{Result, params};

/// A retrieved chunk with its source metadata and similarity score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub document_name: String,
    pub chunk_content: String,
    pub position: usize,
    pub chunk_id: i64,
    pub similarity: f64,
}

fn map_search_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SearchResult> {
    let distance: f64 = row.get(4)?;
    let similarity = 1.0 - (distance / 2.0);

    Ok(SearchResult {
        document_name: row.get(0)?,
        chunk_content: row.get(1)?,
        position: row.get::<_, i64>(2)? as usize,
        chunk_id: row.get(3)?,
        similarity,
    })
}

impl Db {
    /// Perform vector similarity search using cosine distance.
    ///
    /// Returns at most `top_k` results ordered nearest-first; ties are
    /// broken by chunk rowid so a query always sees the same order.
    pub fn search(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                d.filename,
                c.content,
                c.position,
                c.id as chunk_id,
                vec_distance_cosine(v.embedding, ?) as distance
            FROM vec_chunks v
            JOIN chunks c ON v.rowid = c.id
            JOIN documents d ON c.document_id = d.id
            ORDER BY distance ASC, c.id ASC
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map(
            params![serialize_vector(query_vector), top_k as i64],
            map_search_row,
        )?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Chunk;

    fn padded(values: &[f32]) -> Vec<f32> {
        let mut v = vec![0.0f32; 384];
        v[..values.len()].copy_from_slice(values);
        v
    }

    #[test]
    fn test_search_orders_nearest_first() {
        let mut db = Db::open_in_memory().unwrap();

        let chunks = vec![Chunk {
            position: 0,
            content: "Rust programming language",
        }];
        let near = padded(&[0.1, 0.2, 0.3]);
        db.insert_document("rust.txt", &chunks, &[near.clone()])
            .unwrap();

        let chunks_far = vec![Chunk {
            position: 0,
            content: "Cooking recipes",
        }];
        let far = padded(&[-0.9, 0.8, -0.7]);
        db.insert_document("cooking.txt", &chunks_far, &[far]).unwrap();

        let results = db.search(&near, 5).unwrap();
        assert_eq!(results.len(), 2);

        assert_eq!(results[0].document_name, "rust.txt");
        assert!(results[0].similarity > 0.99);
        assert!(results[0].similarity >= results[1].similarity);
    }

    #[test]
    fn test_search_respects_top_k() {
        let mut db = Db::open_in_memory().unwrap();

        let contents = ["one", "two", "three", "four", "five"];
        for (i, content) in contents.iter().enumerate() {
            let chunks = vec![Chunk {
                position: 0,
                content,
            }];
            let vector = padded(&[0.1 * (i + 1) as f32]);
            db.insert_document(&format!("doc{i}.txt"), &chunks, &[vector])
                .unwrap();
        }

        let results = db.search(&padded(&[0.1]), 3).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_search_empty_store() {
        let db = Db::open_in_memory().unwrap();
        let results = db.search(&vec![0.1f32; 384], 3).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_reports_position_metadata() {
        let mut db = Db::open_in_memory().unwrap();

        let chunks = vec![
            Chunk {
                position: 0,
                content: "first part",
            },
            Chunk {
                position: 1,
                content: "second part",
            },
        ];
        let embeddings = vec![padded(&[0.5]), padded(&[0.6])];
        db.insert_document("doc.txt", &chunks, &embeddings).unwrap();

        let results = db.search(&padded(&[0.5]), 2).unwrap();
        assert_eq!(results.len(), 2);
        for r in &results {
            assert_eq!(r.document_name, "doc.txt");
            assert!(r.position <= 1);
        }
    }
}
