/// A chunk as stored in the database, borrowed from the ingest pipeline.
#[derive(Debug, Clone)]
pub struct Chunk<'a> {
    pub position: usize,
    pub content: &'a str,
}
