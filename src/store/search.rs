use std::collections::VecDeque;

use rusqlite::Connection;

use super::sqlite::{TAG_COLUMNS, tag_from_row};
use crate::error::Result;
use crate::models::{PartitionKey, Tag};

/// Lazy substring search over one partition.
///
/// Rows are fetched in pages ordered by id, resuming after the last id
/// seen, so no statement stays open between calls to `next`. Once the
/// sequence ends (or yields an error) it stays ended.
pub struct TagSearch<'a> {
    conn: &'a Connection,
    partition: PartitionKey,
    needle: String,
    page_size: usize,
    last_id: i64,
    buffer: VecDeque<Tag>,
    exhausted: bool,
}

impl<'a> TagSearch<'a> {
    pub(crate) fn new(
        conn: &'a Connection,
        partition: PartitionKey,
        needle: String,
        page_size: usize,
    ) -> Self {
        Self {
            conn,
            partition,
            needle,
            page_size: page_size.max(1),
            last_id: 0,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    fn fetch_page(&mut self) -> Result<()> {
        let (kind, id) = self.partition.index_columns();
        let sql = format!(
            "SELECT {TAG_COLUMNS} FROM tags
             WHERE IFNULL(scoped_type, '') = ?1 AND IFNULL(scoped_id, 0) = ?2
               AND instr(name_key, ?3) > 0 AND id > ?4
             ORDER BY id
             LIMIT ?5"
        );

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let page = stmt
            .query_map(
                rusqlite::params![kind, id, self.needle, self.last_id, self.page_size as i64],
                tag_from_row,
            )?
            .collect::<rusqlite::Result<Vec<Tag>>>()?;

        tracing::trace!(
            partition = %self.partition,
            after_id = self.last_id,
            rows = page.len(),
            "fetched search page"
        );

        if page.len() < self.page_size {
            self.exhausted = true;
        }
        if let Some(last) = page.last() {
            self.last_id = last.id().get();
        }
        self.buffer.extend(page);
        Ok(())
    }
}

impl Iterator for TagSearch<'_> {
    type Item = Result<Tag>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty()
            && !self.exhausted
            && let Err(e) = self.fetch_page()
        {
            self.exhausted = true;
            self.buffer.clear();
            return Some(Err(e));
        }
        self.buffer.pop_front().map(Ok)
    }
}

impl std::iter::FusedIterator for TagSearch<'_> {}
