use crate::database::models::CommentRecord;
use anyhow::Result;
use rusqlite::{params, Connection};
use std::collections::HashMap;

pub(super) struct SqliteCommentRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::CommentRepository for SqliteCommentRepository<'conn> {
    fn append(&self, record: &CommentRecord, score_delta: i64) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        // The score bump doubles as the existence check; a missing post
        // rolls the whole append back.
        let updated = tx.execute(
            "UPDATE posts SET score = score + ?2 WHERE id = ?1",
            params![record.post_id, score_delta],
        )?;
        if updated == 0 {
            return Ok(false);
        }
        tx.execute(
            r#"
            INSERT INTO comments (id, post_id, author_id, author_display_name, text, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.id,
                record.post_id,
                record.author_id,
                record.author_display_name,
                record.text,
                record.created_at,
            ],
        )?;
        tx.commit()?;
        Ok(true)
    }

    fn list_for_post(&self, post_id: &str) -> Result<Vec<CommentRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, post_id, author_id, author_display_name, text, created_at
            FROM comments
            WHERE post_id = ?1
            ORDER BY seq ASC
            "#,
        )?;
        let rows = stmt.query_map(params![post_id], |row| {
            Ok(CommentRecord {
                id: row.get(0)?,
                post_id: row.get(1)?,
                author_id: row.get(2)?,
                author_display_name: row.get(3)?,
                text: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;
        let mut comments = Vec::new();
        for row in rows {
            comments.push(row?);
        }
        Ok(comments)
    }

    fn count_for_post(&self, post_id: &str) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn counts_by_post(&self) -> Result<HashMap<String, i64>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT post_id, COUNT(*) as count
            FROM comments
            GROUP BY post_id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (post_id, count) = row?;
            counts.insert(post_id, count);
        }
        Ok(counts)
    }
}
