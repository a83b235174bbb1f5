use crate::database::models::LikeRecord;
use anyhow::Result;
use rusqlite::{params, Connection};

pub(super) struct SqliteLikeRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::LikeRepository for SqliteLikeRepository<'conn> {
    fn add(&self, record: &LikeRecord, score_delta: i64) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let inserted = tx.execute(
            r#"
            INSERT OR IGNORE INTO post_likes (post_id, author_id, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![record.post_id, record.author_id, record.created_at],
        )?;
        if inserted > 0 {
            tx.execute(
                "UPDATE posts SET like_count = like_count + 1, score = score + ?2 WHERE id = ?1",
                params![record.post_id, score_delta],
            )?;
        }
        tx.commit()?;
        Ok(inserted > 0)
    }

    fn has_liked(&self, post_id: &str, author_id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM post_likes WHERE post_id = ?1 AND author_id = ?2",
            params![post_id, author_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn likers_of(&self, post_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT author_id
            FROM post_likes
            WHERE post_id = ?1
            ORDER BY datetime(created_at) ASC
            "#,
        )?;
        let rows = stmt.query_map(params![post_id], |row| row.get::<_, String>(0))?;
        let mut likers = Vec::new();
        for row in rows {
            likers.push(row?);
        }
        Ok(likers)
    }

    fn list_all(&self) -> Result<Vec<LikeRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT post_id, author_id, created_at
            FROM post_likes
            ORDER BY datetime(created_at) ASC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(LikeRecord {
                post_id: row.get(0)?,
                author_id: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?;
        let mut likes = Vec::new();
        for row in rows {
            likes.push(row?);
        }
        Ok(likes)
    }
}
