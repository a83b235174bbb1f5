use crate::database::models::PostRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) struct SqlitePostRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

fn read_post(row: &Row<'_>) -> rusqlite::Result<PostRecord> {
    Ok(PostRecord {
        id: row.get(0)?,
        author_id: row.get(1)?,
        result_image_ref: row.get(2)?,
        category: row.get(3)?,
        vibe_tag: row.get(4)?,
        is_manual: row.get(5)?,
        like_count: row.get(6)?,
        view_count: row.get(7)?,
        score: row.get(8)?,
        created_at: row.get(9)?,
    })
}

const POST_COLUMNS: &str = "id, author_id, result_image_ref, category, vibe_tag, is_manual, \
     like_count, view_count, score, created_at";

impl<'conn> super::PostRepository for SqlitePostRepository<'conn> {
    fn create(&self, record: &PostRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO posts (id, author_id, result_image_ref, category, vibe_tag, is_manual,
                               like_count, view_count, score, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                record.id,
                record.author_id,
                record.result_image_ref,
                record.category,
                record.vibe_tag,
                record.is_manual,
                record.like_count,
                record.view_count,
                record.score,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<PostRecord>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
                params![id],
                read_post,
            )
            .optional()?)
    }

    fn list_all(&self) -> Result<Vec<PostRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY datetime(created_at) DESC"
        ))?;
        let rows = stmt.query_map([], read_post)?;
        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }
        Ok(posts)
    }

    fn list_for_author(&self, author_id: &str) -> Result<Vec<PostRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE author_id = ?1 ORDER BY datetime(created_at) DESC"
        ))?;
        let rows = stmt.query_map(params![author_id], read_post)?;
        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }
        Ok(posts)
    }

    fn record_view(&self, post_id: &str, score_delta: i64) -> Result<bool> {
        // Single statement, so concurrent views cannot lose updates.
        let updated = self.conn.execute(
            "UPDATE posts SET view_count = view_count + 1, score = score + ?2 WHERE id = ?1",
            params![post_id, score_delta],
        )?;
        Ok(updated > 0)
    }
}
