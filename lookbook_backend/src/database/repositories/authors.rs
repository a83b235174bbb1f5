use crate::database::models::AuthorRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

pub(super) struct SqliteAuthorRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::AuthorRepository for SqliteAuthorRepository<'conn> {
    fn upsert(&self, record: &AuthorRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO authors (id, display_name, avatar_ref, visibility, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                display_name = excluded.display_name,
                avatar_ref = excluded.avatar_ref,
                visibility = excluded.visibility
            "#,
            params![
                record.id,
                record.display_name,
                record.avatar_ref,
                record.visibility,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<AuthorRecord>> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT id, display_name, avatar_ref, visibility, created_at
                FROM authors
                WHERE id = ?1
                "#,
                params![id],
                |row| {
                    Ok(AuthorRecord {
                        id: row.get(0)?,
                        display_name: row.get(1)?,
                        avatar_ref: row.get(2)?,
                        visibility: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?)
    }

    fn list(&self) -> Result<Vec<AuthorRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, display_name, avatar_ref, visibility, created_at
            FROM authors
            ORDER BY datetime(created_at) ASC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AuthorRecord {
                id: row.get(0)?,
                display_name: row.get(1)?,
                avatar_ref: row.get(2)?,
                visibility: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        let mut authors = Vec::new();
        for row in rows {
            authors.push(row?);
        }
        Ok(authors)
    }

    fn set_visibility(&self, author_id: &str, visibility: &str) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE authors SET visibility = ?2 WHERE id = ?1",
            params![author_id, visibility],
        )?;
        Ok(updated > 0)
    }
}
