use crate::database::models::ProductRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) struct SqliteProductRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

fn read_product(row: &Row<'_>) -> rusqlite::Result<ProductRecord> {
    Ok(ProductRecord {
        id: row.get(0)?,
        brand: row.get(1)?,
        name: row.get(2)?,
        image_ref: row.get(3)?,
        category: row.get(4)?,
        price_cents: row.get(5)?,
        like_count: row.get(6)?,
        comment_count: row.get(7)?,
        view_count: row.get(8)?,
        created_at: row.get(9)?,
    })
}

const PRODUCT_COLUMNS: &str = "id, brand, name, image_ref, category, price_cents, \
     like_count, comment_count, view_count, created_at";

impl<'conn> super::ProductRepository for SqliteProductRepository<'conn> {
    fn upsert(&self, record: &ProductRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO products (id, brand, name, image_ref, category, price_cents,
                                  like_count, comment_count, view_count, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                brand = excluded.brand,
                name = excluded.name,
                image_ref = excluded.image_ref,
                category = excluded.category,
                price_cents = excluded.price_cents
            "#,
            params![
                record.id,
                record.brand,
                record.name,
                record.image_ref,
                record.category,
                record.price_cents,
                record.like_count,
                record.comment_count,
                record.view_count,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<ProductRecord>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
                params![id],
                read_product,
            )
            .optional()?)
    }

    fn list_all(&self) -> Result<Vec<ProductRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY datetime(created_at) DESC"
        ))?;
        let rows = stmt.query_map([], read_product)?;
        let mut products = Vec::new();
        for row in rows {
            products.push(row?);
        }
        Ok(products)
    }

    fn add_like(&self, product_id: &str, author_id: &str, liked_at: &str) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let inserted = tx.execute(
            r#"
            INSERT OR IGNORE INTO product_likes (product_id, author_id, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![product_id, author_id, liked_at],
        )?;
        if inserted > 0 {
            tx.execute(
                "UPDATE products SET like_count = like_count + 1 WHERE id = ?1",
                params![product_id],
            )?;
        }
        tx.commit()?;
        Ok(inserted > 0)
    }

    fn has_liked(&self, product_id: &str, author_id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM product_likes WHERE product_id = ?1 AND author_id = ?2",
            params![product_id, author_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn likers_of(&self, product_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT author_id
            FROM product_likes
            WHERE product_id = ?1
            ORDER BY datetime(created_at) ASC
            "#,
        )?;
        let rows = stmt.query_map(params![product_id], |row| row.get::<_, String>(0))?;
        let mut likers = Vec::new();
        for row in rows {
            likers.push(row?);
        }
        Ok(likers)
    }

    fn liked_ids_for(&self, author_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT product_id FROM product_likes WHERE author_id = ?1",
        )?;
        let rows = stmt.query_map(params![author_id], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    fn record_view(&self, product_id: &str) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE products SET view_count = view_count + 1 WHERE id = ?1",
            params![product_id],
        )?;
        Ok(updated > 0)
    }

    fn record_comment(&self, product_id: &str) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE products SET comment_count = comment_count + 1 WHERE id = ?1",
            params![product_id],
        )?;
        Ok(updated > 0)
    }
}
