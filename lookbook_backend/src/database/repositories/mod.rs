mod authors;
mod comments;
mod likes;
mod posts;
mod products;

use super::models::{AuthorRecord, CommentRecord, LikeRecord, PostRecord, ProductRecord};
use anyhow::Result;
use rusqlite::Connection;
use std::collections::HashMap;

pub trait AuthorRepository {
    fn upsert(&self, record: &AuthorRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<AuthorRecord>>;
    fn list(&self) -> Result<Vec<AuthorRecord>>;
    /// Returns false when no author row matched.
    fn set_visibility(&self, author_id: &str, visibility: &str) -> Result<bool>;
}

pub trait PostRepository {
    fn create(&self, record: &PostRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<PostRecord>>;
    fn list_all(&self) -> Result<Vec<PostRecord>>;
    fn list_for_author(&self, author_id: &str) -> Result<Vec<PostRecord>>;
    /// Bumps the view counter and the stored score in one statement.
    /// Returns false when the post does not exist.
    fn record_view(&self, post_id: &str, score_delta: i64) -> Result<bool>;
}

pub trait LikeRepository {
    /// Inserts the like and bumps the post's counter and score in one
    /// transaction. Returns false when the author had already liked the
    /// post, in which case nothing changes.
    fn add(&self, record: &LikeRecord, score_delta: i64) -> Result<bool>;
    fn has_liked(&self, post_id: &str, author_id: &str) -> Result<bool>;
    fn likers_of(&self, post_id: &str) -> Result<Vec<String>>;
    fn list_all(&self) -> Result<Vec<LikeRecord>>;
}

pub trait CommentRepository {
    /// Appends the comment and bumps the post's score in one transaction.
    /// Returns false when the post does not exist.
    fn append(&self, record: &CommentRecord, score_delta: i64) -> Result<bool>;
    fn list_for_post(&self, post_id: &str) -> Result<Vec<CommentRecord>>;
    fn count_for_post(&self, post_id: &str) -> Result<i64>;
    /// Returns HashMap<post_id, comment count>
    fn counts_by_post(&self) -> Result<HashMap<String, i64>>;
}

pub trait ProductRepository {
    fn upsert(&self, record: &ProductRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<ProductRecord>>;
    fn list_all(&self) -> Result<Vec<ProductRecord>>;
    /// Returns false when the author had already liked the product.
    fn add_like(&self, product_id: &str, author_id: &str, liked_at: &str) -> Result<bool>;
    fn has_liked(&self, product_id: &str, author_id: &str) -> Result<bool>;
    fn likers_of(&self, product_id: &str) -> Result<Vec<String>>;
    fn liked_ids_for(&self, author_id: &str) -> Result<Vec<String>>;
    /// Returns false when the product does not exist.
    fn record_view(&self, product_id: &str) -> Result<bool>;
    /// Returns false when the product does not exist.
    fn record_comment(&self, product_id: &str) -> Result<bool>;
}

/// Thin wrapper handing out rusqlite-backed repository implementations.
pub struct SqliteRepositories<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositories<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn authors(&self) -> impl AuthorRepository + '_ {
        authors::SqliteAuthorRepository { conn: self.conn }
    }

    pub fn posts(&self) -> impl PostRepository + '_ {
        posts::SqlitePostRepository { conn: self.conn }
    }

    pub fn likes(&self) -> impl LikeRepository + '_ {
        likes::SqliteLikeRepository { conn: self.conn }
    }

    pub fn comments(&self) -> impl CommentRepository + '_ {
        comments::SqliteCommentRepository { conn: self.conn }
    }

    pub fn products(&self) -> impl ProductRepository + '_ {
        products::SqliteProductRepository { conn: self.conn }
    }

    pub fn conn(&self) -> &'conn Connection {
        self.conn
    }
}
