use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub id: String,
    pub display_name: String,
    pub avatar_ref: Option<String>,
    pub visibility: String, // 'public', 'restricted', or 'private'
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub author_id: String,
    pub result_image_ref: String,
    pub category: Option<String>,
    pub vibe_tag: Option<String>,
    /// True for authentically photographed looks, false for synthesized renders.
    pub is_manual: bool,
    pub like_count: i64,
    pub view_count: i64,
    pub score: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub author_display_name: String,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeRecord {
    pub post_id: String,
    pub author_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub brand: String,
    pub name: String,
    pub image_ref: String,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub like_count: i64,
    pub comment_count: i64,
    pub view_count: i64,
    pub created_at: String,
}
