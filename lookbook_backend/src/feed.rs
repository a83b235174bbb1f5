//! The shared feed: engagement scoring, visibility filtering, and the
//! mutation operations that keep a post's counters and stored score in step.

use crate::database::models::{AuthorRecord, CommentRecord, LikeRecord, PostRecord};
use crate::database::repositories::{
    AuthorRepository, CommentRepository, LikeRepository, PostRepository,
};
use crate::database::Database;
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Flat additive weights for the social feed. The catalogue uses a
/// different, continuous scheme (see `catalog`); the two are intentionally
/// not unified.
pub const LIKE_WEIGHT: i64 = 15;
pub const COMMENT_WEIGHT: i64 = 10;
pub const VIEW_WEIGHT: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engagement {
    Like,
    Comment,
    View,
}

pub fn engagement_weight(kind: Engagement) -> i64 {
    match kind {
        Engagement::Like => LIKE_WEIGHT,
        Engagement::Comment => COMMENT_WEIGHT,
        Engagement::View => VIEW_WEIGHT,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Restricted,
    Private,
}

impl Visibility {
    /// Unknown values read as private so a malformed author row can never
    /// widen exposure.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "public" => Visibility::Public,
            "restricted" => Visibility::Restricted,
            _ => Visibility::Private,
        }
    }

    pub fn is_known(raw: &str) -> bool {
        matches!(raw, "public" | "restricted" | "private")
    }
}

/// The identity requesting a feed. Anonymous viewers carry no id and only
/// ever see public-author posts.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub id: Option<String>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self { id: None }
    }

    pub fn known(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }

    /// Blank ids from the query string count as anonymous.
    pub fn from_optional(id: Option<String>) -> Self {
        match id {
            Some(raw) if !raw.trim().is_empty() => Self::known(raw),
            _ => Self::anonymous(),
        }
    }

    fn owns(&self, post: &PostRecord) -> bool {
        self.id.as_deref() == Some(post.author_id.as_str())
    }
}

/// Decides whether a post belongs in the viewer's feed: authors always see
/// their own posts, everyone else requires a resolved public author.
pub fn include_in_feed(post: &PostRecord, author: Option<&AuthorRecord>, viewer: &Viewer) -> bool {
    if viewer.owns(post) {
        return true;
    }
    match author {
        Some(author) => Visibility::parse(&author.visibility) == Visibility::Public,
        None => false,
    }
}

/// A post plus the engagement collections loaded alongside it.
#[derive(Debug, Clone)]
pub struct FeedPost {
    pub record: PostRecord,
    pub liked_by: Vec<String>,
    pub comment_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: String,
    pub author_id: String,
    pub result_image_ref: String,
    pub category: Option<String>,
    pub vibe_tag: Option<String>,
    pub is_manual: bool,
    pub like_count: i64,
    pub view_count: i64,
    pub comment_count: i64,
    pub score: i64,
    pub created_at: String,
}

impl PostView {
    fn from_parts(record: PostRecord, comment_count: i64) -> Self {
        Self {
            id: record.id,
            author_id: record.author_id,
            result_image_ref: record.result_image_ref,
            category: record.category,
            vibe_tag: record.vibe_tag,
            is_manual: record.is_manual,
            like_count: record.like_count,
            view_count: record.view_count,
            comment_count,
            score: record.score,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: String,
    pub display_name: String,
    pub avatar_ref: Option<String>,
}

impl AuthorSummary {
    fn from_record(record: &AuthorRecord) -> Self {
        Self {
            id: record.id.clone(),
            display_name: record.display_name.clone(),
            avatar_ref: record.avatar_ref.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub post: PostView,
    pub author: Option<AuthorSummary>,
    pub liked_by_me: bool,
    pub is_mine: bool,
}

impl FeedEntry {
    fn for_viewer(post: FeedPost, author: Option<&AuthorRecord>, viewer: &Viewer) -> Self {
        let liked_by_me = viewer
            .id
            .as_deref()
            .map(|id| post.liked_by.iter().any(|liker| liker == id))
            .unwrap_or(false);
        let is_mine = viewer.owns(&post.record);
        Self {
            post: PostView::from_parts(post.record, post.comment_count),
            author: author.map(AuthorSummary::from_record),
            liked_by_me,
            is_mine,
        }
    }
}

/// Filters and orders the feed for one viewer: visibility predicate first,
/// then score descending with recency as the tie-break. Recomputed fresh on
/// every call; no cursor state survives between assemblies.
pub fn assemble(posts: Vec<FeedPost>, authors: &[AuthorRecord], viewer: &Viewer) -> Vec<FeedEntry> {
    let by_id: HashMap<&str, &AuthorRecord> =
        authors.iter().map(|a| (a.id.as_str(), a)).collect();

    let mut entries: Vec<FeedEntry> = posts
        .into_iter()
        .filter_map(|post| {
            let author = by_id.get(post.record.author_id.as_str()).copied();
            if !include_in_feed(&post.record, author, viewer) {
                return None;
            }
            Some(FeedEntry::for_viewer(post, author, viewer))
        })
        .collect();

    entries.sort_by(|a, b| {
        b.post
            .score
            .cmp(&a.post.score)
            .then_with(|| b.post.created_at.cmp(&a.post.created_at))
    });
    entries
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("store unavailable: {0}")]
    Unavailable(anyhow::Error),
}

impl FeedError {
    pub(crate) fn store(err: anyhow::Error) -> Self {
        FeedError::Unavailable(err)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    pub author_id: String,
    pub result_image_ref: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub vibe_tag: Option<String>,
    #[serde(default)]
    pub is_manual: bool,
    /// Optional timestamp for imported posts. If None, uses current time.
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentInput {
    pub author_id: String,
    pub author_display_name: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: String,
    pub author_id: String,
    pub author_display_name: String,
    pub text: String,
    pub created_at: String,
}

impl CommentView {
    fn from_record(record: CommentRecord) -> Self {
        Self {
            id: record.id,
            author_id: record.author_id,
            author_display_name: record.author_display_name,
            text: record.text,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeOutcome {
    pub newly_liked: bool,
    pub like_count: i64,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAuthorInput {
    #[serde(default)]
    pub id: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub avatar_ref: Option<String>,
    /// Defaults to public when absent.
    #[serde(default)]
    pub visibility: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: String,
    pub display_name: String,
    pub avatar_ref: Option<String>,
    pub visibility: String,
    pub created_at: String,
}

impl AuthorView {
    fn from_record(record: AuthorRecord) -> Self {
        Self {
            id: record.id,
            display_name: record.display_name,
            avatar_ref: record.avatar_ref,
            visibility: record.visibility,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetails {
    pub post: PostView,
    pub author: Option<AuthorSummary>,
    pub liked_by_me: bool,
    pub is_mine: bool,
    pub comments: Vec<CommentView>,
}

#[derive(Clone)]
pub struct FeedService {
    database: Database,
}

impl FeedService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Fetches all posts and authors and assembles in memory. Fine at this
    /// scale; a larger deployment would push the join into the store.
    pub fn assemble_for(&self, viewer: &Viewer, limit: usize) -> Result<Vec<FeedEntry>, FeedError> {
        let (posts, authors, likes, comment_counts) = self
            .database
            .with_repositories(|repos| {
                let posts = repos.posts().list_all()?;
                let authors = repos.authors().list()?;
                let likes = repos.likes().list_all()?;
                let comment_counts = repos.comments().counts_by_post()?;
                Ok((posts, authors, likes, comment_counts))
            })
            .map_err(FeedError::store)?;

        let mut liked_by: HashMap<String, Vec<String>> = HashMap::new();
        for like in likes {
            liked_by.entry(like.post_id).or_default().push(like.author_id);
        }

        let feed_posts: Vec<FeedPost> = posts
            .into_iter()
            .map(|record| FeedPost {
                liked_by: liked_by.remove(&record.id).unwrap_or_default(),
                comment_count: comment_counts.get(&record.id).copied().unwrap_or(0),
                record,
            })
            .collect();

        let mut entries = assemble(feed_posts, &authors, viewer);
        entries.truncate(limit);
        Ok(entries)
    }

    pub fn create_post(&self, input: CreatePostInput) -> Result<PostView, FeedError> {
        if input.author_id.trim().is_empty() {
            return Err(FeedError::Validation("author id may not be empty".into()));
        }
        if input.result_image_ref.trim().is_empty() {
            return Err(FeedError::Validation(
                "post image reference may not be empty".into(),
            ));
        }

        let record = PostRecord {
            id: Uuid::new_v4().to_string(),
            author_id: input.author_id.clone(),
            result_image_ref: input.result_image_ref,
            category: input.category,
            vibe_tag: input.vibe_tag,
            is_manual: input.is_manual,
            like_count: 0,
            view_count: 0,
            score: 0,
            created_at: input.created_at.unwrap_or_else(now_utc_iso),
        };

        let created = self
            .database
            .with_repositories(|repos| {
                if repos.authors().get(&record.author_id)?.is_none() {
                    return Ok(None);
                }
                repos.posts().create(&record)?;
                Ok(Some(record.clone()))
            })
            .map_err(FeedError::store)?;

        created
            .map(|record| PostView::from_parts(record, 0))
            .ok_or(FeedError::NotFound("author"))
    }

    /// Single-post lookup with the same visibility rule as the feed; a post
    /// the viewer may not see reads as absent rather than as forbidden.
    pub fn get_post(&self, post_id: &str, viewer: &Viewer) -> Result<PostDetails, FeedError> {
        let details = self
            .database
            .with_repositories(|repos| {
                let Some(record) = repos.posts().get(post_id)? else {
                    return Ok(None);
                };
                let author = repos.authors().get(&record.author_id)?;
                if !include_in_feed(&record, author.as_ref(), viewer) {
                    return Ok(None);
                }
                let liked_by = repos.likes().likers_of(post_id)?;
                let comments = repos.comments().list_for_post(post_id)?;
                let post = FeedPost {
                    comment_count: comments.len() as i64,
                    liked_by,
                    record,
                };
                let entry = FeedEntry::for_viewer(post, author.as_ref(), viewer);
                Ok(Some(PostDetails {
                    post: entry.post,
                    author: entry.author,
                    liked_by_me: entry.liked_by_me,
                    is_mine: entry.is_mine,
                    comments: comments.into_iter().map(CommentView::from_record).collect(),
                }))
            })
            .map_err(FeedError::store)?;

        details.ok_or(FeedError::NotFound("post"))
    }

    /// Idempotent: a second like from the same author is a no-op that still
    /// reports the current counters.
    pub fn like(&self, post_id: &str, author_id: &str) -> Result<LikeOutcome, FeedError> {
        let author_id = author_id.trim();
        if author_id.is_empty() {
            return Err(FeedError::Validation("author id may not be empty".into()));
        }

        let record = LikeRecord {
            post_id: post_id.to_string(),
            author_id: author_id.to_string(),
            created_at: now_utc_iso(),
        };

        let outcome = self
            .database
            .with_repositories(|repos| {
                if repos.posts().get(post_id)?.is_none() {
                    return Ok(None);
                }
                let newly_liked = repos
                    .likes()
                    .add(&record, engagement_weight(Engagement::Like))?;
                let post = repos.posts().get(post_id)?;
                Ok(post.map(|post| LikeOutcome {
                    newly_liked,
                    like_count: post.like_count,
                    score: post.score,
                }))
            })
            .map_err(FeedError::store)?;

        outcome.ok_or(FeedError::NotFound("post"))
    }

    pub fn comment(
        &self,
        post_id: &str,
        input: CreateCommentInput,
    ) -> Result<CommentView, FeedError> {
        if input.text.trim().is_empty() {
            return Err(FeedError::Validation("comment text may not be empty".into()));
        }
        if input.author_id.trim().is_empty() {
            return Err(FeedError::Validation("author id may not be empty".into()));
        }

        let record = CommentRecord {
            id: Uuid::new_v4().to_string(),
            post_id: post_id.to_string(),
            author_id: input.author_id,
            author_display_name: input.author_display_name,
            text: input.text,
            created_at: now_utc_iso(),
        };

        let appended = self
            .database
            .with_repositories(|repos| {
                repos
                    .comments()
                    .append(&record, engagement_weight(Engagement::Comment))
            })
            .map_err(FeedError::store)?;

        if !appended {
            return Err(FeedError::NotFound("post"));
        }
        Ok(CommentView::from_record(record))
    }

    /// An author's profile strip: their posts under the same visibility rule
    /// as the feed, so a private profile reads as empty to strangers while
    /// the author record itself stays resolvable.
    pub fn posts_by_author(
        &self,
        author_id: &str,
        viewer: &Viewer,
    ) -> Result<Vec<FeedEntry>, FeedError> {
        let data = self
            .database
            .with_repositories(|repos| {
                let Some(author) = repos.authors().get(author_id)? else {
                    return Ok(None);
                };
                let posts = repos.posts().list_for_author(author_id)?;
                let mut hydrated = Vec::with_capacity(posts.len());
                for record in posts {
                    let liked_by = repos.likes().likers_of(&record.id)?;
                    let comment_count = repos.comments().count_for_post(&record.id)?;
                    hydrated.push(FeedPost {
                        record,
                        liked_by,
                        comment_count,
                    });
                }
                Ok(Some((author, hydrated)))
            })
            .map_err(FeedError::store)?;

        let Some((author, posts)) = data else {
            return Err(FeedError::NotFound("author"));
        };
        Ok(assemble(posts, std::slice::from_ref(&author), viewer))
    }

    pub fn register_author(&self, input: RegisterAuthorInput) -> Result<AuthorView, FeedError> {
        if input.display_name.trim().is_empty() {
            return Err(FeedError::Validation("display name may not be empty".into()));
        }
        let visibility = input.visibility.unwrap_or_else(|| "public".to_string());
        if !Visibility::is_known(&visibility) {
            return Err(FeedError::Validation(format!(
                "unknown visibility '{visibility}'"
            )));
        }

        let record = AuthorRecord {
            id: input.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            display_name: input.display_name,
            avatar_ref: input.avatar_ref,
            visibility,
            created_at: now_utc_iso(),
        };

        self.database
            .with_repositories(|repos| {
                repos.authors().upsert(&record)?;
                Ok(())
            })
            .map_err(FeedError::store)?;

        Ok(AuthorView::from_record(record))
    }

    pub fn get_author(&self, author_id: &str) -> Result<AuthorView, FeedError> {
        let found = self
            .database
            .with_repositories(|repos| repos.authors().get(author_id))
            .map_err(FeedError::store)?;
        found
            .map(AuthorView::from_record)
            .ok_or(FeedError::NotFound("author"))
    }

    /// Takes effect on the next feed assembly; already-rendered views are
    /// not re-filtered.
    pub fn set_visibility(&self, author_id: &str, visibility: &str) -> Result<AuthorView, FeedError> {
        if !Visibility::is_known(visibility) {
            return Err(FeedError::Validation(format!(
                "unknown visibility '{visibility}'"
            )));
        }

        let updated = self
            .database
            .with_repositories(|repos| repos.authors().set_visibility(author_id, visibility))
            .map_err(FeedError::store)?;
        if !updated {
            return Err(FeedError::NotFound("author"));
        }
        self.get_author(author_id)
    }

    /// Views are never deduplicated by viewer; every call counts.
    pub fn record_view(&self, post_id: &str) -> Result<(), FeedError> {
        let bumped = self
            .database
            .with_repositories(|repos| {
                repos
                    .posts()
                    .record_view(post_id, engagement_weight(Engagement::View))
            })
            .map_err(FeedError::store)?;

        if !bumped {
            return Err(FeedError::NotFound("post"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup_service() -> FeedService {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let db = Database::from_connection(conn, true);
        db.ensure_migrations().expect("migrations");
        FeedService::new(db)
    }

    fn register_author(service: &FeedService, id: &str, visibility: &str) {
        service
            .register_author(RegisterAuthorInput {
                id: Some(id.into()),
                display_name: format!("author {id}"),
                avatar_ref: None,
                visibility: Some(visibility.into()),
            })
            .expect("register author");
    }

    fn create_post(service: &FeedService, author_id: &str) -> PostView {
        service
            .create_post(CreatePostInput {
                author_id: author_id.into(),
                result_image_ref: "https://cdn.example/render.png".into(),
                category: Some("dresses".into()),
                vibe_tag: None,
                is_manual: false,
                created_at: None,
            })
            .expect("create post")
    }

    fn record(id: &str, author_id: &str, score: i64, created_at: &str) -> PostRecord {
        PostRecord {
            id: id.into(),
            author_id: author_id.into(),
            result_image_ref: "ref".into(),
            category: None,
            vibe_tag: None,
            is_manual: false,
            like_count: 0,
            view_count: 0,
            score,
            created_at: created_at.into(),
        }
    }

    fn feed_post(record: PostRecord) -> FeedPost {
        FeedPost {
            record,
            liked_by: Vec::new(),
            comment_count: 0,
        }
    }

    fn author(id: &str, visibility: &str) -> AuthorRecord {
        AuthorRecord {
            id: id.into(),
            display_name: id.into(),
            avatar_ref: None,
            visibility: visibility.into(),
            created_at: "2026-01-01T00:00:00+00:00".into(),
        }
    }

    #[test]
    fn engagement_weights_are_flat_additive() {
        assert_eq!(engagement_weight(Engagement::Like), 15);
        assert_eq!(engagement_weight(Engagement::Comment), 10);
        assert_eq!(engagement_weight(Engagement::View), 1);
    }

    #[test]
    fn own_posts_always_included_regardless_of_visibility() {
        let post = record("p1", "u1", 0, "2026-01-01T00:00:00+00:00");
        let private_author = author("u1", "private");
        let viewer = Viewer::known("u1");
        assert!(include_in_feed(&post, Some(&private_author), &viewer));
        // even when the author row is gone entirely
        assert!(include_in_feed(&post, None, &viewer));
    }

    #[test]
    fn non_public_or_unresolved_authors_are_excluded() {
        let post = record("p1", "u1", 0, "2026-01-01T00:00:00+00:00");
        let viewer = Viewer::known("u2");
        assert!(include_in_feed(&post, Some(&author("u1", "public")), &viewer));
        assert!(!include_in_feed(&post, Some(&author("u1", "restricted")), &viewer));
        assert!(!include_in_feed(&post, Some(&author("u1", "private")), &viewer));
        // malformed visibility fails closed
        assert!(!include_in_feed(&post, Some(&author("u1", "everyone")), &viewer));
        // missing author record fails closed
        assert!(!include_in_feed(&post, None, &viewer));
    }

    #[test]
    fn anonymous_viewers_see_only_public_authors() {
        let post = record("p1", "u1", 0, "2026-01-01T00:00:00+00:00");
        let viewer = Viewer::anonymous();
        assert!(include_in_feed(&post, Some(&author("u1", "public")), &viewer));
        assert!(!include_in_feed(&post, Some(&author("u1", "private")), &viewer));
    }

    #[test]
    fn assemble_sorts_by_score_then_recency() {
        let authors = vec![author("u1", "public")];
        let posts = vec![
            feed_post(record("old-low", "u1", 5, "2026-01-01T00:00:00+00:00")),
            feed_post(record("tied-old", "u1", 20, "2026-01-02T00:00:00+00:00")),
            feed_post(record("tied-new", "u1", 20, "2026-01-03T00:00:00+00:00")),
            feed_post(record("top", "u1", 40, "2026-01-01T12:00:00+00:00")),
        ];
        let entries = assemble(posts, &authors, &Viewer::anonymous());
        let ids: Vec<&str> = entries.iter().map(|e| e.post.id.as_str()).collect();
        assert_eq!(ids, vec!["top", "tied-new", "tied-old", "old-low"]);
        for pair in entries.windows(2) {
            assert!(pair[0].post.score >= pair[1].post.score);
        }
    }

    #[test]
    fn assemble_of_empty_collections_is_empty() {
        let entries = assemble(Vec::new(), &[], &Viewer::anonymous());
        assert!(entries.is_empty());
    }

    #[test]
    fn assemble_flags_likes_and_ownership_for_viewer() {
        let authors = vec![author("u1", "public")];
        let mut mine = feed_post(record("p1", "u1", 0, "2026-01-01T00:00:00+00:00"));
        mine.liked_by = vec!["u2".into()];
        let entries = assemble(vec![mine], &authors, &Viewer::known("u2"));
        assert_eq!(entries.len(), 1);
        assert!(entries[0].liked_by_me);
        assert!(!entries[0].is_mine);

        let mine = feed_post(record("p1", "u1", 0, "2026-01-01T00:00:00+00:00"));
        let entries = assemble(vec![mine], &authors, &Viewer::known("u1"));
        assert!(entries[0].is_mine);
        assert!(!entries[0].liked_by_me);
    }

    #[test]
    fn like_is_idempotent() {
        let service = setup_service();
        register_author(&service, "u1", "public");
        let post = create_post(&service, "u1");

        let first = service.like(&post.id, "u2").expect("first like");
        assert!(first.newly_liked);
        assert_eq!(first.like_count, 1);
        assert_eq!(first.score, 15);

        let second = service.like(&post.id, "u2").expect("second like");
        assert!(!second.newly_liked);
        assert_eq!(second.like_count, 1);
        assert_eq!(second.score, 15);
    }

    #[test]
    fn score_never_decreases_under_engagement() {
        let service = setup_service();
        register_author(&service, "u1", "public");
        let post = create_post(&service, "u1");

        let mut last_score = 0;
        let mut observe = |score: i64| {
            assert!(score >= last_score);
            last_score = score;
        };

        observe(service.like(&post.id, "u2").unwrap().score);
        observe(service.like(&post.id, "u2").unwrap().score); // no-op, unchanged
        service
            .comment(
                &post.id,
                CreateCommentInput {
                    author_id: "u3".into(),
                    author_display_name: "u3".into(),
                    text: "love the drape".into(),
                },
            )
            .unwrap();
        service.record_view(&post.id).unwrap();
        service.record_view(&post.id).unwrap();

        let details = service
            .get_post(&post.id, &Viewer::known("u1"))
            .expect("post details");
        observe(details.post.score);
        assert_eq!(details.post.score, 15 + 10 + 1 + 1);
        assert_eq!(details.post.view_count, 2);
    }

    #[test]
    fn private_author_hidden_from_others_visible_to_self() {
        let service = setup_service();
        register_author(&service, "u1", "private");
        register_author(&service, "u2", "public");
        let hidden = create_post(&service, "u1");
        let visible = create_post(&service, "u2");

        let for_stranger = service
            .assemble_for(&Viewer::known("u3"), 50)
            .expect("feed for stranger");
        let ids: Vec<&str> = for_stranger.iter().map(|e| e.post.id.as_str()).collect();
        assert!(!ids.contains(&hidden.id.as_str()));
        assert!(ids.contains(&visible.id.as_str()));

        let for_owner = service
            .assemble_for(&Viewer::known("u1"), 50)
            .expect("feed for owner");
        let ids: Vec<&str> = for_owner.iter().map(|e| e.post.id.as_str()).collect();
        assert!(ids.contains(&hidden.id.as_str()));
    }

    #[test]
    fn visibility_change_applies_on_next_assembly() {
        let service = setup_service();
        register_author(&service, "u1", "public");
        let post = create_post(&service, "u1");

        let before = service.assemble_for(&Viewer::known("u3"), 50).unwrap();
        assert_eq!(before.len(), 1);

        let updated = service.set_visibility("u1", "private").unwrap();
        assert_eq!(updated.visibility, "private");

        let after = service.assemble_for(&Viewer::known("u3"), 50).unwrap();
        assert!(after.is_empty());

        // the post itself still exists for its owner
        let own = service.get_post(&post.id, &Viewer::known("u1")).unwrap();
        assert_eq!(own.post.id, post.id);
    }

    #[test]
    fn comments_preserve_issue_order() {
        let service = setup_service();
        register_author(&service, "u1", "public");
        let post = create_post(&service, "u1");

        service
            .comment(
                &post.id,
                CreateCommentInput {
                    author_id: "u2".into(),
                    author_display_name: "u2".into(),
                    text: "nice".into(),
                },
            )
            .unwrap();
        service
            .comment(
                &post.id,
                CreateCommentInput {
                    author_id: "u3".into(),
                    author_display_name: "u3".into(),
                    text: "cool".into(),
                },
            )
            .unwrap();

        let details = service.get_post(&post.id, &Viewer::known("u1")).unwrap();
        let texts: Vec<&str> = details.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["nice", "cool"]);
        assert_eq!(details.comments[0].author_id, "u2");
        assert_eq!(details.comments[1].author_id, "u3");
    }

    #[test]
    fn mutations_reject_bad_input_before_touching_the_store() {
        let service = setup_service();
        register_author(&service, "u1", "public");
        let post = create_post(&service, "u1");

        let err = service
            .comment(
                &post.id,
                CreateCommentInput {
                    author_id: "u2".into(),
                    author_display_name: "u2".into(),
                    text: "   ".into(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, FeedError::Validation(_)));

        let err = service.like(&post.id, "  ").unwrap_err();
        assert!(matches!(err, FeedError::Validation(_)));
    }

    #[test]
    fn mutations_on_missing_posts_are_not_found() {
        let service = setup_service();

        assert!(matches!(
            service.like("ghost", "u2").unwrap_err(),
            FeedError::NotFound("post")
        ));
        assert!(matches!(
            service.record_view("ghost").unwrap_err(),
            FeedError::NotFound("post")
        ));
        assert!(matches!(
            service
                .comment(
                    "ghost",
                    CreateCommentInput {
                        author_id: "u2".into(),
                        author_display_name: "u2".into(),
                        text: "hello".into(),
                    },
                )
                .unwrap_err(),
            FeedError::NotFound("post")
        ));
    }

    #[test]
    fn create_post_requires_existing_author() {
        let service = setup_service();
        let err = service
            .create_post(CreatePostInput {
                author_id: "nobody".into(),
                result_image_ref: "https://cdn.example/render.png".into(),
                category: None,
                vibe_tag: None,
                is_manual: false,
                created_at: None,
            })
            .unwrap_err();
        assert!(matches!(err, FeedError::NotFound("author")));
    }

    #[test]
    fn author_profile_follows_the_visibility_rule() {
        let service = setup_service();
        register_author(&service, "u1", "private");
        let post = create_post(&service, "u1");

        let for_stranger = service
            .posts_by_author("u1", &Viewer::known("u3"))
            .expect("profile for stranger");
        assert!(for_stranger.is_empty());

        let for_owner = service
            .posts_by_author("u1", &Viewer::known("u1"))
            .expect("profile for owner");
        assert_eq!(for_owner.len(), 1);
        assert_eq!(for_owner[0].post.id, post.id);

        assert!(matches!(
            service
                .posts_by_author("ghost", &Viewer::anonymous())
                .unwrap_err(),
            FeedError::NotFound("author")
        ));
    }

    #[test]
    fn author_visibility_updates_validate_the_value() {
        let service = setup_service();
        register_author(&service, "u1", "public");

        let err = service.set_visibility("u1", "everyone").unwrap_err();
        assert!(matches!(err, FeedError::Validation(_)));

        let err = service.set_visibility("ghost", "private").unwrap_err();
        assert!(matches!(err, FeedError::NotFound("author")));

        let err = service
            .register_author(RegisterAuthorInput {
                id: None,
                display_name: "  ".into(),
                avatar_ref: None,
                visibility: None,
            })
            .unwrap_err();
        assert!(matches!(err, FeedError::Validation(_)));
    }

    #[test]
    fn get_post_never_leaks_hidden_content() {
        let service = setup_service();
        register_author(&service, "u1", "private");
        let post = create_post(&service, "u1");

        let err = service
            .get_post(&post.id, &Viewer::known("u3"))
            .unwrap_err();
        assert!(matches!(err, FeedError::NotFound("post")));
    }
}
