//! The brand marketplace. Products rank by a continuous trend score
//! computed from current counters on every read, unlike the feed's stored
//! accumulator; the two schemes are deliberately separate.

use crate::database::models::ProductRecord;
use crate::database::repositories::ProductRepository;
use crate::database::Database;
use crate::feed::{FeedError, Viewer};
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

pub const CATALOG_LIKE_WEIGHT: f64 = 2.0;
pub const CATALOG_COMMENT_WEIGHT: f64 = 1.5;
pub const CATALOG_VIEW_WEIGHT: f64 = 0.1;

/// Pure function of the current counters; never persisted.
pub fn trend_score(likes: i64, comments: i64, views: i64) -> f64 {
    likes as f64 * CATALOG_LIKE_WEIGHT
        + comments as f64 * CATALOG_COMMENT_WEIGHT
        + views as f64 * CATALOG_VIEW_WEIGHT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductView {
    pub id: String,
    pub brand: String,
    pub name: String,
    pub image_ref: String,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub like_count: i64,
    pub comment_count: i64,
    pub view_count: i64,
    pub trend_score: f64,
    pub liked_by_me: bool,
    pub created_at: String,
}

impl ProductView {
    fn from_record(record: ProductRecord, liked_by_me: bool) -> Self {
        let trend_score = trend_score(record.like_count, record.comment_count, record.view_count);
        Self {
            id: record.id,
            brand: record.brand,
            name: record.name,
            image_ref: record.image_ref,
            category: record.category,
            price_cents: record.price_cents,
            like_count: record.like_count,
            comment_count: record.comment_count,
            view_count: record.view_count,
            trend_score,
            liked_by_me,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertProductInput {
    #[serde(default)]
    pub id: Option<String>,
    pub brand: String,
    pub name: String,
    pub image_ref: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductLikeOutcome {
    pub newly_liked: bool,
    pub like_count: i64,
    pub trend_score: f64,
}

#[derive(Clone)]
pub struct CatalogService {
    database: Database,
}

impl CatalogService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Catalogue listing ordered by trend score, recomputed from counters on
    /// every call.
    pub fn list_trending(
        &self,
        viewer: &Viewer,
        limit: usize,
    ) -> Result<Vec<ProductView>, FeedError> {
        let (products, liked_ids) = self
            .database
            .with_repositories(|repos| {
                let products = repos.products().list_all()?;
                let liked_ids = match viewer.id.as_deref() {
                    Some(viewer_id) => repos.products().liked_ids_for(viewer_id)?,
                    None => Vec::new(),
                };
                Ok((products, liked_ids))
            })
            .map_err(FeedError::store)?;

        let liked: HashSet<String> = liked_ids.into_iter().collect();
        let mut views: Vec<ProductView> = products
            .into_iter()
            .map(|record| {
                let liked_by_me = liked.contains(&record.id);
                ProductView::from_record(record, liked_by_me)
            })
            .collect();

        views.sort_by(|a, b| {
            b.trend_score
                .total_cmp(&a.trend_score)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        views.truncate(limit);
        Ok(views)
    }

    pub fn get_product(&self, product_id: &str, viewer: &Viewer) -> Result<ProductView, FeedError> {
        let found = self
            .database
            .with_repositories(|repos| {
                let Some(record) = repos.products().get(product_id)? else {
                    return Ok(None);
                };
                let liked_by_me = match viewer.id.as_deref() {
                    Some(viewer_id) => repos.products().has_liked(product_id, viewer_id)?,
                    None => false,
                };
                Ok(Some(ProductView::from_record(record, liked_by_me)))
            })
            .map_err(FeedError::store)?;

        found.ok_or(FeedError::NotFound("product"))
    }

    pub fn like(
        &self,
        product_id: &str,
        author_id: &str,
    ) -> Result<ProductLikeOutcome, FeedError> {
        let author_id = author_id.trim();
        if author_id.is_empty() {
            return Err(FeedError::Validation("author id may not be empty".into()));
        }

        let outcome = self
            .database
            .with_repositories(|repos| {
                if repos.products().get(product_id)?.is_none() {
                    return Ok(None);
                }
                let newly_liked = repos
                    .products()
                    .add_like(product_id, author_id, &now_utc_iso())?;
                let product = repos.products().get(product_id)?;
                Ok(product.map(|record| ProductLikeOutcome {
                    newly_liked,
                    like_count: record.like_count,
                    trend_score: trend_score(
                        record.like_count,
                        record.comment_count,
                        record.view_count,
                    ),
                }))
            })
            .map_err(FeedError::store)?;

        outcome.ok_or(FeedError::NotFound("product"))
    }

    /// Same policy as post views: no viewer dedup, every call counts.
    pub fn record_view(&self, product_id: &str) -> Result<(), FeedError> {
        let bumped = self
            .database
            .with_repositories(|repos| repos.products().record_view(product_id))
            .map_err(FeedError::store)?;
        if !bumped {
            return Err(FeedError::NotFound("product"));
        }
        Ok(())
    }

    /// Catalogue comments feed the trend score as a counter only; the
    /// marketplace keeps no comment bodies.
    pub fn record_comment(&self, product_id: &str) -> Result<(), FeedError> {
        let bumped = self
            .database
            .with_repositories(|repos| repos.products().record_comment(product_id))
            .map_err(FeedError::store)?;
        if !bumped {
            return Err(FeedError::NotFound("product"));
        }
        Ok(())
    }

    pub fn upsert(&self, input: UpsertProductInput) -> Result<ProductView, FeedError> {
        if input.brand.trim().is_empty() || input.name.trim().is_empty() {
            return Err(FeedError::Validation(
                "product brand and name may not be empty".into(),
            ));
        }
        if input.image_ref.trim().is_empty() {
            return Err(FeedError::Validation(
                "product image reference may not be empty".into(),
            ));
        }

        let record = ProductRecord {
            id: input.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            brand: input.brand,
            name: input.name,
            image_ref: input.image_ref,
            category: input.category,
            price_cents: input.price_cents,
            like_count: 0,
            comment_count: 0,
            view_count: 0,
            created_at: now_utc_iso(),
        };

        let stored = self
            .database
            .with_repositories(|repos| {
                repos.products().upsert(&record)?;
                repos.products().get(&record.id)
            })
            .map_err(FeedError::store)?;

        stored
            .map(|record| ProductView::from_record(record, false))
            .ok_or(FeedError::NotFound("product"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup_service() -> CatalogService {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let db = Database::from_connection(conn, true);
        db.ensure_migrations().expect("migrations");
        CatalogService::new(db)
    }

    fn upsert(service: &CatalogService, id: &str, name: &str) -> ProductView {
        service
            .upsert(UpsertProductInput {
                id: Some(id.into()),
                brand: "Atelier Nord".into(),
                name: name.into(),
                image_ref: format!("https://cdn.example/products/{id}.png"),
                category: Some("dresses".into()),
                price_cents: Some(12900),
            })
            .expect("upsert product")
    }

    #[test]
    fn trend_score_uses_continuous_weights() {
        assert_eq!(trend_score(0, 0, 0), 0.0);
        assert_eq!(trend_score(10, 4, 100), 10.0 * 2.0 + 4.0 * 1.5 + 100.0 * 0.1);
    }

    #[test]
    fn listing_orders_by_trend_score() {
        let service = setup_service();
        upsert(&service, "quiet", "Plain tee");
        upsert(&service, "steady", "Wool coat");
        upsert(&service, "hot", "Linen wrap dress");

        // hot: 2 likes + 1 comment = 5.5; steady: 1 like = 2.0; quiet: 3 views = 0.3
        service.like("hot", "u1").unwrap();
        service.like("hot", "u2").unwrap();
        service.record_comment("hot").unwrap();
        service.like("steady", "u1").unwrap();
        for _ in 0..3 {
            service.record_view("quiet").unwrap();
        }

        let listed = service.list_trending(&Viewer::anonymous(), 10).unwrap();
        let ids: Vec<&str> = listed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["hot", "steady", "quiet"]);
        assert!(listed[0].trend_score > listed[1].trend_score);
    }

    #[test]
    fn product_likes_are_idempotent() {
        let service = setup_service();
        upsert(&service, "prod-1", "Linen wrap dress");

        let first = service.like("prod-1", "u1").unwrap();
        assert!(first.newly_liked);
        assert_eq!(first.like_count, 1);
        assert_eq!(first.trend_score, 2.0);

        let second = service.like("prod-1", "u1").unwrap();
        assert!(!second.newly_liked);
        assert_eq!(second.like_count, 1);
    }

    #[test]
    fn views_and_comments_feed_the_trend_score() {
        let service = setup_service();
        upsert(&service, "prod-1", "Linen wrap dress");

        service.record_view("prod-1").unwrap();
        service.record_view("prod-1").unwrap();
        service.record_comment("prod-1").unwrap();

        let fetched = service
            .get_product("prod-1", &Viewer::anonymous())
            .unwrap();
        assert_eq!(fetched.view_count, 2);
        assert_eq!(fetched.comment_count, 1);
        assert_eq!(fetched.trend_score, 2.0 * 0.1 + 1.5);
    }

    #[test]
    fn liked_by_me_follows_the_viewer() {
        let service = setup_service();
        upsert(&service, "prod-1", "Linen wrap dress");
        service.like("prod-1", "u1").unwrap();

        let for_liker = service
            .get_product("prod-1", &Viewer::known("u1"))
            .unwrap();
        assert!(for_liker.liked_by_me);

        let for_other = service
            .get_product("prod-1", &Viewer::known("u2"))
            .unwrap();
        assert!(!for_other.liked_by_me);

        let listed = service.list_trending(&Viewer::known("u1"), 10).unwrap();
        assert!(listed[0].liked_by_me);
    }

    #[test]
    fn missing_products_are_not_found() {
        let service = setup_service();
        assert!(matches!(
            service.like("ghost", "u1").unwrap_err(),
            FeedError::NotFound("product")
        ));
        assert!(matches!(
            service.record_view("ghost").unwrap_err(),
            FeedError::NotFound("product")
        ));
        assert!(matches!(
            service
                .get_product("ghost", &Viewer::anonymous())
                .unwrap_err(),
            FeedError::NotFound("product")
        ));
    }
}
