//! Demo content for local development. Everything goes through the real
//! services so counters and stored scores stay consistent with the
//! accumulator rules.

use crate::catalog::{CatalogService, UpsertProductInput};
use crate::database::Database;
use crate::feed::{CreateCommentInput, CreatePostInput, FeedService, RegisterAuthorInput};
use anyhow::Result;

pub struct SeedSummary {
    pub authors: usize,
    pub posts: usize,
    pub products: usize,
}

pub fn load_demo(database: &Database) -> Result<SeedSummary> {
    let feed = FeedService::new(database.clone());
    let catalog = CatalogService::new(database.clone());

    let authors = [
        ("mira", "Mira Okafor", "public"),
        ("jonas", "Jonas Wehrli", "public"),
        ("sana", "Sana Fujimoto", "private"),
    ];
    for (id, name, visibility) in &authors {
        feed.register_author(RegisterAuthorInput {
            id: Some((*id).to_string()),
            display_name: (*name).to_string(),
            avatar_ref: Some(format!("https://cdn.lookbook.example/avatars/{id}.png")),
            visibility: Some((*visibility).to_string()),
        })?;
    }

    let posts = [
        ("mira", "renders/mira-denim.png", "denim", "street", false),
        ("mira", "renders/mira-gown.png", "dresses", "evening", false),
        ("jonas", "shots/jonas-linen.jpg", "shirts", "casual", true),
        ("sana", "renders/sana-coat.png", "coats", "minimal", false),
    ];
    let mut post_ids = Vec::new();
    for (author, image, category, vibe, is_manual) in &posts {
        let view = feed.create_post(CreatePostInput {
            author_id: (*author).to_string(),
            result_image_ref: format!("https://cdn.lookbook.example/{image}"),
            category: Some((*category).to_string()),
            vibe_tag: Some((*vibe).to_string()),
            is_manual: *is_manual,
            created_at: None,
        })?;
        post_ids.push(view.id);
    }

    feed.like(&post_ids[0], "jonas")?;
    feed.like(&post_ids[0], "sana")?;
    feed.like(&post_ids[1], "jonas")?;
    feed.comment(
        &post_ids[0],
        CreateCommentInput {
            author_id: "jonas".into(),
            author_display_name: "Jonas Wehrli".into(),
            text: "the wash on that denim is perfect".into(),
        },
    )?;
    feed.comment(
        &post_ids[2],
        CreateCommentInput {
            author_id: "mira".into(),
            author_display_name: "Mira Okafor".into(),
            text: "linen season!".into(),
        },
    )?;
    for _ in 0..5 {
        feed.record_view(&post_ids[0])?;
    }
    feed.record_view(&post_ids[1])?;
    feed.record_view(&post_ids[2])?;

    let products = [
        ("aurora-slip", "Maison Aurore", "Aurora slip dress", "dresses", 18900),
        ("harbor-jacket", "Atelier Nord", "Harbor denim jacket", "jackets", 23900),
        ("dune-knit", "Studio Dune", "Dune cropped knit", "knitwear", 12400),
        ("atlas-trouser", "Atelier Nord", "Atlas wide trouser", "trousers", 15900),
    ];
    for (id, brand, name, category, price) in &products {
        catalog.upsert(UpsertProductInput {
            id: Some((*id).to_string()),
            brand: (*brand).to_string(),
            name: (*name).to_string(),
            image_ref: format!("https://cdn.lookbook.example/products/{id}.png"),
            category: Some((*category).to_string()),
            price_cents: Some(*price),
        })?;
    }

    catalog.like("aurora-slip", "mira")?;
    catalog.like("aurora-slip", "jonas")?;
    catalog.like("harbor-jacket", "sana")?;
    catalog.record_comment("aurora-slip")?;
    for _ in 0..8 {
        catalog.record_view("aurora-slip")?;
    }
    for _ in 0..3 {
        catalog.record_view("dune-knit")?;
    }

    Ok(SeedSummary {
        authors: authors.len(),
        posts: post_ids.len(),
        products: products.len(),
    })
}
