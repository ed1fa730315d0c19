//! Book and category models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use unicode_normalization::UnicodeNormalization;
use utoipa::ToSchema;
use validator::Validate;

use super::comment::CommentNode;
use super::user::UserBrief;

/// Book category
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub category_id: Option<i32>,
    pub owner_id: i32,
    pub image_url: Option<String>,
    pub language: String,
    pub short_description: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub slug: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub image_url: Option<String>,
    pub rating: i32,
}

/// Book with full details for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub slug: String,
    pub language: String,
    pub image_url: Option<String>,
    pub short_description: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub rating: i32,
    pub category: Option<Category>,
    pub owner: UserBrief,
    pub comments: Vec<CommentNode>,
    /// True iff no borrow request for this book is currently accepted
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "Author must be 1-255 characters"))]
    pub author: String,
    /// Category name; created on the fly when unknown
    pub category: Option<String>,
    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
    #[validate(length(min = 1, max = 30, message = "Language must be 1-30 characters"))]
    pub language: String,
    pub short_description: Option<String>,
    pub published_date: Option<NaiveDate>,
}

/// Update book request (partial)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Author must be 1-255 characters"))]
    pub author: Option<String>,
    pub category: Option<String>,
    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
    #[validate(length(min = 1, max = 30, message = "Language must be 1-30 characters"))]
    pub language: Option<String>,
    pub short_description: Option<String>,
    pub published_date: Option<NaiveDate>,
}

/// Derive a URL slug from a title: accents stripped via NFKD, lowered,
/// non-alphanumeric runs collapsed to single dashes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.nfkd() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_dash = false;
        } else if c.is_ascii() {
            pending_dash = true;
        }
        // combining marks and other non-ascii fall out entirely
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_lowercases_and_dashes() {
        assert_eq!(slugify("The Rust Programming Language"), "the-rust-programming-language");
    }

    #[test]
    fn slug_strips_accents() {
        assert_eq!(slugify("Cien años de soledad"), "cien-anos-de-soledad");
        assert_eq!(slugify("Éloge de l'ombre"), "eloge-de-l-ombre");
    }

    #[test]
    fn slug_collapses_separator_runs() {
        assert_eq!(slugify("  war --  & peace  "), "war-peace");
        assert_eq!(slugify("1984"), "1984");
    }

    #[test]
    fn slug_has_no_edge_dashes() {
        let slug = slugify("...Dune...");
        assert!(!slug.starts_with('-'));
        assert!(!slug.ends_with('-'));
        assert_eq!(slug, "dune");
    }
}
