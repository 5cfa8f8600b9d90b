//! Place documents
//!
//! A place is a destination saved by one user. Every text field is optional;
//! `visited` defaults to false. Request bodies arrive as [`PlaceInput`] and are
//! validated into a [`PlaceDraft`] (create) or a [`PlacePatch`] (update).

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::ValidationError;

const MAX_SHORT_TEXT: usize = 256;
const MAX_URL_LEN: usize = 2048;
const MAX_DESCRIPTION_LEN: usize = 4096;

static HTTP_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("invalid url regex"));

/// Place record as stored
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Place {
    pub id: Uuid,
    pub username: String,
    pub name: Option<String>,
    pub country: Option<String>,
    pub kind: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub season_to_go: Option<String>,
    pub visited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw place body. Unknown keys (including `username` and `_id`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceInput {
    pub name: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub season_to_go: Option<String>,
    pub visited: Option<bool>,
}

/// Validated fields for a new place
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceDraft {
    pub name: Option<String>,
    pub country: Option<String>,
    pub kind: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub season_to_go: Option<String>,
    pub visited: bool,
}

/// Validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacePatch {
    pub name: Option<String>,
    pub country: Option<String>,
    pub kind: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub season_to_go: Option<String>,
    pub visited: Option<bool>,
}

impl PlaceDraft {
    pub fn validate(input: PlaceInput) -> Result<Self, ValidationError> {
        let patch = PlacePatch::validate(input)?;
        Ok(Self {
            name: patch.name,
            country: patch.country,
            kind: patch.kind,
            image: patch.image,
            url: patch.url,
            description: patch.description,
            season_to_go: patch.season_to_go,
            visited: patch.visited.unwrap_or(false),
        })
    }
}

impl PlacePatch {
    pub fn validate(input: PlaceInput) -> Result<Self, ValidationError> {
        let name = text("name", input.name, MAX_SHORT_TEXT)?;
        if name.as_deref().is_some_and(|n| n.is_empty()) {
            return Err(ValidationError::Empty { field: "name" });
        }

        Ok(Self {
            name,
            country: text("country", input.country, MAX_SHORT_TEXT)?,
            kind: text("type", input.kind, MAX_SHORT_TEXT)?,
            image: url("image", input.image)?,
            url: url("url", input.url)?,
            description: text("description", input.description, MAX_DESCRIPTION_LEN)?,
            season_to_go: text("seasonToGo", input.season_to_go, MAX_SHORT_TEXT)?,
            visited: input.visited,
        })
    }

    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch to a stored place in memory.
    pub fn apply(self, place: &mut Place) {
        fn set(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut place.name, self.name);
        set(&mut place.country, self.country);
        set(&mut place.kind, self.kind);
        set(&mut place.image, self.image);
        set(&mut place.url, self.url);
        set(&mut place.description, self.description);
        set(&mut place.season_to_go, self.season_to_go);
        if let Some(visited) = self.visited {
            place.visited = visited;
        }
    }
}

/// Trim and length-check an optional text field.
fn text(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let trimmed = value.trim();
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }

    Ok(Some(trimmed.to_owned()))
}

/// Optional http(s) URL. An empty string clears the field.
fn url(field: &'static str, value: Option<String>) -> Result<Option<String>, ValidationError> {
    let value = text(field, value, MAX_URL_LEN)?;
    match value.as_deref() {
        Some(v) if !v.is_empty() && !HTTP_URL_RE.is_match(v) => {
            Err(ValidationError::InvalidFormat {
                field,
                reason: "must be an http(s) URL",
            })
        }
        _ => Ok(value),
    }
}
