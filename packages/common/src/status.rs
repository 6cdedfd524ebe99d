#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hard character limit for simple (non-article) post content.
pub const SIMPLE_POST_CHAR_LIMIT: usize = 1300;

/// Background-processing state of a theme or post.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    /// No background work in flight.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "idle"))]
    Idle,
    /// A task for this entity has been enqueued or is running.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "processing"))]
    Processing,
    /// The most recent task finished successfully.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "completed"))]
    Completed,
    /// The most recent task exhausted its retries or timed out.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "failed"))]
    Failed,
}

impl ProcessingStatus {
    /// Returns true while a task for the entity is enqueued or running.
    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing)
    }

    /// All possible values.
    pub const ALL: &'static [ProcessingStatus] =
        &[Self::Idle, Self::Processing, Self::Completed, Self::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ProcessingStatus {
    fn default() -> Self {
        Self::Idle
    }
}

/// Editorial lifecycle state of a post.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Created but not yet generated or reviewed.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "draft"))]
    Draft,
    /// Content produced by a generation task.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "generated"))]
    Generated,
    /// Published to the outside world.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "published"))]
    Published,
    /// Scheduled for a future publish date.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "scheduled"))]
    Scheduled,
}

impl PostStatus {
    pub const ALL: &'static [PostStatus] =
        &[Self::Draft, Self::Generated, Self::Published, Self::Scheduled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Generated => "generated",
            Self::Published => "published",
            Self::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for PostStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// The two content formats the generators produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    /// Plain-text post, capped at [`SIMPLE_POST_CHAR_LIMIT`] characters.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "simple"))]
    Simple,
    /// Long-form markdown article with a separate promotional teaser.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "article"))]
    Article,
}

impl PostType {
    pub const ALL: &'static [PostType] = &[Self::Simple, Self::Article];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Article => "article",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for PostType {
    fn default() -> Self {
        Self::Simple
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    kind: &'static str,
    invalid: String,
    valid: &'static str,
}

impl ParseStatusError {
    pub(crate) fn new(kind: &'static str, invalid: &str, valid: &'static str) -> Self {
        Self {
            kind,
            invalid: invalid.to_string(),
            valid,
        }
    }
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid {} '{}'. Valid values: {}",
            self.kind, self.invalid, self.valid
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for ProcessingStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseStatusError::new(
                "processing status",
                s,
                "idle, processing, completed, failed",
            )),
        }
    }
}

impl FromStr for PostStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "generated" => Ok(Self::Generated),
            "published" => Ok(Self::Published),
            "scheduled" => Ok(Self::Scheduled),
            _ => Err(ParseStatusError::new(
                "post status",
                s,
                "draft, generated, published, scheduled",
            )),
        }
    }
}

impl FromStr for PostType {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Self::Simple),
            "article" => Ok(Self::Article),
            _ => Err(ParseStatusError::new("post type", s, "simple, article")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_roundtrip() {
        for status in ProcessingStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            let parsed: ProcessingStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(*status, parsed);
        }
        for status in PostStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            let parsed: PostStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(*status, parsed);
        }
    }

    #[test]
    fn test_wire_strings_are_lowercase() {
        assert_eq!(
            serde_json::to_string(&ProcessingStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::to_string(&PostStatus::Generated).unwrap(),
            "\"generated\""
        );
        assert_eq!(serde_json::to_string(&PostType::Article).unwrap(), "\"article\"");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("idle".parse::<ProcessingStatus>().unwrap(), ProcessingStatus::Idle);
        assert_eq!("article".parse::<PostType>().unwrap(), PostType::Article);
        assert!("Article".parse::<PostType>().is_err());
        assert!("unknown".parse::<PostStatus>().is_err());
    }

    #[test]
    fn test_is_processing() {
        assert!(ProcessingStatus::Processing.is_processing());
        assert!(!ProcessingStatus::Completed.is_processing());
    }
}
