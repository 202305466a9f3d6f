//! Canonical protection tags and the metadata stage settings.

use crate::constants::{ARTIST_NOTICE, COPYRIGHT_NOTICE, DESCRIPTION_NOTICE, USER_COMMENT_NOTICE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Character code prefix of an EXIF UserComment holding ASCII text.
pub const USER_COMMENT_ASCII_PREFIX: &[u8; 8] = b"ASCII\0\0\0";

fn default_true() -> bool {
    true
}

/// Tags written by the metadata protector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TagKey {
    Copyright,
    ImageDescription,
    Artist,
    UserComment,
}

impl TagKey {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Copyright => "Copyright",
            Self::ImageDescription => "ImageDescription",
            Self::Artist => "Artist",
            Self::UserComment => "UserComment",
        }
    }

    /// Protection value for this key.
    pub fn canonical_value(&self) -> &'static str {
        match self {
            Self::Copyright => COPYRIGHT_NOTICE,
            Self::ImageDescription => DESCRIPTION_NOTICE,
            Self::Artist => ARTIST_NOTICE,
            Self::UserComment => USER_COMMENT_NOTICE,
        }
    }

    pub fn exif_tag(&self) -> exif::Tag {
        match self {
            Self::Copyright => exif::Tag::Copyright,
            Self::ImageDescription => exif::Tag::ImageDescription,
            Self::Artist => exif::Tag::Artist,
            Self::UserComment => exif::Tag::UserComment,
        }
    }

    /// Keyword of the equivalent PNG `tEXt` entry.
    pub fn png_keyword(&self) -> &'static str {
        match self {
            Self::Copyright => "Copyright",
            Self::ImageDescription => "Description",
            Self::Artist => "Author",
            Self::UserComment => "Comment",
        }
    }

    /// Build the EXIF field carrying `value` for this key.
    pub fn exif_field(&self, value: &str) -> exif::Field {
        let value = match self {
            Self::UserComment => {
                let mut bytes = USER_COMMENT_ASCII_PREFIX.to_vec();
                bytes.extend_from_slice(value.as_bytes());
                exif::Value::Undefined(bytes, 0)
            }
            _ => exif::Value::Ascii(vec![value.as_bytes().to_vec()]),
        };

        exif::Field {
            tag: self.exif_tag(),
            ifd_num: exif::In::PRIMARY,
            value,
        }
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One tag to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataTag {
    pub key: TagKey,
    pub value: String,
}

/// Metadata protection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSpec {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Also restate the restriction in the UserComment tag
    #[serde(default = "default_true")]
    pub include_user_comment: bool,
}

impl Default for MetadataSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            include_user_comment: true,
        }
    }
}

impl MetadataSpec {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Ordered tags to write, empty when disabled.
    pub fn tags(&self) -> Vec<MetadataTag> {
        if !self.enabled {
            return Vec::new();
        }

        let mut keys = vec![TagKey::Copyright, TagKey::ImageDescription, TagKey::Artist];
        if self.include_user_comment {
            keys.push(TagKey::UserComment);
        }

        keys.into_iter()
            .map(|key| MetadataTag {
                key,
                value: key.canonical_value().to_string(),
            })
            .collect()
    }
}
