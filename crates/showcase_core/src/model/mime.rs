//! Media types stored alongside work images.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Media types accepted for stored work assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MimeType {
    #[serde(rename = "image/jpeg")]
    ImageJpeg,
    #[serde(rename = "image/png")]
    ImagePng,
    #[serde(rename = "image/tiff")]
    ImageTiff,
    #[serde(rename = "audio/mpeg")]
    AudioMpeg,
}

/// Extension used when a file name is derived without a known media type.
pub const DEFAULT_EXTENSION: &str = "jpg";

impl MimeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ImageJpeg => "image/jpeg",
            Self::ImagePng => "image/png",
            Self::ImageTiff => "image/tiff",
            Self::AudioMpeg => "audio/mpeg",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "image/jpeg" => Some(Self::ImageJpeg),
            "image/png" => Some(Self::ImagePng),
            "image/tiff" => Some(Self::ImageTiff),
            "audio/mpeg" => Some(Self::AudioMpeg),
            _ => None,
        }
    }

    /// Canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::ImageJpeg => "jpg",
            Self::ImagePng => "png",
            Self::ImageTiff => "tif",
            Self::AudioMpeg => "mp3",
        }
    }

    /// Resolves a file extension, accepting the `jpeg` alias.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::ImageJpeg),
            "png" => Some(Self::ImagePng),
            "tif" => Some(Self::ImageTiff),
            "mp3" => Some(Self::AudioMpeg),
            _ => None,
        }
    }

    pub fn is_image(self) -> bool {
        !matches!(self, Self::AudioMpeg)
    }
}

impl Display for MimeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromSql for MimeType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Self::parse(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown mime type `{text}`").into()))
    }
}

impl ToSql for MimeType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}
