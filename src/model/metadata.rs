//! Media metadata as read from a file and as required by packaging.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The tags packaging cannot do without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagField {
    Artist,
    Title,
    Album,
    TrackNumber,
}

impl Display for TagField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TagField::Artist => "artist",
            TagField::Title => "title",
            TagField::Album => "album",
            TagField::TrackNumber => "track-number",
        };
        f.write_str(name)
    }
}

/// Tags exactly as a reader found them; any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTags {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub track_number: Option<u32>,
}

/// Fixed tag values that replace whatever the file carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagOverrides {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub track_number: Option<u32>,
}

impl TagOverrides {
    pub fn is_empty(&self) -> bool {
        self.artist.is_none() && self.title.is_none() && self.album.is_none() && self.track_number.is_none()
    }
}

/// Complete metadata: every required tag is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMetadata {
    pub artist: String,
    pub title: String,
    pub album: String,
    pub track_number: u32,
}

impl RawTags {
    pub fn apply_overrides(mut self, overrides: &TagOverrides) -> Self {
        if let Some(artist) = &overrides.artist {
            self.artist = Some(artist.clone());
        }
        if let Some(title) = &overrides.title {
            self.title = Some(title.clone());
        }
        if let Some(album) = &overrides.album {
            self.album = Some(album.clone());
        }
        if let Some(track_number) = overrides.track_number {
            self.track_number = Some(track_number);
        }
        self
    }

    /// Turns the tags into [`MediaMetadata`], or lists the required fields that are missing.
    ///
    /// Blank strings count as missing.
    pub fn complete(self) -> Result<MediaMetadata, Vec<TagField>> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let artist = present(self.artist);
        let title = present(self.title);
        let album = present(self.album);

        match (artist, title, album, self.track_number) {
            (Some(artist), Some(title), Some(album), Some(track_number)) => Ok(MediaMetadata {
                artist,
                title,
                album,
                track_number,
            }),
            (artist, title, album, track_number) => {
                let mut missing = Vec::new();
                if artist.is_none() {
                    missing.push(TagField::Artist);
                }
                if title.is_none() {
                    missing.push(TagField::Title);
                }
                if album.is_none() {
                    missing.push(TagField::Album);
                }
                if track_number.is_none() {
                    missing.push(TagField::TrackNumber);
                }
                Err(missing)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_tags() -> RawTags {
        RawTags {
            artist: Some("Pink Floyd".into()),
            title: Some("Time".into()),
            album: Some("The Dark Side of the Moon".into()),
            track_number: Some(4),
        }
    }

    #[test]
    fn test_complete_tags() {
        let metadata = full_tags().complete().unwrap();
        assert_eq!(metadata.artist, "Pink Floyd");
        assert_eq!(metadata.track_number, 4);
    }

    #[test]
    fn test_missing_and_blank_fields_are_reported() {
        let tags = RawTags {
            artist: Some("   ".into()),
            track_number: None,
            ..full_tags()
        };
        assert_eq!(tags.complete().unwrap_err(), vec![TagField::Artist, TagField::TrackNumber]);
    }

    #[test]
    fn test_overrides_fill_missing_fields() {
        let tags = RawTags {
            album: None,
            ..full_tags()
        };
        let overrides = TagOverrides {
            album: Some("Compilation".into()),
            ..TagOverrides::default()
        };
        let metadata = tags.apply_overrides(&overrides).complete().unwrap();
        assert_eq!(metadata.album, "Compilation");
        assert_eq!(metadata.title, "Time");
    }
}
