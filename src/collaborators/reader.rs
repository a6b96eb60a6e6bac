//! Metadata reading.

use crate::collaborators::CollaboratorError;
use crate::model::RawTags;
use async_trait::async_trait;
use std::io::SeekFrom;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Reads the tags of an audio file.
#[async_trait]
pub trait MetadataReader: Send + Sync {
    async fn read(&self, path: &Path) -> Result<RawTags, CollaboratorError>;
}

const ID3V1_SIZE: u64 = 128;

/// Reads the fixed-size ID3v1 block at the end of a file.
#[derive(Debug, Clone, Default)]
pub struct Id3v1Reader;

#[async_trait]
impl MetadataReader for Id3v1Reader {
    async fn read(&self, path: &Path) -> Result<RawTags, CollaboratorError> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| CollaboratorError::io(path, e))?;
        let length = file
            .metadata()
            .await
            .map_err(|e| CollaboratorError::io(path, e))?
            .len();
        if length < ID3V1_SIZE {
            return Err(CollaboratorError::Unreadable {
                path: path.to_path_buf(),
                reason: "file too short for an ID3v1 tag".to_string(),
            });
        }

        let mut block = [0u8; ID3V1_SIZE as usize];
        file.seek(SeekFrom::End(-(ID3V1_SIZE as i64)))
            .await
            .map_err(|e| CollaboratorError::io(path, e))?;
        file.read_exact(&mut block)
            .await
            .map_err(|e| CollaboratorError::io(path, e))?;

        parse_id3v1(&block).ok_or_else(|| CollaboratorError::Unreadable {
            path: path.to_path_buf(),
            reason: "no ID3v1 tag".to_string(),
        })
    }
}

/// Layout: "TAG", title[30], artist[30], album[30], year[4], comment[28], 0, track, genre.
fn parse_id3v1(block: &[u8; ID3V1_SIZE as usize]) -> Option<RawTags> {
    if &block[0..3] != b"TAG" {
        return None;
    }
    let text = |range: std::ops::Range<usize>| {
        let raw = &block[range];
        let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
        let value: String = raw[..end].iter().map(|b| *b as char).collect();
        let value = value.trim().to_string();
        (!value.is_empty()).then_some(value)
    };
    // ID3v1.1: a zero byte before the last comment byte marks a track number.
    let track_number = (block[125] == 0 && block[126] != 0).then_some(u32::from(block[126]));

    Some(RawTags {
        title: text(3..33),
        artist: text(33..63),
        album: text(63..93),
        track_number,
    })
}

#[cfg(test)]
pub(crate) fn id3v1_block(title: &str, artist: &str, album: &str, track: u8) -> Vec<u8> {
    let mut block = vec![0u8; ID3V1_SIZE as usize];
    block[0..3].copy_from_slice(b"TAG");
    let mut put = |offset: usize, value: &str| {
        let bytes = value.as_bytes();
        block[offset..offset + bytes.len().min(30)].copy_from_slice(&bytes[..bytes.len().min(30)]);
    };
    put(3, title);
    put(33, artist);
    put(63, album);
    block[126] = track;
    block
}
