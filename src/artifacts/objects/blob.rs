//! Blob object
//!
//! Blobs hold raw file content and nothing else; names live in trees.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;

/// How far into a blob to look for a NUL byte when sniffing for binary data
const BINARY_SNIFF_LENGTH: usize = 8000;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Blob {
    content: Bytes,
}

impl Blob {
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn into_content(self) -> Bytes {
        self.content
    }

    /// The content as text, or `None` when it looks binary
    pub fn as_text(&self) -> Option<&str> {
        let sniffed = &self.content[..self.content.len().min(BINARY_SNIFF_LENGTH)];
        if sniffed.contains(&0) {
            return None;
        }

        std::str::from_utf8(&self.content).ok()
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(self.content.clone())
    }
}

impl Unpackable for Blob {
    fn deserialize(content: Bytes) -> anyhow::Result<Self> {
        Ok(Self::new(content))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }
}
