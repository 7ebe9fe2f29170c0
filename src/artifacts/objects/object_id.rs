//! Object identifier (SHA-1 hash)
//!
//! Object IDs are 40-character lowercase hexadecimal strings. The id of an
//! object is the SHA-1 of `<type>\0<content>`, which also makes it the key the
//! object is stored under: `<meta>/objects/<oid>`.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_type::ObjectType;
use sha1::{Digest, Sha1};
use std::io;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// Accepts exactly 40 hexadecimal characters; uppercase digits are
    /// normalised to lowercase so the id can be used as a file name.
    pub fn try_parse(id: impl Into<String>) -> anyhow::Result<Self> {
        let id = id.into();
        if !Self::is_valid(&id) {
            anyhow::bail!("invalid object id: {id:?}");
        }

        Ok(Self(id.to_ascii_lowercase()))
    }

    pub fn is_valid(id: &str) -> bool {
        id.len() == OBJECT_ID_LENGTH && id.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Hash `<type>\0<content>` into the id that content is stored under
    pub fn hash(object_type: ObjectType, content: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(object_type.as_bytes());
        hasher.update(b"\0");
        hasher.update(content);

        Self(format!("{:x}", hasher.finalize()))
    }

    /// Write the id in binary form (20 bytes), as used by the index file
    pub fn write_h40_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        let hex40 = self.as_ref();

        for i in (0..OBJECT_ID_LENGTH).step_by(2) {
            let byte = u8::from_str_radix(&hex40[i..i + 2], 16)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "Invalid hex digit"))?;
            writer.write_all(&[byte])?;
        }

        Ok(())
    }

    /// Read an id back from its 20-byte binary form
    pub fn read_h40_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut raw = [0u8; OBJECT_ID_LENGTH / 2];
        reader.read_exact(&mut raw)?;

        let hex40 = raw.iter().map(|byte| format!("{byte:02x}")).collect::<String>();
        Self::try_parse(hex40)
    }

    /// First 7 characters, for human-facing output
    pub fn to_short_oid(&self) -> String {
        self.0[..7].to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
