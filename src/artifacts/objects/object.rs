use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Result;
use bytes::Bytes;

/// Encodes an object's content (without the type tag)
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Decodes an object's content (the type tag has already been stripped)
pub trait Unpackable {
    fn deserialize(content: Bytes) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn object_id(&self) -> Result<ObjectId> {
        let content = self.serialize()?;
        Ok(ObjectId::hash(self.object_type(), &content))
    }
}
