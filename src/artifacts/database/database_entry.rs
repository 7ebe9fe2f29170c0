use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use derive_new::new;

/// One named slot of a stored tree: the child's id and whether it is a blob
/// or a nested tree
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct DatabaseEntry {
    pub oid: ObjectId,
    pub object_type: ObjectType,
}

impl DatabaseEntry {
    pub fn is_tree(&self) -> bool {
        self.object_type == ObjectType::Tree
    }
}
