use crate::areas::refs::RefValue;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;

impl Repository {
    /// Name the commit `start` resolves to as `refs/tags/<name>`
    pub fn tag(&self, name: &str, start: &str) -> anyhow::Result<()> {
        let oid = self.resolve_name(start)?;
        self.create_tag(name, &oid)
    }

    pub fn create_tag(&self, name: &str, oid: &ObjectId) -> anyhow::Result<()> {
        let tag = BranchName::try_parse(name)?;

        self.refs()
            .update_ref(&tag.to_tag_ref(), &RefValue::direct(oid), false)
    }
}
