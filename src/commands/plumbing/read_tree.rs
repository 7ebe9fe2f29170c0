use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;

impl Repository {
    /// Replace the index with the content of a stored tree
    ///
    /// With `checkout` the working directory is rewritten to match.
    pub fn read_tree(&self, tree_oid: &ObjectId, checkout: bool) -> anyhow::Result<()> {
        let entries = self.database().flatten_tree(Some(tree_oid))?;

        self.with_index(|index| {
            index.replace(entries);
            if checkout {
                self.checkout_index(index)?;
            }

            Ok(())
        })?;
        tracing::debug!(tree = %tree_oid, checkout, "read tree into index");

        Ok(())
    }
}
