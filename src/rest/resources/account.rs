//! Account resource.

use crate::rest::{ChangeLoggable, Findable, MergeAndDeletable, Modifiable, Searchable};

crm_resource! {
    /// An organisation contacts can belong to.
    Account => Account { id, name }
}

impl Findable for Account {}
impl Modifiable for Account {}
impl ChangeLoggable for Account {}
impl MergeAndDeletable for Account {}
impl Searchable for Account {}
