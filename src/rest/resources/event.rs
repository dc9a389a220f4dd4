//! Event resource.

use crate::rest::{ChangeLoggable, Findable, Modifiable, Searchable};

crm_resource! {
    /// An event contacts can register for.
    Event => Event { id, title }
}

impl Findable for Event {}
impl Modifiable for Event {}
impl ChangeLoggable for Event {}
impl Searchable for Event {}
