//! Event participation resource.

use crate::rest::{ChangeLoggable, Findable, Modifiable, Searchable};

crm_resource! {
    /// The registration of a contact for an [`super::Event`].
    ///
    /// References the event and the contact through `event_id` and
    /// `contact_id`; use [`crate::rest::AttributeProvider::resolve`] to
    /// fetch them.
    EventContact => EventContact { id }
}

impl Findable for EventContact {}
impl Modifiable for EventContact {}
impl ChangeLoggable for EventContact {}
impl Searchable for EventContact {}
