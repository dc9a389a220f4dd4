//! Typed WebCRM resources.
//!
//! Every resource wraps a [`Resource`](crate::rest::Resource) and opts into
//! the capabilities the server supports for it:
//!
//! | Type | Find | Modify | Changes | Merge | Search |
//! |------|------|--------|---------|-------|--------|
//! | [`Account`] | yes | yes | yes | yes | yes |
//! | [`Activity`] | yes | yes | yes | | yes |
//! | [`Collection`] | yes | yes | yes | | yes |
//! | [`Contact`] | yes | yes | yes | yes | yes |
//! | [`Event`] | yes | yes | yes | | yes |
//! | [`EventContact`] | yes | yes | yes | | yes |
//! | [`Mailing`] | yes | yes | yes | | yes |
//! | [`MailingRecipient`] | by email | update only | | | |
//! | [`TemplateSet`] | singleton | update only | yes | | |
//! | [`Type`] | yes | yes | yes | | |
//!
//! # Example
//!
//! ```rust,ignore
//! use webcrm::rest::resources::{Account, Contact};
//! use webcrm::{Findable, Modifiable, Searchable};
//! use serde_json::json;
//!
//! let account = Account::create(&client, &json!({"name": "Acme"})).await?;
//! let mut contact = Contact::find(&client, "e70a7123f499c5e0e9972ab4dbfb8fe3").await?;
//! contact.update(&client, &json!({"account_id": account.id()})).await?;
//! println!("{contact:?}");
//! ```

use crate::rest::AttributeValue;

/// Declares a typed resource wrapping [`crate::rest::Resource`].
///
/// Generates the newtype, its [`crate::rest::CrmResource`] impl and a
/// `Debug` impl printing the listed attributes.
macro_rules! crm_resource {
    (
        $(#[$meta:meta])*
        $name:ident => $base_type:ident { $($field:ident),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub struct $name(crate::rest::Resource);

        impl crate::rest::CrmResource for $name {
            const BASE_TYPE: crate::rest::BaseType = crate::rest::BaseType::$base_type;

            fn from_resource(resource: crate::rest::Resource) -> Self {
                Self(resource)
            }

            fn as_resource(&self) -> &crate::rest::Resource {
                &self.0
            }

            fn as_resource_mut(&mut self) -> &mut crate::rest::Resource {
                &mut self.0
            }

            fn into_resource(self) -> crate::rest::Resource {
                self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut out = f.debug_struct(stringify!($name));
                $(
                    out.field(
                        stringify!($field),
                        &format_args!(
                            "{}",
                            crate::rest::resources::inspect(
                                crate::rest::AttributeProvider::attribute(&self.0, stringify!($field))
                            )
                        ),
                    );
                )*
                out.finish()
            }
        }
    };
}

mod account;
mod activity;
mod collection;
mod contact;
mod event;
mod event_contact;
mod item_type;
mod mailing;
mod mailing_recipient;
mod template_set;

pub use account::Account;
pub use activity::{Activity, Comment, CommentAttachment};
pub use collection::Collection;
pub use contact::Contact;
pub use event::Event;
pub use event_contact::EventContact;
pub use item_type::Type;
pub use mailing::Mailing;
pub use mailing_recipient::MailingRecipient;
pub use template_set::TemplateSet;

/// Renders an attribute for `Debug` output; unknown attributes print `null`.
pub(crate) fn inspect(value: Option<&AttributeValue>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_json().to_string())
}
