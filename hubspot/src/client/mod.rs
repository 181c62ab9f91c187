//! Cliente HTTP para a API CRM v3 da HubSpot

pub mod contacts;

pub use contacts::{ContactsClient, PaginationFailurePolicy, CONTACT_PROPERTIES, PAGE_LIMIT};
