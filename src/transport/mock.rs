//! Mock transport implementations for isolating services in tests.

use mockall::mock;

use crate::domain::contact::{Contact, PagedResult};
use crate::domain::types::ContactId;
use crate::forms::contact::ContactPayload;
use crate::transport::errors::TransportResult;
use crate::transport::{ContactReader, ContactWriter, ListQuery};

mock! {
    pub Transport {}

    impl ContactReader for Transport {
        fn list_contacts(&self, query: &ListQuery) -> TransportResult<PagedResult<Contact>>;
        fn get_contact(&self, id: ContactId) -> TransportResult<Contact>;
    }

    impl ContactWriter for Transport {
        fn create_contact(&self, payload: &ContactPayload) -> TransportResult<Contact>;
        fn update_contact(
            &self,
            id: ContactId,
            payload: &ContactPayload,
        ) -> TransportResult<Contact>;
        fn delete_contact(&self, id: ContactId) -> TransportResult<()>;
    }
}
