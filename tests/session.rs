use std::time::{Duration, Instant};

use aquora_contacts::domain::types::ContactId;
use aquora_contacts::forms::ContactField;
use aquora_contacts::forms::image::{DecodeProbe, ImageFile, ImageLimits};
use aquora_contacts::services::contacts::{ConfirmOutcome, ContactSession, SubmitOutcome};
use aquora_contacts::services::list::{ListController, ListMode, ListSettings};
use aquora_contacts::services::notification::NotificationState;
use aquora_contacts::transport::{ContactReader, ListQuery, TransportError};
use chrono::NaiveDate;

mod common;

use common::{InMemoryTransport, gif_bytes};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
}

fn id(value: i64) -> ContactId {
    ContactId::new(value).expect("valid id")
}

fn indices(session: &ContactSession) -> Vec<(i64, usize)> {
    session
        .view()
        .rows
        .iter()
        .map(|row| (row.contact.id.get(), row.index))
        .collect()
}

#[test]
fn deleting_on_last_page_renumbers_and_steps_back() {
    let transport = InMemoryTransport::seeded(12);
    let mut session = ContactSession::default();
    session.start(&transport);
    session.go_to_page(&transport, 1);
    assert_eq!(indices(&session), vec![(11, 11), (12, 12)]);

    session
        .request_delete_by_id(&transport, id(11))
        .expect("contact is on screen");
    assert_eq!(transport.len(), 12);
    let outcome = session.confirm(&transport).expect("pending delete");

    assert_eq!(outcome, ConfirmOutcome::Deleted(id(11)));
    assert_eq!(indices(&session), vec![(12, 11)]);
    assert_eq!(session.view().total_elements, 11);

    session
        .request_delete_by_id(&transport, id(12))
        .expect("contact is on screen");
    session.confirm(&transport).expect("pending delete");

    let view = session.view();
    assert_eq!(view.pager.current_page, 0);
    assert_eq!(view.rows.len(), 10);
    assert_eq!(view.rows.first().map(|row| row.index), Some(1));
    assert_eq!(view.rows.last().map(|row| row.index), Some(10));
    assert!(view.pager.links.is_empty());
}

#[test]
fn debounced_search_sends_only_the_settled_term() {
    let transport = InMemoryTransport::seeded(12);
    let mut session = ContactSession::default();
    session.start(&transport);
    transport.clear_queries();

    let t0 = Instant::now();
    assert!(!session.search(&transport, "a", t0));
    assert!(!session.search(&transport, "an", t0 + Duration::from_millis(100)));
    assert!(!session.tick(&transport, t0 + Duration::from_millis(400)));
    assert!(session.tick(&transport, t0 + Duration::from_millis(600)));

    assert_eq!(
        transport.queries(),
        vec![ListQuery::new().search("an").paginate(0, 10)]
    );
    let names: Vec<String> = session
        .view()
        .rows
        .into_iter()
        .map(|row| row.contact.name)
        .collect();
    assert_eq!(names, vec!["Ana Silva4", "Ana Silva8", "Ana Silva12"]);
}

#[test]
fn page_change_supersedes_pending_search() {
    let transport = InMemoryTransport::seeded(25);
    let mut session = ContactSession::default();
    session.start(&transport);
    transport.clear_queries();

    let t0 = Instant::now();
    session.search(&transport, "silva", t0);
    session.go_to_page(&transport, 2);
    session.tick(&transport, t0 + Duration::from_secs(1));

    assert_eq!(
        transport.queries(),
        vec![ListQuery::new().search("silva").paginate(2, 10)]
    );
    assert_eq!(session.view().rows.first().map(|row| row.index), Some(21));
}

#[test]
fn response_for_superseded_term_is_ignored() {
    let transport = InMemoryTransport::seeded(12);
    let mut list = ListController::default();

    let first = list.start();
    let first_outcome = transport.list_contacts(&first.query);

    let t0 = Instant::now();
    list.search_changed("ana", t0);
    let second = list.poll(t0 + list.settings().debounce).expect("debounce elapsed");
    let second_outcome = transport.list_contacts(&second.query);

    assert!(list.complete(second.generation, second_outcome));
    assert!(!list.complete(first.generation, first_outcome));

    assert_eq!(list.result().total_elements, 3);
    assert!(list.visible().iter().all(|c| c.name.starts_with("Ana")));
}

#[test]
fn create_then_confirmed_update_keeps_picture() {
    let transport = InMemoryTransport::seeded(3);
    let mut session = ContactSession::default();
    session.start(&transport);

    session.open_create();
    for (field, value) in [
        (ContactField::Name, "Helena de Souza"),
        (ContactField::Email, "helena@example.com"),
        (ContactField::Phone, "11912345678"),
        (ContactField::DateOfBirth, "1985-03-20"),
    ] {
        session.set_field(field, value).expect("editor open");
    }
    session
        .attach_image(
            ImageFile::new("foto.gif", "image/gif", gif_bytes(2, 2)),
            &DecodeProbe,
        )
        .expect("valid image");

    let outcome = session.submit(&transport, today()).expect("valid form");

    assert_eq!(outcome, SubmitOutcome::Created(id(4)));
    assert_eq!(
        session.notification().title(),
        Some("Contato adicionado")
    );
    assert_eq!(session.list().index_of(id(4)), Some(4));
    assert_eq!(
        transport.stored(4).and_then(|c| c.profile_picture),
        Some("/uploads/foto.gif".to_string())
    );

    session.close_notification();
    session
        .open_edit_by_id(&transport, id(4))
        .expect("contact is on screen");
    session
        .set_field(ContactField::Phone, "(11) 3333-4444")
        .expect("editor open");

    let outcome = session.submit(&transport, today()).expect("valid form");
    assert_eq!(outcome, SubmitOutcome::AwaitingConfirmation);
    let NotificationState::ConfirmUpdate(pending) = session.notification() else {
        panic!("expected update confirmation");
    };
    assert_eq!(
        pending.summary.render(),
        vec!["Telefone: (11) 9 1234-5678 → (11) 3333-4444".to_string()]
    );
    assert_eq!(transport.stored(4).map(|c| c.phone.to_string()), Some("11912345678".to_string()));

    let outcome = session.confirm(&transport).expect("pending update");

    assert_eq!(outcome, ConfirmOutcome::Updated(id(4)));
    let stored = transport.stored(4).expect("still stored");
    assert_eq!(stored.phone.as_str(), "1133334444");
    assert_eq!(stored.profile_picture.as_deref(), Some("/uploads/foto.gif"));
    assert_eq!(
        session.list().find(id(4)).map(|c| c.phone.as_str().to_string()),
        Some("1133334444".to_string())
    );
    assert!(session.editor().is_none());
}

#[test]
fn update_of_vanished_record_reports_not_found() {
    let transport = InMemoryTransport::seeded(2);
    let mut session = ContactSession::default();
    session.start(&transport);
    session
        .open_edit_by_id(&transport, id(2))
        .expect("contact is on screen");
    session
        .set_field(ContactField::Name, "Carla Souza")
        .expect("editor open");
    session.submit(&transport, today()).expect("valid form");

    transport.fail_next(TransportError::NotFound("Contato não encontrado".into()));
    let outcome = session.confirm(&transport).expect("pending update");

    assert!(matches!(
        outcome,
        ConfirmOutcome::Failed(TransportError::NotFound(_))
    ));
    assert_eq!(session.notification().title(), Some("Erro ao atualizar"));
    assert!(session.editor().is_some());
}

#[test]
fn failed_load_keeps_rows_until_retry() {
    let transport = InMemoryTransport::seeded(3);
    let mut session = ContactSession::default();
    session.start(&transport);

    transport.fail_next(TransportError::Network("sem conexão".into()));
    session.go_to_page(&transport, 0);

    let view = session.view();
    assert_eq!(
        view.error.as_deref(),
        Some("Falha ao carregar contatos: sem conexão")
    );
    assert_eq!(view.rows.len(), 3);

    assert!(session.retry(&transport));
    assert_eq!(session.view().error, None);
}

#[test]
fn client_filtered_session_never_refetches() {
    let transport = InMemoryTransport::seeded(5);
    let mut session = ContactSession::new(
        ListSettings {
            mode: ListMode::ClientFiltered,
            ..ListSettings::default()
        },
        ImageLimits::default(),
    );
    session.start(&transport);
    assert_eq!(transport.queries(), vec![ListQuery::new()]);

    session.search(&transport, "silva3", Instant::now());
    assert_eq!(indices(&session), vec![(3, 3)]);

    session.search(&transport, "", Instant::now());
    session
        .request_delete_by_id(&transport, id(1))
        .expect("contact is on screen");
    session.confirm(&transport).expect("pending delete");

    assert_eq!(
        indices(&session),
        vec![(2, 1), (3, 2), (4, 3), (5, 4)]
    );
    assert_eq!(transport.queries().len(), 1);
}

#[test]
fn failed_page_load_keeps_pager_on_rows_shown() {
    let transport = InMemoryTransport::seeded(25);
    let mut session = ContactSession::default();
    session.start(&transport);

    transport.fail_next(TransportError::Network("offline".into()));
    session.go_to_page(&transport, 1);

    let view = session.view();
    assert!(view.error.is_some());
    assert_eq!(view.pager.current_page, 0);
    assert_eq!(view.rows.first().map(|row| row.index), Some(1));

    session.go_to_page(&transport, view.pager.current_page + 1);
    assert_eq!(session.view().pager.current_page, 1);
    assert_eq!(session.view().rows.first().map(|row| row.index), Some(11));
}

#[test]
fn confirming_update_keeps_unrelated_create_form() {
    let transport = InMemoryTransport::seeded(3);
    let mut session = ContactSession::default();
    session.start(&transport);

    session
        .open_edit_by_id(&transport, id(2))
        .expect("contact is on screen");
    session
        .set_field(ContactField::Name, "Carla Souza")
        .expect("editor open");
    let outcome = session.submit(&transport, today()).expect("valid form");
    assert_eq!(outcome, SubmitOutcome::AwaitingConfirmation);

    session.open_create();
    session
        .set_field(ContactField::Name, "Novo Nome")
        .expect("editor open");

    let outcome = session.confirm(&transport).expect("pending update");

    assert_eq!(outcome, ConfirmOutcome::Updated(id(2)));
    let editor = session.editor().expect("create form still open");
    assert!(editor.original.is_none());
    assert_eq!(editor.form.name, "Novo Nome");
}
