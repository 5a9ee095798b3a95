use std::cell::RefCell;

use api_types::{
    ai::{ParseAndSave, ParseAndSaveResponse},
    transaction::{ApiTransaction, ManualTransactionNew},
};
use engine::{
    IngestDefaults, RemoteError, Transaction, TransactionList,
    form::{
        FormMessage, FormStatus, Identity, ManualForm, SUCCESS_MESSAGE, SubmitError,
        create_empty_state, required_message,
    },
    remote::Backend,
};

struct FakeBackend {
    created: RefCell<Vec<ManualTransactionNew>>,
    parsed: RefCell<Vec<ParseAndSave>>,
    reject_with: Option<RemoteError>,
}

impl FakeBackend {
    fn accepting() -> Self {
        Self {
            created: RefCell::default(),
            parsed: RefCell::default(),
            reject_with: None,
        }
    }

    fn rejecting(err: RemoteError) -> Self {
        Self {
            reject_with: Some(err),
            ..Self::accepting()
        }
    }

    fn calls(&self) -> usize {
        self.created.borrow().len() + self.parsed.borrow().len()
    }
}

fn server_transaction(id: i64) -> ApiTransaction {
    ApiTransaction {
        id,
        date_time: Some("2025-01-01T12:30:00".to_string()),
        operation_type: Some("payment".to_string()),
        amount: Some(125.5),
        currency: Some("UZS".to_string()),
        description: Some("Оплата услуги".to_string()),
        raw_text: Some("Manual entry".to_string()),
        ..ApiTransaction::default()
    }
}

impl Backend for FakeBackend {
    async fn create_transaction(
        &self,
        payload: &ManualTransactionNew,
    ) -> Result<ApiTransaction, RemoteError> {
        self.created.borrow_mut().push(payload.clone());
        match &self.reject_with {
            Some(err) => Err(err.clone()),
            None => Ok(server_transaction(902)),
        }
    }

    async fn parse_and_save(
        &self,
        request: &ParseAndSave,
    ) -> Result<ParseAndSaveResponse, RemoteError> {
        self.parsed.borrow_mut().push(request.clone());
        match &self.reject_with {
            Some(err) => Err(err.clone()),
            None => Ok(ParseAndSaveResponse {
                transaction: server_transaction(903),
                parsed_data: Some(serde_json::json!({"amount": 125.5, "currency": "UZS"})),
            }),
        }
    }
}

fn identity() -> Identity {
    Identity {
        telegram_id: 777001,
        username: Some("tester".to_string()),
    }
}

#[tokio::test]
async fn empty_form_is_not_sent() {
    let backend = FakeBackend::accepting();
    let mut form = ManualForm::new(Some(identity()));

    let err = form.submit(&backend).await.unwrap_err();

    assert_eq!(backend.calls(), 0);
    let SubmitError::Validation(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };
    assert_eq!(errors.len(), 3);
    assert_eq!(errors["date_time"], required_message("Дата и время операции"));
    assert_eq!(errors["amount"], required_message("Сумма операции"));
    assert_eq!(errors["description"], required_message("Описание операции"));
    assert_eq!(form.status(), FormStatus::Idle);
}

#[tokio::test]
async fn valid_form_is_sent_and_reset() {
    let backend = FakeBackend::accepting();
    let mut form = ManualForm::new(Some(identity()));
    let mut list = TransactionList::default();

    form.set_field("date_time", "2025-01-01T12:30");
    form.set_field("amount", "125.50");
    form.set_field("description", "Оплата услуги");

    let created = form.submit(&backend).await.unwrap();
    list.prepend(Transaction::from_api(created, &IngestDefaults::default()));

    let sent = backend.created.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        serde_json::to_value(&sent[0]).unwrap(),
        serde_json::json!({
            "telegram_id": 777001,
            "date_time": "2025-01-01T12:30",
            "operation_type": "payment",
            "amount": 125.5,
            "currency": "UZS",
            "description": "Оплата услуги",
            "raw_text": null,
        })
    );

    assert_eq!(list.all()[0].id, 902);
    assert_eq!(form.state(), &create_empty_state());
    assert!(form.errors().is_empty());
    assert_eq!(
        form.message(),
        Some(&FormMessage::Success(SUCCESS_MESSAGE.to_string()))
    );
}

#[tokio::test]
async fn backend_rejection_is_shown_and_input_kept() {
    let backend = FakeBackend::rejecting(RemoteError::rejected(
        400,
        Some("Неверный формат даты".to_string()),
    ));
    let mut form = ManualForm::new(Some(identity()));
    form.set_field("date_time", "2025-01-01T12:30");
    form.set_field("amount", "10");
    form.set_field("description", "Тестовая запись");

    let err = form.submit(&backend).await.unwrap_err();

    assert_eq!(err.to_string(), "Неверный формат даты");
    assert_eq!(form.value("amount"), "10");
    assert_eq!(
        form.message(),
        Some(&FormMessage::Error("Неверный формат даты".to_string()))
    );

    // The user may retry once the form is idle again.
    assert_eq!(form.status(), FormStatus::Idle);
    assert!(form.submit(&backend).await.is_err());
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn transport_failure_becomes_a_message() {
    let backend = FakeBackend::rejecting(RemoteError::Transport("connection refused".to_string()));
    let mut form = ManualForm::new(Some(identity()));
    form.set_field("date_time", "2025-01-01T12:30");
    form.set_field("amount", "10");
    form.set_field("description", "Тестовая запись");

    let err = form.submit(&backend).await.unwrap_err();
    assert!(matches!(err, SubmitError::Remote(RemoteError::Transport(_))));
    assert!(matches!(form.message(), Some(FormMessage::Error(_))));
}

#[tokio::test]
async fn free_text_goes_to_the_parser() {
    let backend = FakeBackend::accepting();
    let mut form = ManualForm::new(Some(identity()));

    assert_eq!(
        form.parse_and_submit(&backend, "   ").await,
        Err(SubmitError::EmptyText)
    );
    assert_eq!(backend.calls(), 0);

    let outcome = form
        .parse_and_submit(&backend, "  HUMOCARD *6714: oplata 125.50 UZS  ")
        .await
        .unwrap();
    assert_eq!(outcome.transaction.id, 903);
    assert_eq!(
        outcome.preview,
        vec![
            ("amount".to_string(), "125.5".to_string()),
            ("currency".to_string(), "UZS".to_string()),
        ]
    );

    let sent = backend.parsed.borrow();
    assert_eq!(sent[0].text, "HUMOCARD *6714: oplata 125.50 UZS");
    assert_eq!(sent[0].telegram_id, 777001);
    assert_eq!(sent[0].username.as_deref(), Some("tester"));
}

#[tokio::test]
async fn missing_identity_never_reaches_the_backend() {
    let backend = FakeBackend::accepting();
    let mut form = ManualForm::new(None);
    form.set_field("date_time", "2025-01-01T12:30");
    form.set_field("amount", "10");
    form.set_field("description", "Тестовая запись");

    assert_eq!(form.submit(&backend).await, Err(SubmitError::NotConfigured));
    assert_eq!(backend.calls(), 0);
}
