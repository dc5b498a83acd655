//! Tests for domain error construction and serialisation.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(DomainError::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(DomainError::unauthorized("who"), ErrorCode::Unauthorized)]
#[case(DomainError::forbidden("nope"), ErrorCode::Forbidden)]
#[case(DomainError::not_found("gone"), ErrorCode::NotFound)]
#[case(DomainError::invalid_operation("same sex"), ErrorCode::InvalidOperation)]
#[case(DomainError::persistence("db down"), ErrorCode::PersistenceError)]
fn constructors_set_code(#[case] error: DomainError, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = DomainError::try_new(ErrorCode::InvalidRequest, "   ");
    assert_eq!(result, Err(DomainErrorValidationError::EmptyMessage));
}

#[rstest]
fn new_substitutes_blank_messages() {
    let error = DomainError::new(ErrorCode::NotFound, "");
    assert_eq!(error.message(), "unspecified error");
}

#[rstest]
fn serialises_with_snake_case_code() {
    let error = DomainError::invalid_operation("cats have the same sex");
    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(
        value,
        json!({"code": "invalid_operation", "message": "cats have the same sex"})
    );
}

#[rstest]
fn deserialisation_rejects_blank_message() {
    let payload = json!({"code": "not_found", "message": " "});
    let result = serde_json::from_value::<DomainError>(payload);
    assert!(result.is_err());
}

#[rstest]
fn display_uses_message() {
    let error = DomainError::forbidden("not the cat's owner");
    assert_eq!(error.to_string(), "not the cat's owner");
}
