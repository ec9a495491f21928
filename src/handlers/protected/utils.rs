use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::Value;

use crate::error::ApiError;

/// Path ids are unsigned decimal integers; signs, spaces and anything else
/// cannot name a row
pub fn parse_id(raw: &str, entity: &str) -> Result<i64, ApiError> {
    let not_found = || ApiError::not_found(format!("{} {} not found", entity, raw));
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_found());
    }
    raw.parse::<i64>().map_err(|_| not_found())
}

/// Unwrap a JSON body. A missing `application/json` content type is 415,
/// every other extractor rejection is 400 INVALID_JSON.
pub fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection @ JsonRejection::MissingJsonContentType(_)) => {
            Err(ApiError::unsupported_media_type(rejection.body_text()))
        }
        Err(rejection) => Err(ApiError::invalid_json(rejection.body_text())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_ids() {
        assert_eq!(parse_id("42", "Client").unwrap(), 42);
    }

    #[test]
    fn signed_and_oversized_ids_are_not_found() {
        for raw in ["+5", "-5", " 5", "99999999999999999999"] {
            assert!(matches!(parse_id(raw, "Client"), Err(ApiError::NotFound(_))), "{}", raw);
        }
    }

    #[test]
    fn non_numeric_ids_are_not_found() {
        let err = parse_id("abc", "Client").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.message(), "Client abc not found");
    }
}
