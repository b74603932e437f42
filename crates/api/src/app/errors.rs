use core::str::FromStr;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use taskhub_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = match &err {
        DomainError::Unauthenticated => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::BadRequest(_) => StatusCode::BAD_REQUEST,
        DomainError::Storage(_) | DomainError::Internal(_) => {
            tracing::error!(error = %err, "request failed");
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.code(),
                "internal server error",
            );
        }
    };
    json_error(status, err.code(), err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path id, answering 400 on malformed input.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(domain_error_to_response)
}

#[cfg(test)]
mod tests {
    use taskhub_core::TaskId;

    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        let cases = [
            (DomainError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (DomainError::forbidden("x"), StatusCode::FORBIDDEN),
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::conflict("x"), StatusCode::CONFLICT),
            (DomainError::bad_request("x"), StatusCode::BAD_REQUEST),
            (DomainError::storage("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(domain_error_to_response(err).status(), status);
        }
    }

    #[test]
    fn malformed_ids_are_bad_requests() {
        let res = parse_id::<TaskId>("not-a-uuid").unwrap_err();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(parse_id::<TaskId>(&TaskId::new().to_string()).is_ok());
    }
}
