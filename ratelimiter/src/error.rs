use actix_web::{
    error,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use derive_more::Display;
use serde_json::json;

#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "Too Many Requests")]
    TooManyRequests,

    #[display(fmt = "unable to identify client")]
    UnidentifiedClient,

    #[display(fmt = "internal error")]
    InternalError(anyhow::Error),
}

impl error::ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({
                "error": self.to_string()
            }))
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::UnidentifiedClient => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{body::MessageBody, http::StatusCode, ResponseError};
    use rstest::rstest;

    use super::ApiError;

    #[rstest]
    #[case(ApiError::TooManyRequests, StatusCode::TOO_MANY_REQUESTS, "Too Many Requests")]
    #[case(
        ApiError::UnidentifiedClient,
        StatusCode::BAD_REQUEST,
        "unable to identify client"
    )]
    #[case(
        ApiError::InternalError(anyhow::anyhow!("boom")),
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal error"
    )]
    fn test_error_response_carries_status_and_json_body(
        #[case] err: ApiError,
        #[case] status: StatusCode,
        #[case] message: &str,
    ) {
        let response = err.error_response();
        assert_eq!(response.status(), status);

        let body = response.into_body().try_into_bytes().unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, serde_json::json!({ "error": message }));
    }
}
