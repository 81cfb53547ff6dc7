use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    message: String,
}

impl ClientError {
    /// Build an [`ClientError::Api`] from a non-2xx response body.
    ///
    /// Bodies that are not the `{"error", "message"}` envelope keep their raw
    /// text as the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => Self::Api {
                status,
                code: parsed.error,
                message: parsed.message,
            },
            Err(_) => Self::Api {
                status,
                code: "unknown".to_string(),
                message: body.to_string(),
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_error_envelope() {
        let err = ClientError::from_response(
            422,
            r#"{"error":"invariant_violation","message":"shelf capacity exceeded"}"#,
        );
        match err {
            ClientError::Api { status, code, message } => {
                assert_eq!(status, 422);
                assert_eq!(code, "invariant_violation");
                assert_eq!(message, "shelf capacity exceeded");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn keeps_raw_body_when_not_json() {
        let err = ClientError::from_response(502, "Bad Gateway");
        assert_eq!(err.status(), Some(502));
        assert!(err.to_string().contains("Bad Gateway"));
    }
}
