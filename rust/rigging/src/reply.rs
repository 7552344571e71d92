//! Wire payloads: JSON bodies and the reply of one exchange.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Context, Failure, Status, Transport};

/// Body of every non-success reply.
#[derive(Debug, Serialize, Deserialize)]
struct FailureBody {
    message: String,
}

/// One finished exchange: a status and a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: Status,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn new(status: Status, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// A `200` carrying `value` as JSON. Falls back to a `500` if it cannot be encoded.
    pub fn encode<T: Serialize>(value: &T) -> Self {
        match encode(value) {
            Ok(body) => Self::new(Status::OK, body),
            Err(failure) => Self::failure(Status::INTERNAL_SERVER_ERROR, &failure),
        }
    }

    /// A reply with a `{"message": ...}` body.
    pub fn failure(status: Status, message: impl fmt::Display) -> Self {
        let body = FailureBody {
            message: message.to_string(),
        };
        // A struct with one string field always serializes.
        let body = serde_json::to_vec(&body).unwrap_or_default();
        Self::new(status, body)
    }

    pub fn not_found(path: &str) -> Self {
        Self::failure(Status::NOT_FOUND, format_args!("no handler for {path}"))
    }

    /// The message of a failure body, or the raw body text if it is not one.
    pub fn message(&self) -> String {
        match serde_json::from_slice::<FailureBody>(&self.body) {
            Ok(body) => body.message,
            Err(_) => String::from_utf8_lossy(&self.body).into_owned(),
        }
    }

    /// The body of a success reply; any other status becomes [`Failure::Remote`].
    pub fn into_result(self) -> Result<Vec<u8>, Failure> {
        if self.status.is_success() {
            Ok(self.body)
        } else {
            Err(Failure::Remote {
                status: self.status,
                message: self.message(),
            })
        }
    }
}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, Failure> {
    serde_json::to_vec(value).map_err(|e| Failure::Encode(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, Failure> {
    serde_json::from_slice(body).map_err(|e| Failure::Decode(e.to_string()))
}

/// Perform one exchange: encode `request`, post it to `path`, decode the response.
pub fn call<Req, Resp, T>(
    transport: &T,
    ctx: &Context,
    path: &str,
    request: &Req,
) -> Result<Resp, Failure>
where
    Req: Serialize,
    Resp: DeserializeOwned,
    T: Transport + ?Sized,
{
    ctx.check()?;
    let body = encode(request)?;
    tracing::trace!(path, bytes = body.len(), "sending request");
    let reply = transport.round_trip(ctx, path, body)?;
    let body = reply.into_result()?;
    decode(&body)
}
