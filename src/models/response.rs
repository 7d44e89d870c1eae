use rocket::{
    http::{ContentType, Status},
    response::{self, Responder},
    Request, Response,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Cursor;

/// JSON envelope returned by every endpoint.
///
/// Successful responses look like `{"ok": true, "data": ...}`, failures like
/// `{"ok": false, "error": {"code": 404, "message": "..."}}`.
#[derive(Debug)]
pub enum APIResponse {
    Data(Status, Value),
    Error(Status, String),
    NoContent,
}

impl APIResponse {
    /// Creates `200 OK` response with serialized data
    pub fn new<T: Serialize>(data: T) -> Self {
        Self::with_status(Status::Ok, data)
    }

    pub fn with_status<T: Serialize>(status: Status, data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self::Data(status, value),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response");
                Self::error(500, "Internal server error")
            }
        }
    }

    pub fn error(code: u16, message: impl Into<String>) -> Self {
        let status = Status::from_code(code).unwrap_or(Status::InternalServerError);

        Self::Error(status, message.into())
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Data(status, _) | Self::Error(status, _) => *status,
            Self::NoContent => Status::NoContent,
        }
    }

    /// Renders successful envelope around `data`, for responses that are stored
    /// before being sent
    pub fn render_data<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
        let data = serde_json::to_value(data)?;

        Ok(json!({ "ok": true, "data": data }).to_string())
    }

    /// Renders response body. `NoContent` has an empty body.
    pub fn render(&self) -> String {
        let body = match self {
            Self::Data(_, data) => json!({ "ok": true, "data": data }),
            Self::Error(status, message) => json!({
                "ok": false,
                "error": { "code": status.code, "message": message },
            }),
            Self::NoContent => return String::new(),
        };

        body.to_string()
    }
}

impl<'r> Responder<'r, 'static> for APIResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        if let Self::NoContent = self {
            return Response::build().status(Status::NoContent).ok();
        }

        let body = self.render();

        Response::build()
            .status(self.status())
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}
