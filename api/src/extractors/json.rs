// JSON extractor with a body-limit and a JSON error body instead of
// actix's default plain-text 400.
use actix_web::dev::JsonBody;
use actix_web::error::{Error, InternalError, JsonPayloadError};
use actix_web::{dev::Payload, FromRequest, HttpRequest, HttpResponse};
use futures::future::TryFutureExt;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;

const LIMIT_DEFAULT: usize = 262_144; // 256Kb

pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> FromRequest for Json<T>
where
    T: DeserializeOwned + 'static,
{
    type Config = ();
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Error>>>>;

    #[inline]
    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let json_body = JsonBody::new(req, payload, None).limit(LIMIT_DEFAULT);
        Box::pin(json_body.map_err(json_error).map_ok(Json))
    }
}

fn json_error(err: JsonPayloadError) -> Error {
    let response = match err {
        JsonPayloadError::Deserialize(ref json_error) => {
            HttpResponse::BadRequest().json(json!({ "error": json_error.to_string() }))
        }
        _ => HttpResponse::BadRequest().json(json!({ "error": "Invalid request body" })),
    };
    InternalError::from_response(err, response).into()
}
