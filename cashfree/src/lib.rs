extern crate base64;
extern crate chrono;
extern crate log;
#[macro_use]
extern crate logging;
extern crate reqwest;
extern crate ring;
extern crate serde;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;

use chrono::prelude::*;
use log::Level::Debug;
use reqwest::header::HeaderName;
use reqwest::StatusCode;
use ring::hmac;
use std::error::Error as StdError;
use std::fmt;

const API_VERSION: &'static str = "2022-09-01";

/// Client for the Cashfree payment gateway REST API.
///
/// Orders are created server side; the returned `payment_session_id` is
/// handed to the hosted checkout widget on the front end. Payment outcomes
/// come back through the return URL and through signed webhooks.
pub struct CashfreeClient {
    app_id: String,
    secret_key: String,
    base_url: String,
}

impl CashfreeClient {
    /// Creates a new Cashfree client.
    /// base_url: Live: https://api.cashfree.com/pg/, sandbox: https://sandbox.cashfree.com/pg/
    pub fn new(app_id: String, secret_key: String, base_url: String) -> CashfreeClient {
        CashfreeClient {
            app_id,
            secret_key,
            base_url: if base_url.ends_with("/") {
                base_url
            } else {
                format!("{}/", base_url)
            },
        }
    }

    pub fn create_order(&self, request: CreateOrderRequest) -> Result<OrderResponse, CashfreeError> {
        jlog!(Debug, "cashfree", "Creating order with Cashfree", {
            "order_id": &request.order_id,
            "order_amount": &request.order_amount,
            "order_currency": &request.order_currency
        });
        let client = reqwest::blocking::Client::new();
        let resp = client
            .post(&format!("{}orders", &self.base_url))
            .header(HeaderName::from_static("x-client-id"), self.app_id.as_str())
            .header(HeaderName::from_static("x-client-secret"), self.secret_key.as_str())
            .header(HeaderName::from_static("x-api-version"), API_VERSION)
            .json(&request)
            .send()?;
        self.parse_response(resp)
    }

    pub fn get_order(&self, order_id: &str) -> Result<OrderResponse, CashfreeError> {
        jlog!(Debug, "cashfree", "Retrieving order from Cashfree", {
            "order_id": order_id
        });
        let client = reqwest::blocking::Client::new();
        let resp = client
            .get(&format!("{}orders/{}", &self.base_url, order_id))
            .header(HeaderName::from_static("x-client-id"), self.app_id.as_str())
            .header(HeaderName::from_static("x-client-secret"), self.secret_key.as_str())
            .header(HeaderName::from_static("x-api-version"), API_VERSION)
            .send()?;
        self.parse_response(resp)
    }

    pub fn create_refund(
        &self,
        order_id: &str,
        request: CreateRefundRequest,
    ) -> Result<RefundResponse, CashfreeError> {
        jlog!(Debug, "cashfree", "Requesting refund from Cashfree", {
            "order_id": order_id,
            "refund_id": &request.refund_id,
            "refund_amount": &request.refund_amount
        });
        let client = reqwest::blocking::Client::new();
        let resp = client
            .post(&format!("{}orders/{}/refunds", &self.base_url, order_id))
            .header(HeaderName::from_static("x-client-id"), self.app_id.as_str())
            .header(HeaderName::from_static("x-client-secret"), self.secret_key.as_str())
            .header(HeaderName::from_static("x-api-version"), API_VERSION)
            .json(&request)
            .send()?;
        self.parse_response(resp)
    }

    fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::blocking::Response,
    ) -> Result<T, CashfreeError> {
        let status = resp.status();
        let value: serde_json::Value = resp.json()?;
        jlog!(Debug, "cashfree", "Response from Cashfree", { "status": status.as_u16(), "response": &value });

        if status.is_success() {
            return Ok(serde_json::from_value(value)?);
        }

        if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
            let error: ApiErrorBody = serde_json::from_value(value)?;
            return Err(CashfreeError::ApiError(error));
        }

        Err(CashfreeError::UnexpectedResponseError(format!(
            "Unexpected status code from Cashfree: {}",
            status
        )))
    }
}

/// Verifies the signature on an inbound webhook before its payload is
/// trusted. Cashfree signs `timestamp + raw_body` with the merchant secret
/// key; the signature header carries the base64 encoded HMAC-SHA256 digest.
/// Verification is constant time via `ring::hmac::verify`.
pub fn verify_webhook_signature(
    secret_key: &str,
    timestamp: &str,
    raw_body: &str,
    signature: &str,
) -> Result<(), CashfreeError> {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret_key.as_bytes());
    let mut signed_payload = String::with_capacity(timestamp.len() + raw_body.len());
    signed_payload.push_str(timestamp);
    signed_payload.push_str(raw_body);
    let provided = base64::decode(signature).map_err(|_| CashfreeError::InvalidSignature)?;
    hmac::verify(&key, signed_payload.as_bytes(), &provided).map_err(|_| CashfreeError::InvalidSignature)
}

#[derive(Debug)]
pub enum CashfreeError {
    /// The gateway rejected the request and returned a structured error body
    ApiError(ApiErrorBody),
    HttpError(reqwest::Error),
    UnexpectedResponseError(String),
    DeserializationError(serde_json::Error),
    InvalidSignature,
}

impl fmt::Display for CashfreeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CashfreeError::ApiError(body) => write!(f, "Cashfree rejected the request: {}", body.message),
            CashfreeError::HttpError(e) => write!(f, "Could not reach Cashfree: {}", e),
            CashfreeError::UnexpectedResponseError(s) => write!(f, "{}", s),
            CashfreeError::DeserializationError(e) => {
                write!(f, "Could not deserialize Cashfree response: {}", e)
            }
            CashfreeError::InvalidSignature => write!(f, "Webhook signature verification failed"),
        }
    }
}

impl StdError for CashfreeError {}

impl From<reqwest::Error> for CashfreeError {
    fn from(e: reqwest::Error) -> Self {
        CashfreeError::HttpError(e)
    }
}

impl From<serde_json::Error> for CashfreeError {
    fn from(e: serde_json::Error) -> Self {
        CashfreeError::DeserializationError(e)
    }
}

#[derive(Deserialize, Debug)]
pub struct ApiErrorBody {
    pub message: String,
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateOrderRequest {
    /// Merchant side identifier for the order, returned in webhooks
    pub order_id: String,
    /// Amount in major currency units, e.g. rupees
    pub order_amount: f64,
    pub order_currency: String,
    pub customer_details: CustomerDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_meta: Option<OrderMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_note: Option<String>,
}

impl CreateOrderRequest {
    pub fn new(
        order_id: String,
        order_amount: f64,
        order_currency: String,
        customer: CustomerDetails,
        return_url: Option<String>,
        notify_url: Option<String>,
    ) -> CreateOrderRequest {
        CreateOrderRequest {
            order_id,
            order_amount,
            order_currency,
            customer_details: customer,
            order_meta: Some(OrderMeta { return_url, notify_url }),
            order_note: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CustomerDetails {
    pub customer_id: String,
    pub customer_email: String,
    pub customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct OrderMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct OrderResponse {
    /// Gateway side order identifier
    pub cf_order_id: serde_json::Value,
    pub order_id: String,
    /// Token used by the hosted checkout widget to open the session
    pub payment_session_id: Option<String>,
    pub order_status: String,
    pub order_amount: f64,
    pub order_currency: String,
    pub order_expiry_time: Option<DateTime<FixedOffset>>,
    pub created_at: Option<DateTime<FixedOffset>>,
}

impl OrderResponse {
    pub fn cf_order_id_string(&self) -> String {
        match &self.cf_order_id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateRefundRequest {
    pub refund_amount: f64,
    pub refund_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_note: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct RefundResponse {
    pub cf_refund_id: serde_json::Value,
    pub refund_id: String,
    pub order_id: String,
    pub refund_status: String,
    pub refund_amount: f64,
}

/// Webhook payload for payment lifecycle notifications. Only the fields
/// the reconciliation path reads are modeled; the raw body is stored
/// against the payment row for audit.
#[derive(Serialize, Deserialize, Debug)]
pub struct WebhookNotification {
    #[serde(rename = "type")]
    pub type_: String,
    pub event_time: Option<String>,
    pub data: WebhookData,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WebhookData {
    pub order: WebhookOrder,
    pub payment: Option<WebhookPayment>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WebhookOrder {
    pub order_id: String,
    pub order_amount: Option<f64>,
    pub order_currency: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WebhookPayment {
    pub cf_payment_id: Option<serde_json::Value>,
    pub payment_status: Option<String>,
    pub payment_amount: Option<f64>,
    pub payment_currency: Option<String>,
    pub payment_message: Option<String>,
    pub payment_time: Option<String>,
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    pub fn deserialize_order_response() {
        let data = r#"
        {
          "cf_order_id": 2149460581,
          "order_id": "registration-9cb51846",
          "entity": "order",
          "order_amount": 500.00,
          "order_currency": "INR",
          "order_status": "ACTIVE",
          "payment_session_id": "session_a1B2c3D4e5F6g7H8i9J0kL",
          "order_expiry_time": "2023-08-03T16:02:42+05:30",
          "created_at": "2023-07-04T16:02:42+05:30",
          "customer_details": {
            "customer_id": "user-42",
            "customer_email": "runner@example.com",
            "customer_phone": "9999999999"
          }
        }
        "#;
        let response: OrderResponse = serde_json::from_str(data).unwrap();

        assert_eq!(response.order_id, "registration-9cb51846");
        assert_eq!(response.order_status, "ACTIVE");
        assert_eq!(response.cf_order_id_string(), "2149460581");
        assert_eq!(
            response.payment_session_id.as_deref(),
            Some("session_a1B2c3D4e5F6g7H8i9J0kL")
        );
    }

    #[test]
    pub fn deserialize_error_body() {
        let data = r#"
        {
          "message": "order_id : provided order_id already exists",
          "code": "order_already_exists",
          "type": "invalid_request_error"
        }
        "#;
        let error: ApiErrorBody = serde_json::from_str(data).unwrap();
        assert_eq!(error.code.as_deref(), Some("order_already_exists"));
        assert_eq!(error.type_.as_deref(), Some("invalid_request_error"));
    }

    #[test]
    pub fn deserialize_webhook() {
        let data = r#"
        {
          "data": {
            "order": {
              "order_id": "registration-9cb51846",
              "order_amount": 500.00,
              "order_currency": "INR"
            },
            "payment": {
              "cf_payment_id": 975672,
              "payment_status": "SUCCESS",
              "payment_amount": 500.00,
              "payment_currency": "INR",
              "payment_message": "Transaction successful",
              "payment_time": "2023-07-04T16:06:51+05:30"
            }
          },
          "event_time": "2023-07-04T16:07:13+05:30",
          "type": "PAYMENT_SUCCESS_WEBHOOK"
        }
        "#;
        let notification: WebhookNotification = serde_json::from_str(data).unwrap();
        assert_eq!(notification.type_, "PAYMENT_SUCCESS_WEBHOOK");
        assert_eq!(notification.data.order.order_id, "registration-9cb51846");
        assert_eq!(
            notification
                .data
                .payment
                .as_ref()
                .and_then(|p| p.payment_status.as_deref()),
            Some("SUCCESS")
        );
    }

    #[test]
    pub fn webhook_signature_round_trip() {
        let secret = "cfsk_ma_test_secret";
        let timestamp = "1688472433";
        let body = r#"{"data":{"order":{"order_id":"registration-9cb51846"}}}"#;

        let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
        let tag = hmac::sign(&key, format!("{}{}", timestamp, body).as_bytes());
        let signature = base64::encode(tag.as_ref());

        assert!(verify_webhook_signature(secret, timestamp, body, &signature).is_ok());
    }

    #[test]
    pub fn webhook_signature_rejects_tampering() {
        let secret = "cfsk_ma_test_secret";
        let timestamp = "1688472433";
        let body = r#"{"data":{"order":{"order_id":"registration-9cb51846"}}}"#;

        let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
        let tag = hmac::sign(&key, format!("{}{}", timestamp, body).as_bytes());
        let signature = base64::encode(tag.as_ref());

        let tampered = body.replace("9cb51846", "deadbeef");
        assert!(verify_webhook_signature(secret, timestamp, &tampered, &signature).is_err());
        assert!(verify_webhook_signature(secret, timestamp, body, "not-base64!!").is_err());
        assert!(verify_webhook_signature("wrong_secret", timestamp, body, &signature).is_err());
    }
}
