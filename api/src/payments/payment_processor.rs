use crate::payments::PaymentProcessorError;
use chrono::NaiveDateTime;
use serde_json;

/// Seam between the registration flow and the hosted-checkout gateway.
/// Amounts cross this boundary in minor units (paise); each
/// implementation owns the conversion its gateway expects.
pub trait PaymentProcessor {
    fn name(&self) -> String;

    fn create_order(
        &self,
        order_id: &str,
        amount_in_cents: i64,
        currency: &str,
        customer: CustomerInfo,
        return_url: String,
        notify_url: String,
    ) -> Result<SessionInfo, PaymentProcessorError>;

    fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, PaymentProcessorError>;

    fn refund(
        &self,
        order_id: &str,
        refund_id: &str,
        amount_in_cents: i64,
    ) -> Result<(), PaymentProcessorError>;
}

pub struct CustomerInfo {
    pub id: String,
    pub email: String,
    pub phone: String,
    pub name: Option<String>,
}

/// What the client needs to open the gateway's checkout widget.
#[derive(Serialize, Clone)]
pub struct SessionInfo {
    pub gateway_order_id: String,
    pub session_id: Option<String>,
    pub order_status: String,
    pub expires_at: Option<NaiveDateTime>,
}

/// A point-in-time view of an order, polled from the gateway. The raw
/// payload is stored against the payment row for audit.
pub struct GatewayOrder {
    pub order_status: String,
    pub raw_data: serde_json::Value,
}
