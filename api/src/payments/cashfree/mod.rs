use crate::payments::{CustomerInfo, GatewayOrder, PaymentProcessor, PaymentProcessorError, SessionInfo};
use cashfree::{CashfreeClient, CashfreeError, CreateOrderRequest, CreateRefundRequest, CustomerDetails};

pub struct CashfreePaymentProcessor {
    client: CashfreeClient,
}

impl CashfreePaymentProcessor {
    pub fn new(app_id: String, secret_key: String, base_url: String) -> CashfreePaymentProcessor {
        CashfreePaymentProcessor {
            client: CashfreeClient::new(app_id, secret_key, base_url),
        }
    }
}

impl PaymentProcessor for CashfreePaymentProcessor {
    fn name(&self) -> String {
        "Cashfree".to_string()
    }

    fn create_order(
        &self,
        order_id: &str,
        amount_in_cents: i64,
        currency: &str,
        customer: CustomerInfo,
        return_url: String,
        notify_url: String,
    ) -> Result<SessionInfo, PaymentProcessorError> {
        let request = CreateOrderRequest::new(
            order_id.to_string(),
            to_major_units(amount_in_cents),
            currency.to_string(),
            CustomerDetails {
                customer_id: customer.id,
                customer_email: customer.email,
                customer_phone: customer.phone,
                customer_name: customer.name,
            },
            Some(return_url),
            Some(notify_url),
        );
        let response = self.client.create_order(request).map_err(gateway_error)?;
        Ok(SessionInfo {
            gateway_order_id: response.order_id.clone(),
            session_id: response.payment_session_id.clone(),
            order_status: response.order_status.clone(),
            expires_at: response.order_expiry_time.map(|t| t.naive_utc()),
        })
    }

    fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, PaymentProcessorError> {
        let response = self.client.get_order(order_id).map_err(gateway_error)?;
        let raw_data = json!({
            "cf_order_id": response.cf_order_id_string(),
            "order_id": response.order_id,
            "order_status": response.order_status,
            "order_amount": response.order_amount,
            "order_currency": response.order_currency,
        });
        Ok(GatewayOrder {
            order_status: response.order_status,
            raw_data,
        })
    }

    fn refund(
        &self,
        order_id: &str,
        refund_id: &str,
        amount_in_cents: i64,
    ) -> Result<(), PaymentProcessorError> {
        let request = CreateRefundRequest {
            refund_amount: to_major_units(amount_in_cents),
            refund_id: refund_id.to_string(),
            refund_note: None,
        };
        self.client
            .create_refund(order_id, request)
            .map_err(gateway_error)
            .map(|_| ())
    }
}

// Cashfree works in rupees, payments are stored in paise
fn to_major_units(amount_in_cents: i64) -> f64 {
    amount_in_cents as f64 / 100.0
}

fn gateway_error(error: CashfreeError) -> PaymentProcessorError {
    PaymentProcessorError::new("Gateway request failed".to_string(), Some(Box::new(error)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_paise_to_rupees() {
        assert_eq!(to_major_units(149_900), 1499.0);
        assert_eq!(to_major_units(50), 0.5);
        assert_eq!(to_major_units(0), 0.0);
    }
}
