use crate::config::Config;
use crate::payments::cashfree::CashfreePaymentProcessor;
use crate::payments::PaymentProcessor;

pub struct ServiceLocator {
    cashfree_app_id: String,
    cashfree_secret_key: String,
    cashfree_base_url: String,
    cashfree_webhook_secret: String,
}

impl ServiceLocator {
    pub fn new(config: &Config) -> ServiceLocator {
        ServiceLocator {
            cashfree_app_id: config.cashfree_app_id.clone(),
            cashfree_secret_key: config.cashfree_secret_key.clone(),
            cashfree_base_url: config.cashfree_base_url.clone(),
            cashfree_webhook_secret: config.cashfree_webhook_secret.clone(),
        }
    }

    pub fn create_payment_processor(&self) -> Box<dyn PaymentProcessor> {
        Box::new(CashfreePaymentProcessor::new(
            self.cashfree_app_id.clone(),
            self.cashfree_secret_key.clone(),
            self.cashfree_base_url.clone(),
        ))
    }

    pub fn webhook_secret(&self) -> &str {
        &self.cashfree_webhook_secret
    }
}
