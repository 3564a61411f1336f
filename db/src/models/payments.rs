use chrono::NaiveDateTime;
use diesel;
use diesel::expression::dsl;
use diesel::prelude::*;
use log::Level;
use models::*;
use schema::payments;
use serde_json;
use utils::errors::*;
use utils::rand::random_alpha_string;
use uuid::Uuid;

/// One attempt to collect money for a registration. Each retry after a
/// failure creates a fresh row with a fresh gateway order; the gateway
/// order id is unique and is the idempotency key for everything the
/// gateway tells us afterwards.
#[derive(Clone, Debug, Identifiable, Associations, PartialEq, Queryable, Serialize)]
#[belongs_to(Registration)]
pub struct Payment {
    pub id: Uuid,
    pub registration_id: Uuid,
    pub gateway_order_id: String,
    pub gateway_session_id: Option<String>,
    pub url_nonce: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub provider: String,
    pub status: PaymentStatus,
    pub raw_data: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Payment {
    pub fn create(
        registration_id: Uuid,
        gateway_order_id: String,
        gateway_session_id: Option<String>,
        amount: i64,
        currency: String,
        provider: String,
    ) -> NewPayment {
        NewPayment {
            registration_id,
            gateway_order_id,
            gateway_session_id,
            url_nonce: Some(random_alpha_string(16)),
            amount,
            currency,
            provider,
            status: PaymentStatus::Pending,
        }
    }

    pub fn find(id: Uuid, conn: &PgConnection) -> Result<Payment, DatabaseError> {
        payments::table
            .filter(payments::id.eq(id))
            .first(conn)
            .to_db_error(ErrorCode::QueryError, "Could not find payment")
    }

    pub fn find_by_gateway_order(
        gateway_order_id: &str,
        conn: &PgConnection,
    ) -> Result<Payment, DatabaseError> {
        payments::table
            .filter(payments::gateway_order_id.eq(gateway_order_id))
            .first(conn)
            .to_db_error(ErrorCode::QueryError, "Could not find payment for gateway order")
    }

    pub fn find_by_registration(registration_id: Uuid, conn: &PgConnection) -> Result<Vec<Payment>, DatabaseError> {
        payments::table
            .filter(payments::registration_id.eq(registration_id))
            .order_by(payments::created_at.desc())
            .load(conn)
            .to_db_error(ErrorCode::QueryError, "Could not load payments for registration")
    }

    pub fn registration(&self, conn: &PgConnection) -> Result<Registration, DatabaseError> {
        Registration::find(self.registration_id, conn)
    }

    pub fn is_terminal(&self) -> bool {
        match self.status {
            PaymentStatus::Completed | PaymentStatus::Failed | PaymentStatus::Refunded => true,
            PaymentStatus::Pending => false,
        }
    }

    /// Maps a Cashfree order status onto our payment status. `None` means
    /// the order is still in flight and nothing should change yet.
    pub fn map_gateway_status(order_status: &str) -> Option<PaymentStatus> {
        match order_status {
            "PAID" => Some(PaymentStatus::Completed),
            "EXPIRED" | "CANCELLED" | "TERMINATED" | "FAILED" => Some(PaymentStatus::Failed),
            "REFUNDED" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    /// Applies a status reported by the gateway, whether it arrived via
    /// webhook or via the redirect poll. Both channels funnel through here
    /// so the outcome is the same regardless of which lands first, and
    /// replays of an already-applied status are no-ops. A terminal status
    /// is never walked back; the only terminal transition allowed is
    /// `Completed` to `Refunded`.
    pub fn apply_gateway_status(
        &self,
        order_status: &str,
        raw_data: Option<serde_json::Value>,
        current_user_id: Option<Uuid>,
        conn: &PgConnection,
    ) -> Result<Payment, DatabaseError> {
        DomainEvent::create(
            DomainEventTypes::PaymentWebhookReceived,
            format!("Gateway reported order status {}", order_status),
            Tables::Payments,
            Some(self.id),
            current_user_id,
            raw_data.clone(),
        )
        .commit(conn)?;

        let new_status = match Payment::map_gateway_status(order_status) {
            Some(status) => status,
            None => return Ok(self.clone()),
        };

        if new_status == self.status {
            return Ok(self.clone());
        }

        if self.is_terminal() {
            if self.status == PaymentStatus::Completed && new_status == PaymentStatus::Refunded {
                return self.mark_refunded(current_user_id, conn);
            }
            jlog!(
                Level::Warn,
                "stride_db::payments",
                "Ignoring gateway status for settled payment",
                {
                    "payment_id": self.id,
                    "current_status": self.status,
                    "reported_status": order_status
                }
            );
            return Ok(self.clone());
        }

        match new_status {
            PaymentStatus::Completed => self.mark_completed(raw_data, current_user_id, conn),
            PaymentStatus::Failed => self.mark_failed(raw_data, current_user_id, conn),
            PaymentStatus::Refunded => self.mark_refunded(current_user_id, conn),
            PaymentStatus::Pending => Ok(self.clone()),
        }
    }

    /// Settles the payment: confirms the registration, issues the ticket
    /// and writes the receipt. Each step is idempotent, so a webhook and a
    /// redirect poll racing each other both converge on the same rows.
    pub fn mark_completed(
        &self,
        raw_data: Option<serde_json::Value>,
        current_user_id: Option<Uuid>,
        conn: &PgConnection,
    ) -> Result<Payment, DatabaseError> {
        let payment = self.update_status(PaymentStatus::Completed, raw_data, conn)?;

        DomainEvent::create(
            DomainEventTypes::PaymentCompleted,
            "Payment completed".to_string(),
            Tables::Payments,
            Some(self.id),
            current_user_id,
            None,
        )
        .commit(conn)?;

        let registration = self.registration(conn)?;
        registration.confirm(current_user_id, conn)?;
        Receipt::create(&payment, conn)?;

        Ok(payment)
    }

    pub fn mark_failed(
        &self,
        raw_data: Option<serde_json::Value>,
        current_user_id: Option<Uuid>,
        conn: &PgConnection,
    ) -> Result<Payment, DatabaseError> {
        let payment = self.update_status(PaymentStatus::Failed, raw_data, conn)?;

        DomainEvent::create(
            DomainEventTypes::PaymentFailed,
            "Payment failed".to_string(),
            Tables::Payments,
            Some(self.id),
            current_user_id,
            None,
        )
        .commit(conn)?;

        self.registration(conn)?.set_payment_status(PaymentStatus::Failed, conn)?;

        Ok(payment)
    }

    /// Marks a settled payment refunded and cancels the registration,
    /// which releases the ticket back to the tier.
    pub fn mark_refunded(&self, current_user_id: Option<Uuid>, conn: &PgConnection) -> Result<Payment, DatabaseError> {
        let payment = self.update_status(PaymentStatus::Refunded, None, conn)?;

        DomainEvent::create(
            DomainEventTypes::PaymentRefunded,
            "Payment refunded".to_string(),
            Tables::Payments,
            Some(self.id),
            current_user_id,
            None,
        )
        .commit(conn)?;

        self.registration(conn)?.cancel(current_user_id, conn)?;

        Ok(payment)
    }

    /// The session token arrives from the gateway after the payment row
    /// exists, since the return URL needs the row's id and nonce first.
    pub fn set_gateway_session(
        &self,
        gateway_session_id: Option<String>,
        conn: &PgConnection,
    ) -> Result<Payment, DatabaseError> {
        diesel::update(self)
            .set((
                payments::gateway_session_id.eq(gateway_session_id),
                payments::updated_at.eq(dsl::now),
            ))
            .get_result(conn)
            .to_db_error(ErrorCode::UpdateError, "Could not store gateway session")
    }

    /// Only a completed payment can be refunded.
    pub fn check_refundable(&self) -> Result<(), DatabaseError> {
        if self.status != PaymentStatus::Completed {
            return DatabaseError::business_process_error("Only a completed payment can be refunded");
        }
        Ok(())
    }

    fn update_status(
        &self,
        status: PaymentStatus,
        raw_data: Option<serde_json::Value>,
        conn: &PgConnection,
    ) -> Result<Payment, DatabaseError> {
        match raw_data {
            Some(raw_data) => diesel::update(self)
                .set((
                    payments::status.eq(status),
                    payments::raw_data.eq(raw_data),
                    payments::updated_at.eq(dsl::now),
                ))
                .get_result(conn)
                .to_db_error(ErrorCode::UpdateError, "Could not update payment status"),
            None => diesel::update(self)
                .set((payments::status.eq(status), payments::updated_at.eq(dsl::now)))
                .get_result(conn)
                .to_db_error(ErrorCode::UpdateError, "Could not update payment status"),
        }
    }
}

#[derive(Insertable)]
#[table_name = "payments"]
pub struct NewPayment {
    registration_id: Uuid,
    gateway_order_id: String,
    gateway_session_id: Option<String>,
    url_nonce: Option<String>,
    amount: i64,
    currency: String,
    provider: String,
    status: PaymentStatus,
}

impl NewPayment {
    pub fn commit(self, current_user_id: Option<Uuid>, conn: &PgConnection) -> Result<Payment, DatabaseError> {
        let payment: Payment = diesel::insert_into(payments::table)
            .values(&self)
            .get_result(conn)
            .to_db_error(ErrorCode::InsertError, "Could not create payment")?;

        DomainEvent::create(
            DomainEventTypes::PaymentCreated,
            "Payment created".to_string(),
            Tables::Payments,
            Some(payment.id),
            current_user_id,
            Some(json!({
                "gateway_order_id": payment.gateway_order_id,
                "amount": payment.amount,
                "currency": payment.currency
            })),
        )
        .commit(conn)?;

        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_status_mapping() {
        assert_eq!(Payment::map_gateway_status("PAID"), Some(PaymentStatus::Completed));
        assert_eq!(Payment::map_gateway_status("EXPIRED"), Some(PaymentStatus::Failed));
        assert_eq!(Payment::map_gateway_status("CANCELLED"), Some(PaymentStatus::Failed));
        assert_eq!(Payment::map_gateway_status("TERMINATED"), Some(PaymentStatus::Failed));
        assert_eq!(Payment::map_gateway_status("FAILED"), Some(PaymentStatus::Failed));
        assert_eq!(Payment::map_gateway_status("REFUNDED"), Some(PaymentStatus::Refunded));
        assert_eq!(Payment::map_gateway_status("ACTIVE"), None);
        assert_eq!(Payment::map_gateway_status("SOMETHING_NEW"), None);
    }
}
