use diesel::PgConnection;
use serde_json;
use stride_db::prelude::*;
use uuid::Uuid;

/// Registration as returned to the client: the row itself plus the
/// pieces of its flow a front end renders (answers, payments, ticket).
#[derive(Serialize)]
pub struct DisplayRegistration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub ticket_type_id: Uuid,
    pub status: RegistrationStatus,
    pub payment_status: PaymentStatus,
    pub answers: Option<serde_json::Value>,
    pub payments: Vec<DisplayPayment>,
    pub ticket: Option<DisplayDigitalTicket>,
}

#[derive(Serialize)]
pub struct DisplayPayment {
    pub id: Uuid,
    pub gateway_order_id: String,
    pub amount: i64,
    pub currency: String,
    pub provider: String,
    pub status: PaymentStatus,
}

#[derive(Serialize)]
pub struct DisplayDigitalTicket {
    pub id: Uuid,
    pub code: String,
    pub redeemed: bool,
}

impl DisplayRegistration {
    pub fn from_registration(
        registration: &Registration,
        conn: &PgConnection,
    ) -> Result<DisplayRegistration, DatabaseError> {
        let answers = registration.form_response(conn)?.map(|r| r.answers);
        let payments = registration
            .payments(conn)?
            .iter()
            .map(|p| DisplayPayment {
                id: p.id,
                gateway_order_id: p.gateway_order_id.clone(),
                amount: p.amount,
                currency: p.currency.clone(),
                provider: p.provider.clone(),
                status: p.status,
            })
            .collect();
        let ticket = registration.digital_ticket(conn)?.map(|t| DisplayDigitalTicket {
            id: t.id,
            code: t.code.clone(),
            redeemed: t.is_redeemed(),
        });

        Ok(DisplayRegistration {
            id: registration.id,
            event_id: registration.event_id,
            user_id: registration.user_id,
            ticket_type_id: registration.ticket_type_id,
            status: registration.status,
            payment_status: registration.payment_status,
            answers,
            payments,
            ticket,
        })
    }
}
