use chrono::NaiveDateTime;
use diesel;
use diesel::prelude::*;
use models::*;
use schema::receipts;
use utils::errors::*;
use utils::rand::random_alpha_string;
use uuid::Uuid;

/// A receipt for a settled payment. Keyed on the gateway order id, so the
/// webhook and the redirect poll both completing the same payment still
/// produce exactly one receipt.
#[derive(Clone, Debug, Identifiable, Associations, PartialEq, Queryable, Serialize)]
#[belongs_to(Payment)]
pub struct Receipt {
    pub id: Uuid,
    pub payment_id: Uuid,
    pub registration_id: Uuid,
    pub gateway_order_id: String,
    pub receipt_number: String,
    pub amount: i64,
    pub currency: String,
    pub created_at: NaiveDateTime,
}

impl Receipt {
    pub fn create(payment: &Payment, conn: &PgConnection) -> Result<Receipt, DatabaseError> {
        let receipt: Option<Receipt> = diesel::insert_into(receipts::table)
            .values((
                receipts::payment_id.eq(payment.id),
                receipts::registration_id.eq(payment.registration_id),
                receipts::gateway_order_id.eq(&payment.gateway_order_id),
                receipts::receipt_number.eq(Receipt::generate_receipt_number()),
                receipts::amount.eq(payment.amount),
                receipts::currency.eq(&payment.currency),
            ))
            .on_conflict(receipts::gateway_order_id)
            .do_nothing()
            .get_result(conn)
            .to_db_error(ErrorCode::InsertError, "Could not create receipt")
            .optional()?;

        match receipt {
            Some(receipt) => Ok(receipt),
            // Lost the race; the existing row is the receipt
            None => Receipt::find_by_gateway_order(&payment.gateway_order_id, conn),
        }
    }

    pub fn find_by_payment(payment_id: Uuid, conn: &PgConnection) -> Result<Option<Receipt>, DatabaseError> {
        receipts::table
            .filter(receipts::payment_id.eq(payment_id))
            .first(conn)
            .to_db_error(ErrorCode::QueryError, "Could not find receipt for payment")
            .optional()
    }

    pub fn find_by_registration(registration_id: Uuid, conn: &PgConnection) -> Result<Option<Receipt>, DatabaseError> {
        receipts::table
            .filter(receipts::registration_id.eq(registration_id))
            .order_by(receipts::created_at.desc())
            .first(conn)
            .to_db_error(ErrorCode::QueryError, "Could not find receipt for registration")
            .optional()
    }

    fn find_by_gateway_order(gateway_order_id: &str, conn: &PgConnection) -> Result<Receipt, DatabaseError> {
        receipts::table
            .filter(receipts::gateway_order_id.eq(gateway_order_id))
            .first(conn)
            .to_db_error(ErrorCode::QueryError, "Could not find receipt for gateway order")
    }

    fn generate_receipt_number() -> String {
        format!("RCP-{}", random_alpha_string(10).to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_numbers_are_prefixed_and_unique() {
        let first = Receipt::generate_receipt_number();
        let second = Receipt::generate_receipt_number();
        assert!(first.starts_with("RCP-"));
        assert_eq!(first.len(), 14);
        assert_ne!(first, second);
    }
}
