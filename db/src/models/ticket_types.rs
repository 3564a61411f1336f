use chrono::{NaiveDateTime, Utc};
use diesel;
use diesel::dsl;
use diesel::prelude::*;
use models::*;
use schema::{registrations, ticket_types};
use utils::errors::*;
use uuid::Uuid;
use validator::*;
use validators::{self, *};

/// A purchasable tier of event entry. Availability is always derived from
/// the registrations table rather than stored, so it cannot drift.
#[derive(Clone, Debug, Identifiable, Associations, PartialEq, Queryable, Serialize)]
#[belongs_to(Event)]
#[table_name = "ticket_types"]
pub struct TicketType {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_in_cents: i64,
    pub currency: String,
    pub quantity: i64,
    pub max_per_user: Option<i64>,
    pub sale_start: Option<NaiveDateTime>,
    pub sale_end: Option<NaiveDateTime>,
    pub status: TicketTypeStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Default, Deserialize)]
#[table_name = "ticket_types"]
pub struct TicketTypeEditableAttributes {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price_in_cents: Option<i64>,
    pub quantity: Option<i64>,
    pub max_per_user: Option<Option<i64>>,
    pub sale_start: Option<Option<NaiveDateTime>>,
    pub sale_end: Option<Option<NaiveDateTime>>,
}

impl TicketType {
    pub fn create(
        event_id: Uuid,
        name: String,
        description: Option<String>,
        price_in_cents: i64,
        currency: String,
        quantity: i64,
        max_per_user: Option<i64>,
        sale_start: Option<NaiveDateTime>,
        sale_end: Option<NaiveDateTime>,
    ) -> NewTicketType {
        NewTicketType {
            event_id,
            name,
            description,
            price_in_cents,
            currency,
            quantity,
            max_per_user,
            sale_start,
            sale_end,
            status: TicketTypeStatus::Active,
        }
    }

    pub fn find(id: Uuid, conn: &PgConnection) -> Result<TicketType, DatabaseError> {
        ticket_types::table
            .filter(ticket_types::id.eq(id))
            .get_result(conn)
            .to_db_error(ErrorCode::QueryError, "Could not find ticket type")
    }

    /// Loads the row with a `FOR UPDATE` lock so that the availability
    /// check and the registration insert that follows happen atomically
    /// with respect to other registrants. Must run inside a transaction.
    pub fn find_for_claim(id: Uuid, conn: &PgConnection) -> Result<TicketType, DatabaseError> {
        ticket_types::table
            .filter(ticket_types::id.eq(id))
            .for_update()
            .get_result(conn)
            .to_db_error(ErrorCode::QueryError, "Could not lock ticket type")
    }

    pub fn find_by_event_id(event_id: Uuid, conn: &PgConnection) -> Result<Vec<TicketType>, DatabaseError> {
        ticket_types::table
            .filter(ticket_types::event_id.eq(event_id))
            .order_by(ticket_types::name)
            .load(conn)
            .to_db_error(ErrorCode::QueryError, "Could not load ticket types for event")
    }

    pub fn update(
        &self,
        attributes: TicketTypeEditableAttributes,
        conn: &PgConnection,
    ) -> Result<TicketType, DatabaseError> {
        diesel::update(self)
            .set((attributes, ticket_types::updated_at.eq(dsl::now)))
            .get_result(conn)
            .to_db_error(ErrorCode::UpdateError, "Could not update ticket type")
    }

    /// Registrations claimed against this tier, in any state other than
    /// cancelled. Cancelled registrations release their unit.
    pub fn claimed_count(&self, conn: &PgConnection) -> Result<i64, DatabaseError> {
        registrations::table
            .filter(registrations::ticket_type_id.eq(self.id))
            .filter(registrations::status.ne(RegistrationStatus::Cancelled))
            .select(dsl::count(registrations::id))
            .first(conn)
            .to_db_error(ErrorCode::QueryError, "Could not count registrations for ticket type")
    }

    pub fn available_quantity(&self, conn: &PgConnection) -> Result<i64, DatabaseError> {
        let claimed = self.claimed_count(conn)?;
        Ok((self.quantity - claimed).max(0))
    }

    pub fn is_free(&self) -> bool {
        self.price_in_cents == 0
    }

    pub fn is_on_sale(&self, now: NaiveDateTime) -> bool {
        if self.status != TicketTypeStatus::Active {
            return false;
        }
        if let Some(start) = self.sale_start {
            if now < start {
                return false;
            }
        }
        if let Some(end) = self.sale_end {
            if now >= end {
                return false;
            }
        }
        true
    }

    pub fn check_on_sale(&self) -> Result<(), DatabaseError> {
        if !self.is_on_sale(Utc::now().naive_utc()) {
            return DatabaseError::business_process_error("Ticket type is not on sale");
        }
        Ok(())
    }

    /// Flips status to SoldOut when availability is exhausted, and back to
    /// Active when a cancellation frees a unit. Disabled tiers are left
    /// alone.
    pub fn refresh_sold_out_status(&self, conn: &PgConnection) -> Result<TicketType, DatabaseError> {
        if self.status == TicketTypeStatus::Disabled {
            return Ok(self.clone());
        }

        let available = self.available_quantity(conn)?;
        let new_status = if available <= 0 {
            TicketTypeStatus::SoldOut
        } else {
            TicketTypeStatus::Active
        };
        if new_status == self.status {
            return Ok(self.clone());
        }

        diesel::update(self)
            .set((ticket_types::status.eq(new_status), ticket_types::updated_at.eq(dsl::now)))
            .get_result(conn)
            .to_db_error(ErrorCode::UpdateError, "Could not update ticket type status")
    }

    pub fn disable(&self, conn: &PgConnection) -> Result<TicketType, DatabaseError> {
        diesel::update(self)
            .set((
                ticket_types::status.eq(TicketTypeStatus::Disabled),
                ticket_types::updated_at.eq(dsl::now),
            ))
            .get_result(conn)
            .to_db_error(ErrorCode::UpdateError, "Could not disable ticket type")
    }
}

#[derive(Insertable)]
#[table_name = "ticket_types"]
pub struct NewTicketType {
    event_id: Uuid,
    name: String,
    description: Option<String>,
    price_in_cents: i64,
    currency: String,
    quantity: i64,
    max_per_user: Option<i64>,
    sale_start: Option<NaiveDateTime>,
    sale_end: Option<NaiveDateTime>,
    status: TicketTypeStatus,
}

impl NewTicketType {
    pub fn commit(self, conn: &PgConnection) -> Result<TicketType, DatabaseError> {
        self.validate_record()?;
        diesel::insert_into(ticket_types::table)
            .values(&self)
            .get_result(conn)
            .to_db_error(ErrorCode::InsertError, "Could not create ticket type")
    }

    fn validate_record(&self) -> Result<(), ValidationErrors> {
        let mut validation_errors: Result<(), ValidationErrors> = Ok(());
        validation_errors = validators::append_validation_error(
            validation_errors,
            "quantity",
            validate_greater_than(self.quantity, 0, "quantity_invalid", "Quantity must be positive"),
        );
        validation_errors = validators::append_validation_error(
            validation_errors,
            "price_in_cents",
            validate_greater_than_or_equal(self.price_in_cents, 0, "price_invalid", "Price may not be negative"),
        );
        validation_errors = validators::append_validation_error(
            validation_errors,
            "sale_start",
            start_date_valid(self.sale_start, self.sale_end),
        );
        validation_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ticket_type(status: TicketTypeStatus, sale_start: Option<NaiveDateTime>, sale_end: Option<NaiveDateTime>) -> TicketType {
        let now = NaiveDate::from_ymd(2020, 6, 1).and_hms(0, 0, 0);
        TicketType {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            name: "10K".to_string(),
            description: None,
            price_in_cents: 50000,
            currency: "INR".to_string(),
            quantity: 100,
            max_per_user: Some(1),
            sale_start,
            sale_end,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn on_sale_respects_window_and_status() {
        let start = NaiveDate::from_ymd(2020, 6, 1).and_hms(0, 0, 0);
        let end = NaiveDate::from_ymd(2020, 7, 1).and_hms(0, 0, 0);
        let t = ticket_type(TicketTypeStatus::Active, Some(start), Some(end));

        assert!(t.is_on_sale(NaiveDate::from_ymd(2020, 6, 15).and_hms(12, 0, 0)));
        assert!(!t.is_on_sale(NaiveDate::from_ymd(2020, 5, 31).and_hms(23, 59, 59)));
        assert!(!t.is_on_sale(end));

        let t = ticket_type(TicketTypeStatus::Disabled, None, None);
        assert!(!t.is_on_sale(NaiveDate::from_ymd(2020, 6, 15).and_hms(12, 0, 0)));

        let t = ticket_type(TicketTypeStatus::SoldOut, None, None);
        assert!(!t.is_on_sale(NaiveDate::from_ymd(2020, 6, 15).and_hms(12, 0, 0)));
    }

    #[test]
    fn free_tier_detection() {
        let mut t = ticket_type(TicketTypeStatus::Active, None, None);
        assert!(!t.is_free());
        t.price_in_cents = 0;
        assert!(t.is_free());
    }
}
