use chrono::NaiveDateTime;
use diesel;
use diesel::expression::dsl;
use diesel::prelude::*;
use models::*;
use schema::{digital_tickets, ticket_verifications};
use utils::errors::*;
use utils::rand::random_alpha_string;
use uuid::Uuid;

/// The entry pass issued when a registration is confirmed. One per
/// registration; the code is what gets rendered as a QR at the gate.
#[derive(Clone, Debug, Identifiable, Associations, PartialEq, Queryable, Serialize)]
#[belongs_to(Registration)]
#[belongs_to(User)]
pub struct DigitalTicket {
    pub id: Uuid,
    pub registration_id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub ticket_type_id: Uuid,
    pub code: String,
    pub redeemed_by: Option<Uuid>,
    pub redeemed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Identifiable, Queryable, Serialize)]
pub struct TicketVerification {
    pub id: Uuid,
    pub digital_ticket_id: Uuid,
    pub verifier_id: Uuid,
    pub outcome: CheckInOutcome,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl DigitalTicket {
    /// Issues the ticket for a confirmed registration. Keyed on the
    /// registration id, so repeated confirmations (webhook plus redirect
    /// poll) hand back the one ticket that already exists.
    pub fn issue(registration: &Registration, conn: &PgConnection) -> Result<DigitalTicket, DatabaseError> {
        let ticket: Option<DigitalTicket> = diesel::insert_into(digital_tickets::table)
            .values((
                digital_tickets::registration_id.eq(registration.id),
                digital_tickets::event_id.eq(registration.event_id),
                digital_tickets::user_id.eq(registration.user_id),
                digital_tickets::ticket_type_id.eq(registration.ticket_type_id),
                digital_tickets::code.eq(DigitalTicket::generate_code()),
            ))
            .on_conflict(digital_tickets::registration_id)
            .do_nothing()
            .get_result(conn)
            .to_db_error(ErrorCode::InsertError, "Could not issue digital ticket")
            .optional()?;

        match ticket {
            Some(ticket) => {
                DomainEvent::create(
                    DomainEventTypes::TicketIssued,
                    "Digital ticket issued".to_string(),
                    Tables::DigitalTickets,
                    Some(ticket.id),
                    None,
                    None,
                )
                .commit(conn)?;

                Ok(ticket)
            }
            None => DigitalTicket::find_by_registration(registration.id, conn)?.ok_or_else(|| {
                DatabaseError::new(
                    ErrorCode::QueryError,
                    Some("Digital ticket missing after conditional insert".to_string()),
                )
            }),
        }
    }

    pub fn find(id: Uuid, conn: &PgConnection) -> Result<DigitalTicket, DatabaseError> {
        digital_tickets::table
            .filter(digital_tickets::id.eq(id))
            .first(conn)
            .to_db_error(ErrorCode::QueryError, "Could not find digital ticket")
    }

    pub fn find_by_registration(
        registration_id: Uuid,
        conn: &PgConnection,
    ) -> Result<Option<DigitalTicket>, DatabaseError> {
        digital_tickets::table
            .filter(digital_tickets::registration_id.eq(registration_id))
            .first(conn)
            .to_db_error(ErrorCode::QueryError, "Could not find digital ticket for registration")
            .optional()
    }

    pub fn find_by_code(code: &str, conn: &PgConnection) -> Result<Option<DigitalTicket>, DatabaseError> {
        digital_tickets::table
            .filter(digital_tickets::code.eq(code))
            .first(conn)
            .to_db_error(ErrorCode::QueryError, "Could not look up ticket code")
            .optional()
    }

    pub fn is_redeemed(&self) -> bool {
        self.redeemed_at.is_some()
    }

    pub fn verifications(&self, conn: &PgConnection) -> Result<Vec<TicketVerification>, DatabaseError> {
        ticket_verifications::table
            .filter(ticket_verifications::digital_ticket_id.eq(self.id))
            .order_by(ticket_verifications::created_at.asc())
            .load(conn)
            .to_db_error(ErrorCode::QueryError, "Could not load ticket verifications")
    }

    /// Redeems the ticket at the gate. A second scan is rejected and the
    /// attempt is recorded so the gate staff can see the earlier admission.
    pub fn redeem(
        &self,
        verifier_id: Uuid,
        notes: Option<String>,
        conn: &PgConnection,
    ) -> Result<TicketVerification, DatabaseError> {
        if self.is_redeemed() {
            return self.record_verification(
                verifier_id,
                CheckInOutcome::Rejected,
                Some("Ticket already redeemed".to_string()),
                conn,
            );
        }

        let registration = Registration::find(self.registration_id, conn)?;
        if registration.status != RegistrationStatus::Confirmed {
            return self.record_verification(
                verifier_id,
                CheckInOutcome::Rejected,
                Some("Registration is not confirmed".to_string()),
                conn,
            );
        }

        // Claim redemption only if the row is still unredeemed; a
        // concurrent scan that got there first leaves zero rows updated.
        let updated = diesel::update(
            digital_tickets::table
                .filter(digital_tickets::id.eq(self.id))
                .filter(digital_tickets::redeemed_at.is_null()),
        )
        .set((
            digital_tickets::redeemed_by.eq(verifier_id),
            digital_tickets::redeemed_at.eq(dsl::now),
            digital_tickets::updated_at.eq(dsl::now),
        ))
        .execute(conn)
        .to_db_error(ErrorCode::UpdateError, "Could not redeem digital ticket")?;

        if updated == 0 {
            return self.record_verification(
                verifier_id,
                CheckInOutcome::Rejected,
                Some("Ticket already redeemed".to_string()),
                conn,
            );
        }

        DomainEvent::create(
            DomainEventTypes::TicketRedeemed,
            "Digital ticket redeemed".to_string(),
            Tables::DigitalTickets,
            Some(self.id),
            Some(verifier_id),
            None,
        )
        .commit(conn)?;

        // Rejections above keep the generated reason; the scanner's own
        // notes only make it onto an admission
        self.record_verification(verifier_id, CheckInOutcome::Admitted, notes, conn)
    }

    fn record_verification(
        &self,
        verifier_id: Uuid,
        outcome: CheckInOutcome,
        notes: Option<String>,
        conn: &PgConnection,
    ) -> Result<TicketVerification, DatabaseError> {
        diesel::insert_into(ticket_verifications::table)
            .values((
                ticket_verifications::digital_ticket_id.eq(self.id),
                ticket_verifications::verifier_id.eq(verifier_id),
                ticket_verifications::outcome.eq(outcome),
                ticket_verifications::notes.eq(notes),
            ))
            .get_result(conn)
            .to_db_error(ErrorCode::InsertError, "Could not record ticket verification")
    }

    fn generate_code() -> String {
        random_alpha_string(24).to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_codes_are_long_and_unique() {
        let first = DigitalTicket::generate_code();
        let second = DigitalTicket::generate_code();
        assert_eq!(first.len(), 24);
        assert_ne!(first, second);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
