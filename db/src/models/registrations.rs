use chrono::NaiveDateTime;
use diesel;
use diesel::expression::dsl;
use diesel::prelude::*;
use models::*;
use schema::registrations;
use utils::errors::*;
use uuid::Uuid;

/// A user's claim on one ticket for one event. Starts `Pending` when the
/// ticket is selected and only becomes `Confirmed` once payment succeeds
/// (or immediately, for free tiers).
#[derive(Clone, Debug, Identifiable, Associations, PartialEq, Queryable, Serialize)]
#[belongs_to(Event)]
#[belongs_to(TicketType)]
#[belongs_to(User)]
pub struct Registration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub ticket_type_id: Uuid,
    pub status: RegistrationStatus,
    pub payment_status: PaymentStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Registration {
    pub fn create(event_id: Uuid, user_id: Uuid, ticket_type_id: Uuid) -> NewRegistration {
        NewRegistration {
            event_id,
            user_id,
            ticket_type_id,
            status: RegistrationStatus::Pending,
            payment_status: PaymentStatus::Pending,
        }
    }

    pub fn find(id: Uuid, conn: &PgConnection) -> Result<Registration, DatabaseError> {
        registrations::table
            .filter(registrations::id.eq(id))
            .first(conn)
            .to_db_error(ErrorCode::QueryError, "Could not find registration")
    }

    /// The registration, if any, that blocks this user from registering
    /// again for the event. Cancelled rows do not block.
    pub fn find_active_for_user(
        user_id: Uuid,
        event_id: Uuid,
        conn: &PgConnection,
    ) -> Result<Option<Registration>, DatabaseError> {
        registrations::table
            .filter(registrations::user_id.eq(user_id))
            .filter(registrations::event_id.eq(event_id))
            .filter(registrations::status.ne(RegistrationStatus::Cancelled))
            .first(conn)
            .to_db_error(ErrorCode::QueryError, "Could not check for existing registration")
            .optional()
    }

    pub fn event(&self, conn: &PgConnection) -> Result<Event, DatabaseError> {
        Event::find(self.event_id, conn)
    }

    pub fn ticket_type(&self, conn: &PgConnection) -> Result<TicketType, DatabaseError> {
        TicketType::find(self.ticket_type_id, conn)
    }

    pub fn user(&self, conn: &PgConnection) -> Result<User, DatabaseError> {
        User::find(self.user_id, conn)
    }

    pub fn form_response(&self, conn: &PgConnection) -> Result<Option<FormResponse>, DatabaseError> {
        FormResponse::find_by_registration(self.id, conn)
    }

    pub fn payments(&self, conn: &PgConnection) -> Result<Vec<Payment>, DatabaseError> {
        Payment::find_by_registration(self.id, conn)
    }

    pub fn digital_ticket(&self, conn: &PgConnection) -> Result<Option<DigitalTicket>, DatabaseError> {
        DigitalTicket::find_by_registration(self.id, conn)
    }

    /// Confirms the registration and issues its digital ticket. Safe to
    /// call more than once; a confirmed registration is returned as is and
    /// issuance is a conditional insert.
    pub fn confirm(&self, current_user_id: Option<Uuid>, conn: &PgConnection) -> Result<Registration, DatabaseError> {
        if self.status == RegistrationStatus::Cancelled {
            return DatabaseError::business_process_error("Cannot confirm a cancelled registration");
        }

        let registration = if self.status == RegistrationStatus::Confirmed {
            self.clone()
        } else {
            let updated: Registration = diesel::update(self)
                .set((
                    registrations::status.eq(RegistrationStatus::Confirmed),
                    registrations::payment_status.eq(PaymentStatus::Completed),
                    registrations::updated_at.eq(dsl::now),
                ))
                .get_result(conn)
                .to_db_error(ErrorCode::UpdateError, "Could not confirm registration")?;

            DomainEvent::create(
                DomainEventTypes::RegistrationConfirmed,
                "Registration confirmed".to_string(),
                Tables::Registrations,
                Some(self.id),
                current_user_id,
                None,
            )
            .commit(conn)?;

            updated
        };

        DigitalTicket::issue(&registration, conn)?;

        Ok(registration)
    }

    /// Completes a free registration without touching the gateway. Paid
    /// tiers must go through the payment flow.
    pub fn complete_free(
        &self,
        current_user_id: Option<Uuid>,
        conn: &PgConnection,
    ) -> Result<Registration, DatabaseError> {
        let ticket_type = self.ticket_type(conn)?;
        if !ticket_type.is_free() {
            return DatabaseError::business_process_error("Ticket type requires payment");
        }
        self.confirm(current_user_id, conn)
    }

    pub fn cancel(&self, current_user_id: Option<Uuid>, conn: &PgConnection) -> Result<Registration, DatabaseError> {
        if self.status == RegistrationStatus::Cancelled {
            return Ok(self.clone());
        }

        let registration: Registration = diesel::update(self)
            .set((
                registrations::status.eq(RegistrationStatus::Cancelled),
                registrations::updated_at.eq(dsl::now),
            ))
            .get_result(conn)
            .to_db_error(ErrorCode::UpdateError, "Could not cancel registration")?;

        DomainEvent::create(
            DomainEventTypes::RegistrationCancelled,
            "Registration cancelled".to_string(),
            Tables::Registrations,
            Some(self.id),
            current_user_id,
            None,
        )
        .commit(conn)?;

        // Cancelling releases the unit; the tier may come back on sale
        self.ticket_type(conn)?.refresh_sold_out_status(conn)?;

        Ok(registration)
    }

    pub fn set_payment_status(
        &self,
        payment_status: PaymentStatus,
        conn: &PgConnection,
    ) -> Result<Registration, DatabaseError> {
        diesel::update(self)
            .set((
                registrations::payment_status.eq(payment_status),
                registrations::updated_at.eq(dsl::now),
            ))
            .get_result(conn)
            .to_db_error(ErrorCode::UpdateError, "Could not update registration payment status")
    }
}

#[derive(Insertable)]
#[table_name = "registrations"]
pub struct NewRegistration {
    event_id: Uuid,
    user_id: Uuid,
    ticket_type_id: Uuid,
    status: RegistrationStatus,
    payment_status: PaymentStatus,
}

impl NewRegistration {
    /// Claims one unit of the tier. The tier row is locked `FOR UPDATE`
    /// before availability is read, so the check and the insert commit as
    /// one unit against concurrent registrants. Must run inside the
    /// request transaction.
    pub fn commit(self, current_user_id: Option<Uuid>, conn: &PgConnection) -> Result<Registration, DatabaseError> {
        let event = Event::find(self.event_id, conn)?;
        event.check_registration_open()?;

        if Registration::find_active_for_user(self.user_id, self.event_id, conn)?.is_some() {
            return DatabaseError::duplicate_error("User already has an active registration for this event");
        }

        let ticket_type = TicketType::find_for_claim(self.ticket_type_id, conn)?;
        if ticket_type.event_id != self.event_id {
            return DatabaseError::business_process_error("Ticket type does not belong to this event");
        }
        ticket_type.check_on_sale()?;
        if ticket_type.available_quantity(conn)? <= 0 {
            return DatabaseError::business_process_error("Ticket type is sold out");
        }

        let registration: Registration = diesel::insert_into(registrations::table)
            .values(&self)
            .get_result(conn)
            .to_db_error(ErrorCode::InsertError, "Could not create registration")?;

        ticket_type.refresh_sold_out_status(conn)?;

        DomainEvent::create(
            DomainEventTypes::RegistrationCreated,
            "Registration created".to_string(),
            Tables::Registrations,
            Some(registration.id),
            current_user_id,
            Some(json!({
                "event_id": self.event_id,
                "ticket_type_id": self.ticket_type_id
            })),
        )
        .commit(conn)?;

        Ok(registration)
    }
}
