use chrono::{NaiveDateTime, Utc};
use diesel;
use diesel::expression::dsl;
use diesel::prelude::*;
use models::*;
use schema::{events, ticket_types};
use serde_json;
use utils::errors::*;
use uuid::Uuid;
use validator::*;
use validators::{self, *};

#[derive(Clone, Debug, Identifiable, PartialEq, Queryable, Serialize)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: NaiveDateTime,
    pub status: EventStatus,
    pub capacity: Option<i64>,
    pub banner_url: Option<String>,
    pub registration_deadline: Option<NaiveDateTime>,
    form_schema: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Default, Deserialize)]
#[table_name = "events"]
pub struct EventEditableAttributes {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: Option<NaiveDateTime>,
    pub capacity: Option<Option<i64>>,
    pub banner_url: Option<Option<String>>,
    pub registration_deadline: Option<Option<NaiveDateTime>>,
    pub form_schema: Option<serde_json::Value>,
}

impl Event {
    pub fn create(
        organizer_id: Uuid,
        title: String,
        description: Option<String>,
        location: Option<String>,
        event_date: NaiveDateTime,
        capacity: Option<i64>,
        registration_deadline: Option<NaiveDateTime>,
        form_schema: Option<FormSchema>,
    ) -> NewEvent {
        NewEvent {
            organizer_id,
            title,
            description,
            location,
            event_date,
            status: EventStatus::Draft,
            capacity,
            registration_deadline,
            form_schema: form_schema.map(|s| serde_json::to_value(s).unwrap_or(serde_json::Value::Null)),
        }
    }

    pub fn find(id: Uuid, conn: &PgConnection) -> Result<Event, DatabaseError> {
        events::table
            .filter(events::id.eq(id))
            .first(conn)
            .to_db_error(ErrorCode::QueryError, "Could not find event")
    }

    pub fn published(conn: &PgConnection) -> Result<Vec<Event>, DatabaseError> {
        events::table
            .filter(events::status.eq(EventStatus::Published))
            .order_by(events::event_date)
            .load(conn)
            .to_db_error(ErrorCode::QueryError, "Could not load published events")
    }

    pub fn update(
        &self,
        attributes: EventEditableAttributes,
        current_user_id: Option<Uuid>,
        conn: &PgConnection,
    ) -> Result<Event, DatabaseError> {
        if let Some(deadline) = attributes.registration_deadline.clone().unwrap_or(self.registration_deadline) {
            let event_date = attributes.event_date.unwrap_or(self.event_date);
            validators::append_validation_error(
                Ok(()),
                "registration_deadline",
                start_date_valid(Some(deadline), Some(event_date)),
            )?;
        }

        diesel::update(self)
            .set((attributes, events::updated_at.eq(dsl::now)))
            .get_result(conn)
            .to_db_error(ErrorCode::UpdateError, "Could not update event")
            .and_then(|event: Event| {
                DomainEvent::create(
                    DomainEventTypes::EventUpdated,
                    "Event updated".to_string(),
                    Tables::Events,
                    Some(event.id),
                    current_user_id,
                    None,
                )
                .commit(conn)?;
                Ok(event)
            })
    }

    /// Makes the event visible to registrants. Cancelled events stay
    /// cancelled; publishing one is a business error, not a reset.
    pub fn publish(&self, current_user_id: Option<Uuid>, conn: &PgConnection) -> Result<Event, DatabaseError> {
        if self.status == EventStatus::Cancelled {
            return DatabaseError::business_process_error("Cannot publish a cancelled event");
        }
        if self.status == EventStatus::Published {
            return Ok(self.clone());
        }

        let event: Event = diesel::update(self)
            .set((events::status.eq(EventStatus::Published), events::updated_at.eq(dsl::now)))
            .get_result(conn)
            .to_db_error(ErrorCode::UpdateError, "Could not publish event")?;

        DomainEvent::create(
            DomainEventTypes::EventPublished,
            format!("Event {} published", self.title),
            Tables::Events,
            Some(self.id),
            current_user_id,
            None,
        )
        .commit(conn)?;

        Ok(event)
    }

    /// Halts new registrations. Existing registrations are left untouched;
    /// refunds are organizer-initiated per payment.
    pub fn cancel(&self, current_user_id: Option<Uuid>, conn: &PgConnection) -> Result<Event, DatabaseError> {
        if self.status == EventStatus::Cancelled {
            return Ok(self.clone());
        }

        let event: Event = diesel::update(self)
            .set((events::status.eq(EventStatus::Cancelled), events::updated_at.eq(dsl::now)))
            .get_result(conn)
            .to_db_error(ErrorCode::UpdateError, "Could not cancel event")?;

        DomainEvent::create(
            DomainEventTypes::EventCancelled,
            format!("Event {} cancelled", self.title),
            Tables::Events,
            Some(self.id),
            current_user_id,
            None,
        )
        .commit(conn)?;

        Ok(event)
    }

    pub fn is_open_for_registration(&self, now: NaiveDateTime) -> bool {
        if self.status != EventStatus::Published {
            return false;
        }
        match self.registration_deadline {
            Some(deadline) => now < deadline,
            None => now < self.event_date,
        }
    }

    pub fn check_registration_open(&self) -> Result<(), DatabaseError> {
        if !self.is_open_for_registration(Utc::now().naive_utc()) {
            return DatabaseError::business_process_error("Event is not open for registration");
        }
        Ok(())
    }

    pub fn ticket_types(&self, conn: &PgConnection) -> Result<Vec<TicketType>, DatabaseError> {
        ticket_types::table
            .filter(ticket_types::event_id.eq(self.id))
            .order_by(ticket_types::name)
            .load(conn)
            .to_db_error(ErrorCode::QueryError, "Could not load ticket types for event")
    }

    /// The event specific registration questions, if the organizer
    /// configured any.
    pub fn form_schema(&self) -> Result<Option<FormSchema>, DatabaseError> {
        match &self.form_schema {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }
}

#[derive(Insertable)]
#[table_name = "events"]
pub struct NewEvent {
    organizer_id: Uuid,
    title: String,
    description: Option<String>,
    location: Option<String>,
    event_date: NaiveDateTime,
    status: EventStatus,
    capacity: Option<i64>,
    registration_deadline: Option<NaiveDateTime>,
    form_schema: Option<serde_json::Value>,
}

impl NewEvent {
    pub fn commit(self, current_user_id: Option<Uuid>, conn: &PgConnection) -> Result<Event, DatabaseError> {
        self.validate_record()?;

        let event: Event = diesel::insert_into(events::table)
            .values(&self)
            .get_result(conn)
            .to_db_error(ErrorCode::InsertError, "Could not create event")?;

        DomainEvent::create(
            DomainEventTypes::EventCreated,
            format!("Event {} created", event.title),
            Tables::Events,
            Some(event.id),
            current_user_id,
            None,
        )
        .commit(conn)?;

        Ok(event)
    }

    fn validate_record(&self) -> Result<(), ValidationErrors> {
        let mut validation_errors: Result<(), ValidationErrors> = Ok(());
        validation_errors = validators::append_validation_error(
            validation_errors,
            "registration_deadline",
            start_date_valid(self.registration_deadline, Some(self.event_date)),
        );
        if let Some(capacity) = self.capacity {
            validation_errors = validators::append_validation_error(
                validation_errors,
                "capacity",
                validate_greater_than(capacity, 0, "capacity_invalid", "Capacity must be positive"),
            );
        }
        validation_errors
    }
}
