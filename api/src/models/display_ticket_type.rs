use chrono::NaiveDateTime;
use diesel::PgConnection;
use stride_db::prelude::*;
use uuid::Uuid;

/// Ticket tier as shown to registrants, with the computed remaining
/// availability alongside the stored columns.
#[derive(Serialize)]
pub struct DisplayTicketType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_in_cents: i64,
    pub currency: String,
    pub status: TicketTypeStatus,
    pub available: i64,
    pub sale_start: Option<NaiveDateTime>,
    pub sale_end: Option<NaiveDateTime>,
}

impl DisplayTicketType {
    pub fn from_ticket_type(ticket_type: &TicketType, conn: &PgConnection) -> Result<DisplayTicketType, DatabaseError> {
        let available = ticket_type.available_quantity(conn)?;
        Ok(DisplayTicketType {
            id: ticket_type.id,
            name: ticket_type.name.clone(),
            description: ticket_type.description.clone(),
            price_in_cents: ticket_type.price_in_cents,
            currency: ticket_type.currency.clone(),
            status: ticket_type.status,
            available,
            sale_start: ticket_type.sale_start,
            sale_end: ticket_type.sale_end,
        })
    }
}
