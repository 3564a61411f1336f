use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use utils::errors::EnumParseError;

macro_rules! string_enum {
    ($name:ident [$($value:ident),+]) => {

        #[derive(AsExpression, FromSqlRow, Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, Hash)]
        #[sql_type = "Text"]
        pub enum $name {
            $(
                $value,
            )*
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
                let s = match self {
                    $(
                        $name::$value => stringify!($value),
                    )*
                };
                write!(f, "{}", s)
            }
        }

        impl FromStr for $name {
            type Err = EnumParseError;

            fn from_str(s: &str) -> Result<$name, EnumParseError> {
                match s {
                    $(
                        stringify!($value) => Ok($name::$value),
                    )*
                    _ => Err(EnumParseError {
                        message: "Could not parse value".to_string(),
                        enum_type: stringify!($name).to_string(),
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl ToSql<Text, Pg> for $name {
            fn to_sql<W: Write>(&self, out: &mut Output<W, Pg>) -> serialize::Result {
                <String as ToSql<Text, Pg>>::to_sql(&self.to_string(), out)
            }
        }

        impl FromSql<Text, Pg> for $name {
            fn from_sql(bytes: Option<&[u8]>) -> deserialize::Result<Self> {
                let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
                s.parse::<$name>().map_err(|e| Box::new(e).into())
            }
        }
    }
}

string_enum! { EventStatus [Draft, Published, Cancelled] }
string_enum! { TicketTypeStatus [Active, SoldOut, Disabled] }
string_enum! { RegistrationStatus [Pending, Confirmed, Cancelled] }
string_enum! { PaymentStatus [Pending, Completed, Failed, Refunded] }
string_enum! { CheckInOutcome [Admitted, Rejected] }
string_enum! { Tables [Events, TicketTypes, Registrations, FormResponses, Payments, DigitalTickets, Receipts] }
string_enum! { DomainEventTypes [
    EventCreated,
    EventUpdated,
    EventPublished,
    EventCancelled,
    RegistrationCreated,
    RegistrationConfirmed,
    RegistrationCancelled,
    FormResponseSaved,
    PaymentCreated,
    PaymentUpdated,
    PaymentCompleted,
    PaymentFailed,
    PaymentRefunded,
    PaymentWebhookReceived,
    TicketIssued,
    TicketRedeemed
] }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_through_parse() {
        assert_eq!(EventStatus::Published.to_string(), "Published");
        assert_eq!("Published".parse::<EventStatus>().unwrap(), EventStatus::Published);
        assert_eq!("Pending".parse::<PaymentStatus>().unwrap(), PaymentStatus::Pending);
        assert_eq!(RegistrationStatus::Cancelled.to_string(), "Cancelled");
    }

    #[test]
    fn parse_rejects_unknown_values() {
        let err = "NotAStatus".parse::<PaymentStatus>().unwrap_err();
        assert_eq!(err.enum_type, "PaymentStatus");
        assert_eq!(err.value, "NotAStatus");
    }
}
