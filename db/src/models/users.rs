use chrono::NaiveDateTime;
use diesel;
use diesel::expression::dsl;
use diesel::prelude::*;
use schema::users;
use utils::errors::*;
use uuid::Uuid;

/// Local mirror of an identity from the hosted auth provider. Sessions and
/// credentials live with the provider; this row only carries what payment
/// receipts and check-in records need.
#[derive(Clone, Debug, Identifiable, PartialEq, Queryable, Serialize)]
pub struct User {
    pub id: Uuid,
    pub external_id: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn create(external_id: Option<String>, email: String, name: Option<String>, phone: Option<String>) -> NewUser {
        NewUser {
            external_id,
            email,
            name,
            phone,
        }
    }

    pub fn find(id: Uuid, conn: &PgConnection) -> Result<User, DatabaseError> {
        users::table
            .filter(users::id.eq(id))
            .first(conn)
            .to_db_error(ErrorCode::QueryError, "Could not find user")
    }

    pub fn find_by_email(email: &str, conn: &PgConnection) -> Result<Option<User>, DatabaseError> {
        users::table
            .filter(users::email.eq(email))
            .first(conn)
            .to_db_error(ErrorCode::QueryError, "Could not find user by email")
            .optional()
    }

    pub fn update_contact_details(
        &self,
        name: Option<String>,
        phone: Option<String>,
        conn: &PgConnection,
    ) -> Result<User, DatabaseError> {
        diesel::update(self)
            .set((
                users::name.eq(name),
                users::phone.eq(phone),
                users::updated_at.eq(dsl::now),
            ))
            .get_result(conn)
            .to_db_error(ErrorCode::UpdateError, "Could not update user")
    }
}

#[derive(Insertable)]
#[table_name = "users"]
pub struct NewUser {
    external_id: Option<String>,
    email: String,
    name: Option<String>,
    phone: Option<String>,
}

impl NewUser {
    pub fn commit(self, conn: &PgConnection) -> Result<User, DatabaseError> {
        diesel::insert_into(users::table)
            .values(&self)
            .get_result(conn)
            .to_db_error(ErrorCode::InsertError, "Could not create user")
    }
}
