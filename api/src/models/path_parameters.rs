use uuid::Uuid;

#[derive(Deserialize)]
pub struct PathParameters {
    pub id: Uuid,
}

#[derive(Deserialize)]
pub struct CallbackPathParameters {
    pub nonce: String,
    pub id: Uuid,
}
