table! {
    digital_tickets (id) {
        id -> Uuid,
        registration_id -> Uuid,
        event_id -> Uuid,
        user_id -> Uuid,
        ticket_type_id -> Uuid,
        code -> Text,
        redeemed_by -> Nullable<Uuid>,
        redeemed_at -> Nullable<Timestamp>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    domain_events (id) {
        id -> Uuid,
        event_type -> Text,
        display_text -> Text,
        event_data -> Nullable<Jsonb>,
        main_table -> Text,
        main_id -> Nullable<Uuid>,
        user_id -> Nullable<Uuid>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    events (id) {
        id -> Uuid,
        organizer_id -> Uuid,
        title -> Text,
        description -> Nullable<Text>,
        location -> Nullable<Text>,
        event_date -> Timestamp,
        status -> Text,
        capacity -> Nullable<Int8>,
        banner_url -> Nullable<Text>,
        registration_deadline -> Nullable<Timestamp>,
        form_schema -> Nullable<Jsonb>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    form_responses (id) {
        id -> Uuid,
        registration_id -> Uuid,
        answers -> Jsonb,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    payments (id) {
        id -> Uuid,
        registration_id -> Uuid,
        gateway_order_id -> Text,
        gateway_session_id -> Nullable<Text>,
        url_nonce -> Nullable<Text>,
        amount -> Int8,
        currency -> Text,
        provider -> Text,
        status -> Text,
        raw_data -> Nullable<Jsonb>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    receipts (id) {
        id -> Uuid,
        payment_id -> Uuid,
        registration_id -> Uuid,
        gateway_order_id -> Text,
        receipt_number -> Text,
        amount -> Int8,
        currency -> Text,
        created_at -> Timestamp,
    }
}

table! {
    registrations (id) {
        id -> Uuid,
        event_id -> Uuid,
        user_id -> Uuid,
        ticket_type_id -> Uuid,
        status -> Text,
        payment_status -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    ticket_types (id) {
        id -> Uuid,
        event_id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        price_in_cents -> Int8,
        currency -> Text,
        quantity -> Int8,
        max_per_user -> Nullable<Int8>,
        sale_start -> Nullable<Timestamp>,
        sale_end -> Nullable<Timestamp>,
        status -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    ticket_verifications (id) {
        id -> Uuid,
        digital_ticket_id -> Uuid,
        verifier_id -> Uuid,
        outcome -> Text,
        notes -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

table! {
    users (id) {
        id -> Uuid,
        external_id -> Nullable<Text>,
        email -> Text,
        name -> Nullable<Text>,
        phone -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

joinable!(digital_tickets -> registrations (registration_id));
joinable!(digital_tickets -> users (user_id));
joinable!(form_responses -> registrations (registration_id));
joinable!(payments -> registrations (registration_id));
joinable!(receipts -> payments (payment_id));
joinable!(registrations -> events (event_id));
joinable!(registrations -> ticket_types (ticket_type_id));
joinable!(registrations -> users (user_id));
joinable!(ticket_types -> events (event_id));
joinable!(ticket_verifications -> digital_tickets (digital_ticket_id));

allow_tables_to_appear_in_same_query!(
    digital_tickets,
    domain_events,
    events,
    form_responses,
    payments,
    receipts,
    registrations,
    ticket_types,
    ticket_verifications,
    users,
);
