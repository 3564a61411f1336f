use crate::controllers::*;
use actix_web::web;

pub fn routes(app: &mut web::ServiceConfig) {
    app.service(web::resource("/status").route(web::get().to(status::check)))
        .service(
            web::resource("/events")
                .route(web::get().to(events::index))
                .route(web::post().to(events::create)),
        )
        .service(
            web::resource("/events/{id}")
                .route(web::get().to(events::show))
                .route(web::put().to(events::update)),
        )
        .service(web::resource("/events/{id}/publish").route(web::put().to(events::publish)))
        .service(web::resource("/events/{id}/cancel").route(web::put().to(events::cancel)))
        .service(
            web::resource("/events/{id}/ticket_types")
                .route(web::get().to(ticket_types::index))
                .route(web::post().to(ticket_types::create)),
        )
        .service(web::resource("/events/{id}/register").route(web::post().to(registrations::register)))
        .service(web::resource("/registrations/{id}").route(web::get().to(registrations::show)))
        .service(web::resource("/registrations/{id}/form").route(web::put().to(registrations::update_form)))
        .service(web::resource("/registrations/{id}/complete").route(web::post().to(registrations::complete)))
        .service(web::resource("/registrations/{id}/payment").route(web::post().to(payments::create)))
        .service(web::resource("/payments/methods").route(web::get().to(payment_methods::index)))
        .service(web::resource("/payments/callback/{nonce}/{id}").route(web::get().to(payments::callback)))
        .service(web::resource("/payments/{id}/refund").route(web::post().to(payments::refund)))
        .service(web::resource("/webhooks/cashfree").route(web::post().to(webhooks::cashfree)))
        .service(web::resource("/tickets/verify").route(web::post().to(tickets::verify)))
        .service(web::resource("/tickets/{id}/verifications").route(web::post().to(tickets::create_verification)));
}
