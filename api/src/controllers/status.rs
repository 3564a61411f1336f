use actix_web::HttpResponse;

pub async fn check() -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "up", "version": env!("CARGO_PKG_VERSION")}))
}
