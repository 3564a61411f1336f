extern crate dotenv;
#[macro_use]
extern crate log;
#[macro_use]
extern crate logging;
#[macro_use]
extern crate serde_json;
extern crate stride_api;

use dotenv::dotenv;
use log::Level::Info;
use stride_api::config::{Config, Environment};
use stride_api::server::Server;

#[actix_web::main]
async fn main() {
    logging::setup_logger();
    info!("Loading environment");
    dotenv().ok();
    jlog!(Info, "Environment loaded");
    let config = Config::new(Environment::Development);
    jlog!(Info, "Starting server", { "app_name": config.app_name });
    Server::start(config).await;
}
