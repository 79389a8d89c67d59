use actix_web::{App, HttpServer, middleware, web};

use pricewatch::db::establish_connection_pool;
use pricewatch::extractor::css::CssExtractor;
use pricewatch::models::config::AppConfig;
use pricewatch::repository::DieselRepository;
use pricewatch::routes::products::{fetch_product, list_products, search_products};

fn load_config() -> Result<AppConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name("pricewatch").required(false))
        .add_source(config::Environment::with_prefix("PRICEWATCH"))
        .build()?
        .try_deserialize()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database pool: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let extractor = match CssExtractor::new(config.selectors.clone()) {
        Ok(extractor) => extractor,
        Err(e) => {
            log::error!("Failed to build extractor: {e}");
            std::process::exit(1);
        }
    };

    let bind_address = config.bind_address.clone();
    log::info!("Starting server on {bind_address}");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(extractor.clone()))
            .app_data(web::Data::new(config.clone()))
            .service(fetch_product)
            .service(search_products)
            .service(list_products)
    })
    .bind(&bind_address)?
    .run()
    .await
}
