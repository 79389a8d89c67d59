use actix_web::{HttpResponse, Responder, get, post, web};
use serde::{Deserialize, Serialize};

use crate::extractor::css::CssExtractor;
use crate::models::config::AppConfig;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::products::{
    SearchFilter, list_catalog as list_catalog_service, search_catalog as search_catalog_service,
    track_product as track_product_service,
};

#[derive(Deserialize)]
struct FetchForm {
    url: String,
}

#[derive(Deserialize)]
struct ListQueryParams {
    page: Option<usize>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[post("/api/products/fetch")]
pub async fn fetch_product(
    form: web::Json<FetchForm>,
    repo: web::Data<DieselRepository>,
    extractor: web::Data<CssExtractor>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    match track_product_service(
        &form.url,
        extractor.get_ref(),
        &config.merge_policy(),
        repo.get_ref(),
    )
    .await
    {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(ServiceError::Validation(message)) => {
            HttpResponse::BadRequest().json(ErrorBody::new(message))
        }
        Err(ServiceError::ExtractionUnavailable(message)) => {
            HttpResponse::BadGateway().json(ErrorBody::new(message))
        }
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(e) => {
            log::error!("Failed to track product: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/api/products/search")]
pub async fn search_products(
    params: web::Query<SearchFilter>,
    repo: web::Data<DieselRepository>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    match search_catalog_service(params.into_inner(), config.price_index(), repo.get_ref()) {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(e) => {
            log::error!("Failed to search products: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/api/products")]
pub async fn list_products(
    params: web::Query<ListQueryParams>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let page = params.page.unwrap_or(1);
    match list_catalog_service(page, repo.get_ref()) {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(e) => {
            log::error!("Failed to list products: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
