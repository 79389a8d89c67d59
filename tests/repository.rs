use std::sync::Arc;
use std::thread;

use pricewatch::domain::extraction::sentinel;
use pricewatch::domain::product::{NewProduct, NormalizedProduct};
use pricewatch::domain::types::ProductUrl;
use pricewatch::repository::{
    DieselRepository, PriceIndex, ProductListQuery, ProductReader, ProductSearchQuery,
    ProductWriter, RepositoryError,
};
use pricewatch::services::merge::{MergeOutcome, MergePolicy, resolve_and_merge};

mod common;

fn url(path: &str) -> ProductUrl {
    ProductUrl::new(format!("https://a.test/{path}")).expect("valid product url")
}

fn normalized(title: &str, price: &str) -> NormalizedProduct {
    NormalizedProduct {
        title: title.to_string(),
        description: "A widget.".to_string(),
        highlights: "Sturdy, Blue".to_string(),
        rating: "4.5".to_string(),
        reviews: "120".to_string(),
        image_url: "https://a.test/widget.png".to_string(),
        total_purchases: "500+".to_string(),
        price: price.to_string(),
    }
}

fn new_product(path: &str, title: &str, price: &str) -> NewProduct {
    NewProduct::new(url(path), normalized(title, price))
}

#[test]
fn creates_product_with_first_observation() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let created = repo
        .create_product(&new_product("p1", "Widget", "$10"))
        .expect("should create product");

    assert_eq!(created.url, url("p1"));
    assert_eq!(created.title, "Widget");
    assert_eq!(created.price_history.len(), 1);
    assert_eq!(created.price_history[0].price, "$10");

    let fetched = repo
        .get_product_by_url(&url("p1"))
        .expect("should look up by url")
        .expect("product should exist");
    assert_eq!(fetched.id, created.id);

    let by_id = repo
        .get_product_by_id(created.id)
        .expect("should look up by id");
    assert!(by_id.is_some());
}

#[test]
fn duplicate_url_reports_unique_violation() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    repo.create_product(&new_product("p1", "Widget", "$10"))
        .expect("should create product");

    let err = repo
        .create_product(&new_product("p1", "Widget Again", "$11"))
        .expect_err("second create for the same url should fail");
    assert!(matches!(err, RepositoryError::UniqueViolation));

    let (total, _) = repo
        .list_products(ProductListQuery::default())
        .expect("should list products");
    assert_eq!(total, 1);
}

#[test]
fn appends_keep_history_ordered_and_immutable() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let created = repo
        .create_product(&new_product("p1", "Widget", "$10"))
        .expect("should create product");
    let original = created.price_history[0].clone();

    repo.append_price(created.id, "$12")
        .expect("should append price");
    let updated = repo
        .append_price(created.id, "$12")
        .expect("should append duplicate price");

    let prices: Vec<&str> = updated
        .price_history
        .iter()
        .map(|p| p.price.as_str())
        .collect();
    assert_eq!(prices, ["$10", "$12", "$12"]);
    // The first observation is untouched by later appends.
    assert_eq!(updated.price_history[0], original);
}

#[test]
fn sentinel_fields_survive_the_store_verbatim() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let mut fields = normalized("Widget", sentinel::PRICE);
    fields.description = sentinel::DESCRIPTION.to_string();
    fields.total_purchases = sentinel::TOTAL_PURCHASES.to_string();
    repo.create_product(&NewProduct::new(url("p1"), fields))
        .expect("should create product");

    let fetched = repo
        .get_product_by_url(&url("p1"))
        .expect("should look up by url")
        .expect("product should exist");
    assert_eq!(fetched.description, sentinel::DESCRIPTION);
    assert_eq!(fetched.total_purchases, sentinel::TOTAL_PURCHASES);
    assert_eq!(fetched.price_history[0].price, sentinel::PRICE);
}

#[test]
fn search_matches_title_case_insensitively() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    repo.create_product(&new_product("p1", "Smart Phone X", "$199"))
        .expect("should create product");
    repo.create_product(&new_product("p2", "Kettle", "$20"))
        .expect("should create product");

    let results = repo
        .search_products(ProductSearchQuery::default().title("phone"))
        .expect("should search products");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Smart Phone X");
}

#[test]
fn price_window_anchors_on_latest_or_oldest_observation() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let created = repo
        .create_product(&new_product("p1", "Widget", "$10"))
        .expect("should create product");
    repo.append_price(created.id, "$12")
        .expect("should append price");

    let window = || {
        ProductSearchQuery::default()
            .min_price("$9")
            .max_price("$11")
    };

    // Latest observation is $12: outside the window.
    let results = repo
        .search_products(window())
        .expect("should search products");
    assert!(results.is_empty());

    // Oldest observation is $10: inside the window.
    let results = repo
        .search_products(window().price_index(PriceIndex::Oldest))
        .expect("should search products");
    assert_eq!(results.len(), 1);
}

#[test]
fn combined_filters_are_conjunctive() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    repo.create_product(&new_product("p1", "Smart Phone X", "$199"))
        .expect("should create product");
    repo.create_product(&new_product("p2", "Phone Case", "$9"))
        .expect("should create product");

    let results = repo
        .search_products(
            ProductSearchQuery::default()
                .title("phone")
                .min_price("$100")
                .max_price("$250"),
        )
        .expect("should search products");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Smart Phone X");
}

#[test]
fn list_products_paginates_in_store_order() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    for i in 1..=3 {
        repo.create_product(&new_product(&format!("p{i}"), &format!("Widget {i}"), "$10"))
            .expect("should create product");
    }

    let (total, page) = repo
        .list_products(ProductListQuery::default().paginate(1, 2))
        .expect("should list products");
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].title, "Widget 1");

    let (_, page) = repo
        .list_products(ProductListQuery::default().paginate(2, 2))
        .expect("should list products");
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].title, "Widget 3");
}

#[test]
fn merge_engine_creates_then_appends_against_the_store() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let policy = MergePolicy::default();

    let first = resolve_and_merge(&url("p1"), normalized("Widget", "$10"), &policy, &repo)
        .expect("first merge should succeed");
    assert_eq!(first.outcome, MergeOutcome::Created);

    let second = resolve_and_merge(&url("p1"), normalized("Widget", "$12"), &policy, &repo)
        .expect("second merge should succeed");
    assert_eq!(second.outcome, MergeOutcome::Appended);

    let prices: Vec<&str> = second
        .product
        .price_history
        .iter()
        .map(|p| p.price.as_str())
        .collect();
    assert_eq!(prices, ["$10", "$12"]);

    let (total, _) = repo
        .list_products(ProductListQuery::default())
        .expect("should list products");
    assert_eq!(total, 1);
}

#[test]
fn concurrent_merges_of_an_unseen_url_yield_one_product() {
    let test_db = common::TestDb::new();
    let repo = Arc::new(DieselRepository::new(test_db.pool()));

    let handles: Vec<_> = ["$10", "$12"]
        .into_iter()
        .map(|price| {
            let repo = Arc::clone(&repo);
            let price = price.to_string();
            thread::spawn(move || {
                resolve_and_merge(
                    &url("p1"),
                    normalized("Widget", &price),
                    &MergePolicy::default(),
                    repo.as_ref(),
                )
            })
        })
        .collect();

    for handle in handles {
        handle
            .join()
            .expect("merge thread should not panic")
            .expect("merge should succeed");
    }

    let (total, products) = repo
        .list_products(ProductListQuery::default())
        .expect("should list products");
    assert_eq!(total, 1);
    assert_eq!(products[0].price_history.len(), 2);
}
