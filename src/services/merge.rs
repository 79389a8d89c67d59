//! The merge engine: resolves a URL to exactly one product and applies a
//! create-or-append transition.

use serde::Serialize;

use crate::domain::product::{NewProduct, NormalizedProduct, Product};
use crate::domain::types::ProductUrl;
use crate::repository::{ProductReader, ProductWriter, RepositoryError};

use super::ServiceResult;

/// Controls whether a fetch that observed an unchanged price is recorded.
///
/// The default records every successful fetch, so consecutive identical
/// prices show up as separate history entries.
#[derive(Debug, Clone, Default)]
pub struct MergePolicy {
    pub append_on_change_only: bool,
}

/// How a merge reconciled the fetch result with existing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    /// First sighting of the URL; a new product was inserted.
    Created,
    /// The URL was already tracked; one observation was appended.
    Appended,
    /// The create lost an insert race to a concurrent merge and was
    /// converted into an append on the winner's record.
    RetriedAsAppend,
    /// Policy skipped the append because the price did not change.
    Unchanged,
}

/// Merge result handed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub outcome: MergeOutcome,
    pub product: Product,
}

/// Resolve `url` to exactly one product and commit the observation.
///
/// An unknown URL creates a product populated from `incoming` with a
/// single-entry history. A known URL only grows its history; descriptive
/// fields are never refreshed, so the record stays historically stable even
/// when the listing's page changes. A unique violation on the create path
/// means a concurrent merge won the insert race; it is recovered locally by
/// re-reading and appending, which also makes the operation safe to retry.
pub fn resolve_and_merge<R>(
    url: &ProductUrl,
    incoming: NormalizedProduct,
    policy: &MergePolicy,
    repo: &R,
) -> ServiceResult<MergeReport>
where
    R: ProductReader + ProductWriter,
{
    let existing = match repo.get_product_by_url(url) {
        Ok(existing) => existing,
        Err(e) => {
            log::error!("Failed to look up product by url: {e}");
            return Err(e.into());
        }
    };

    if let Some(product) = existing {
        return append_observation(product, &incoming.price, policy, repo, MergeOutcome::Appended);
    }

    let price = incoming.price.clone();
    match repo.create_product(&NewProduct::new(url.clone(), incoming)) {
        Ok(product) => Ok(MergeReport {
            outcome: MergeOutcome::Created,
            product,
        }),
        Err(RepositoryError::UniqueViolation) => {
            log::info!("Lost insert race for {url}, appending to existing record");
            match repo.get_product_by_url(url) {
                Ok(Some(product)) => {
                    append_observation(product, &price, policy, repo, MergeOutcome::RetriedAsAppend)
                }
                Ok(None) => {
                    log::error!("Unique violation for {url} but no record found on re-read");
                    Err(RepositoryError::NotFound.into())
                }
                Err(e) => {
                    log::error!("Failed to re-read product after insert race: {e}");
                    Err(e.into())
                }
            }
        }
        Err(e) => {
            log::error!("Failed to create product: {e}");
            Err(e.into())
        }
    }
}

fn append_observation<R>(
    product: Product,
    price: &str,
    policy: &MergePolicy,
    repo: &R,
    outcome: MergeOutcome,
) -> ServiceResult<MergeReport>
where
    R: ProductWriter,
{
    if policy.append_on_change_only
        && product
            .latest_price()
            .is_some_and(|point| point.price == price)
    {
        return Ok(MergeReport {
            outcome: MergeOutcome::Unchanged,
            product,
        });
    }

    match repo.append_price(product.id, price) {
        Ok(product) => Ok(MergeReport { outcome, product }),
        Err(e) => {
            log::error!("Failed to append price observation: {e}");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extraction::sentinel;
    use crate::repository::test::TestRepository;

    fn url(path: &str) -> ProductUrl {
        ProductUrl::new(format!("https://a.test/{path}")).unwrap()
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

    #[test]
    fn creates_product_for_unseen_url() {
        let repo = TestRepository::new(vec![]);
        let url = url("p1");

        let report =
            resolve_and_merge(&url, normalized("Widget", "$10"), &MergePolicy::default(), &repo)
                .unwrap();

        assert_eq!(report.outcome, MergeOutcome::Created);
        assert_eq!(report.product.url, url);
        assert_eq!(report.product.price_history.len(), 1);
        assert_eq!(report.product.price_history[0].price, "$10");
    }

    #[test]
    fn appends_to_seen_url_without_refreshing_fields() {
        let repo = TestRepository::new(vec![]);
        let url = url("p1");
        let policy = MergePolicy::default();

        resolve_and_merge(&url, normalized("Widget", "$10"), &policy, &repo).unwrap();
        let report =
            resolve_and_merge(&url, normalized("Renamed Widget", "$12"), &policy, &repo).unwrap();

        assert_eq!(report.outcome, MergeOutcome::Appended);
        // Only the history grows; the title observed at creation stays.
        assert_eq!(report.product.title, "Widget");
        let prices: Vec<&str> = report
            .product
            .price_history
            .iter()
            .map(|p| p.price.as_str())
            .collect();
        assert_eq!(prices, ["$10", "$12"]);

        let (total, _) = repo.list_products(Default::default()).unwrap();
        assert_eq!(total, 1);
    }

    #[test]
    fn earlier_observations_are_never_mutated() {
        let repo = TestRepository::new(vec![]);
        let url = url("p1");
        let policy = MergePolicy::default();

        let first =
            resolve_and_merge(&url, normalized("Widget", "$10"), &policy, &repo).unwrap();
        let original = first.product.price_history[0].clone();

        for price in ["$11", "$12", "$13"] {
            resolve_and_merge(&url, normalized("Widget", price), &policy, &repo).unwrap();
        }

        let product = repo.get_product_by_url(&url).unwrap().unwrap();
        assert_eq!(product.price_history.len(), 4);
        assert_eq!(product.price_history[0], original);
    }

    #[test]
    fn sentinel_fields_are_stored_verbatim() {
        let repo = TestRepository::new(vec![]);
        let url = url("p1");
        let mut incoming = normalized("Widget", "$10");
        incoming.description = sentinel::DESCRIPTION.to_string();
        incoming.image_url = sentinel::IMAGE.to_string();

        let report =
            resolve_and_merge(&url, incoming, &MergePolicy::default(), &repo).unwrap();

        assert_eq!(report.product.description, sentinel::DESCRIPTION);
        assert_eq!(report.product.image_url, sentinel::IMAGE);
    }

    #[test]
    fn unchanged_price_is_recorded_by_default() {
        let repo = TestRepository::new(vec![]);
        let url = url("p1");
        let policy = MergePolicy::default();

        resolve_and_merge(&url, normalized("Widget", "$10"), &policy, &repo).unwrap();
        let report = resolve_and_merge(&url, normalized("Widget", "$10"), &policy, &repo).unwrap();

        assert_eq!(report.outcome, MergeOutcome::Appended);
        assert_eq!(report.product.price_history.len(), 2);
    }

    #[test]
    fn change_only_policy_skips_equal_price() {
        let repo = TestRepository::new(vec![]);
        let url = url("p1");
        let policy = MergePolicy {
            append_on_change_only: true,
        };

        resolve_and_merge(&url, normalized("Widget", "$10"), &policy, &repo).unwrap();
        let skipped = resolve_and_merge(&url, normalized("Widget", "$10"), &policy, &repo).unwrap();
        assert_eq!(skipped.outcome, MergeOutcome::Unchanged);
        assert_eq!(skipped.product.price_history.len(), 1);

        let appended =
            resolve_and_merge(&url, normalized("Widget", "$12"), &policy, &repo).unwrap();
        assert_eq!(appended.outcome, MergeOutcome::Appended);
        assert_eq!(appended.product.price_history.len(), 2);
    }

    #[test]
    fn lost_insert_race_converts_to_append() {
        let repo = TestRepository::new(vec![]);
        let url = url("p1");

        // Another merge commits the same URL between this merge's lookup
        // and its create.
        repo.stage_insert_race(NewProduct::new(url.clone(), normalized("Widget", "$10")));

        let report =
            resolve_and_merge(&url, normalized("Widget", "$12"), &MergePolicy::default(), &repo)
                .unwrap();

        assert_eq!(report.outcome, MergeOutcome::RetriedAsAppend);
        let prices: Vec<&str> = report
            .product
            .price_history
            .iter()
            .map(|p| p.price.as_str())
            .collect();
        assert_eq!(prices, ["$10", "$12"]);

        let (total, _) = repo.list_products(Default::default()).unwrap();
        assert_eq!(total, 1);
    }
}
