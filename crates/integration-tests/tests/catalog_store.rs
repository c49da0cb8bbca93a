//! Product repository integration tests.
//!
//! Requires a migrated `PostgreSQL` database (see the crate docs). Run
//! with: `cargo test -p orchard-integration-tests -- --ignored`

use rust_decimal::dec;

use orchard_integration_tests::{create_test_product, remove_test_product, test_pool};
use orchard_server::db::ProductRepository;

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_update_stock_refuses_to_go_negative() {
    let pool = test_pool().await;
    let product = create_test_product(&pool, dec!(5.00), 3).await;

    let repo = ProductRepository::new(&pool);
    let result = repo.update_stock(product.id, -5).await.expect("update");
    assert!(result.is_none(), "delta below zero must be refused");

    // The refused update must not have touched the row.
    let unchanged = repo.get(product.id).await.expect("get");
    assert_eq!(unchanged.map(|p| p.stock), Some(3));

    remove_test_product(&pool, product.id).await;
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_update_stock_applies_signed_delta() {
    let pool = test_pool().await;
    let product = create_test_product(&pool, dec!(5.00), 3).await;

    let repo = ProductRepository::new(&pool);
    let restocked = repo.update_stock(product.id, 4).await.expect("restock");
    assert_eq!(restocked.map(|p| p.stock), Some(7));

    // Draining to exactly zero is allowed.
    let drained = repo.update_stock(product.id, -7).await.expect("drain");
    assert_eq!(drained.map(|p| p.stock), Some(0));

    remove_test_product(&pool, product.id).await;
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_update_stock_missing_product_is_none() {
    let pool = test_pool().await;
    let product = create_test_product(&pool, dec!(5.00), 3).await;

    let repo = ProductRepository::new(&pool);
    assert!(repo.delete(product.id).await.expect("delete"));

    let result = repo.update_stock(product.id, 1).await.expect("update");
    assert!(result.is_none());
}
