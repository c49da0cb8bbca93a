//! Cart repository integration tests.
//!
//! Requires a migrated `PostgreSQL` database (see the crate docs). Run
//! with: `cargo test -p orchard-integration-tests -- --ignored`

use rust_decimal::dec;

use orchard_integration_tests::{
    create_test_product, create_test_user, remove_test_product, remove_test_user, test_pool,
};
use orchard_server::db::{CartRepository, ProductRepository};

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_remove_absent_item_succeeds_and_preserves_cart() {
    let pool = test_pool().await;
    let user = create_test_user(&pool).await;
    let in_cart = create_test_product(&pool, dec!(4.00), 10).await;
    let never_added = create_test_product(&pool, dec!(2.50), 5).await;

    let repo = CartRepository::new(&pool);
    repo.add_item(user, in_cart.id).await.expect("add");

    // Removing a product that was never added succeeds and, being
    // idempotent, succeeds again.
    repo.remove_item(user, never_added.id)
        .await
        .expect("remove absent item");
    repo.remove_item(user, never_added.id)
        .await
        .expect("remove absent item again");

    let lines = repo.list_lines(user).await.expect("list");
    assert_eq!(lines.len(), 1, "existing line untouched");
    assert_eq!(lines.first().map(|l| l.product_id), Some(in_cart.id));
    assert_eq!(lines.first().map(|l| l.quantity), Some(1));

    remove_test_user(&pool, user).await;
    remove_test_product(&pool, in_cart.id).await;
    remove_test_product(&pool, never_added.id).await;
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_list_lines_omits_deleted_product() {
    let pool = test_pool().await;
    let user = create_test_user(&pool).await;
    let survivor = create_test_product(&pool, dec!(6.00), 10).await;
    let doomed = create_test_product(&pool, dec!(3.00), 10).await;

    let repo = CartRepository::new(&pool);
    repo.add_item(user, survivor.id).await.expect("add");
    repo.add_item(user, doomed.id).await.expect("add");
    repo.add_item(user, doomed.id).await.expect("add again");

    let deleted = ProductRepository::new(&pool)
        .delete(doomed.id)
        .await
        .expect("delete product");
    assert!(deleted);

    // The listing shows only lines the catalog can still resolve, and the
    // count follows suit.
    let lines = repo.list_lines(user).await.expect("list");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines.first().map(|l| l.product_id), Some(survivor.id));
    assert_eq!(repo.count(user).await.expect("count"), 1);

    remove_test_user(&pool, user).await;
    remove_test_product(&pool, survivor.id).await;
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_add_item_increments_existing_row() {
    let pool = test_pool().await;
    let user = create_test_user(&pool).await;
    let product = create_test_product(&pool, dec!(9.99), 10).await;

    let repo = CartRepository::new(&pool);
    repo.add_item(user, product.id).await.expect("first add");
    repo.add_item(user, product.id).await.expect("second add");

    let lines = repo.list_lines(user).await.expect("list");
    assert_eq!(lines.len(), 1, "upsert keeps one row per product");
    assert_eq!(lines.first().map(|l| l.quantity), Some(2));
    assert_eq!(lines.first().map(|l| l.subtotal), Some(dec!(19.98)));

    remove_test_user(&pool, user).await;
    remove_test_product(&pool, product.id).await;
}
