//! Checkout engine: the atomic conversion of a cart into an order.
//!
//! The engine runs in two strictly separated passes:
//!
//! 1. **Planning** - aggregate raw cart rows per product id, validate every
//!    line against the catalog, and capture each product's current price.
//!    This pass has no side effects; any failure aborts the checkout with
//!    persisted state untouched.
//! 2. **Mutation** - only once the whole plan validates: insert the order
//!    and its items at the captured prices, deduct stock with a conditional
//!    update, and clear the cart.
//!
//! Because mutation never starts before validation finishes for every line,
//! no compensating rollback logic exists anywhere in the engine; the
//! caller's transaction boundary is the only undo mechanism.
//!
//! The engine is written against the [`CheckoutStore`] trait so the same
//! algorithm runs inside a `PostgreSQL` transaction in production (see
//! [`crate::db::checkout`]) and against an in-memory store in tests.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use orchard_core::{OrderId, ProductId, UserId};

use crate::db::RepositoryError;
use crate::models::{CartRow, Order, OrderItem, Product};

/// Checkout failures. All variants leave persisted state unchanged.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The user's cart has no rows.
    #[error("cart is empty")]
    EmptyCart,

    /// A cart row references a product that no longer exists.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// A line asks for more units than are in stock.
    #[error(
        "insufficient stock for product {product_id}: {available} available, {requested} requested"
    )]
    InsufficientStock {
        product_id: ProductId,
        available: i32,
        requested: i32,
    },

    /// Unexpected storage failure; surfaced opaquely, never retried here.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// One validated order line with its locked-in price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
    /// Unit price read during validation; the mutation pass must not
    /// re-read it.
    pub price_at_purchase: Decimal,
}

/// The outcome of the planning pass: everything the mutation pass needs.
#[derive(Debug, Clone)]
pub struct CheckoutPlan {
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
}

/// A committed checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// Sum of line subtotals at the locked-in prices. Derived, not stored.
    pub total: Decimal,
}

/// Storage operations the engine needs, scoped to a single transaction.
///
/// Implementations must guarantee that nothing becomes visible to other
/// callers until the surrounding transaction commits, and that dropping
/// the transaction on error discards every mutation made through it.
pub trait CheckoutStore {
    /// All raw cart rows for the user, in stable order.
    async fn cart_rows(&mut self, user_id: UserId) -> Result<Vec<CartRow>, RepositoryError>;

    /// Load a product for validation. Implementations should take a row
    /// lock here so two concurrent checkouts cannot both observe the last
    /// unit as available.
    async fn product(&mut self, product_id: ProductId)
    -> Result<Option<Product>, RepositoryError>;

    /// Insert a new `Pending` order for the user.
    async fn insert_order(&mut self, user_id: UserId) -> Result<Order, RepositoryError>;

    /// Insert one order line at its locked-in price.
    async fn insert_order_item(
        &mut self,
        order_id: OrderId,
        line: &OrderLine,
    ) -> Result<OrderItem, RepositoryError>;

    /// Conditionally deduct stock: must only apply when at least `quantity`
    /// units remain, returning `false` otherwise.
    async fn deduct_stock(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<bool, RepositoryError>;

    /// Delete every cart row for the user.
    async fn clear_cart(&mut self, user_id: UserId) -> Result<(), RepositoryError>;
}

/// Collapse raw cart rows into one quantity per distinct product id,
/// preserving first-seen order.
///
/// The cart's primary key already forbids duplicate (user, product) rows,
/// but the engine must not rely on that: rows migrated from older storage
/// or written by a concurrent add race could still repeat a product, and a
/// repeated product processed as two lines would deduct its stock twice.
/// Re-establishing the mapping invariant here is what makes the later
/// passes safe.
fn aggregate(rows: &[CartRow]) -> Vec<(ProductId, i32)> {
    let mut index: HashMap<ProductId, usize> = HashMap::new();
    let mut totals: Vec<(ProductId, i32)> = Vec::new();
    for row in rows {
        if let Some(&at) = index.get(&row.product_id) {
            if let Some(entry) = totals.get_mut(at) {
                entry.1 += row.quantity;
            }
        } else {
            index.insert(row.product_id, totals.len());
            totals.push((row.product_id, row.quantity));
        }
    }
    totals
}

/// Validation pass over the aggregated lines.
///
/// Every line is checked before the first mutation is allowed to happen: a
/// missing product or an over-stock line anywhere in the cart fails the
/// whole checkout. Prices are captured into the plan here and never re-read.
fn plan(
    aggregated: &[(ProductId, i32)],
    products: &HashMap<ProductId, Product>,
) -> Result<CheckoutPlan, CheckoutError> {
    let mut lines = Vec::with_capacity(aggregated.len());
    let mut total = Decimal::ZERO;

    for &(product_id, quantity) in aggregated {
        let product = products
            .get(&product_id)
            .ok_or(CheckoutError::ProductNotFound(product_id))?;
        if quantity > product.stock {
            return Err(CheckoutError::InsufficientStock {
                product_id,
                available: product.stock,
                requested: quantity,
            });
        }
        let price_at_purchase = product.price;
        total += price_at_purchase * Decimal::from(quantity);
        lines.push(OrderLine {
            product_id,
            quantity,
            price_at_purchase,
        });
    }

    Ok(CheckoutPlan { lines, total })
}

/// Execute a checkout for `user_id` against `store`.
///
/// The caller owns the transaction boundary: commit on `Ok`, discard on
/// `Err`. Within that contract this function guarantees the mutation pass
/// only begins once every aggregated line has passed validation.
///
/// # Errors
///
/// Any [`CheckoutError`]; on error no effect of this call may be committed.
pub async fn run<S: CheckoutStore>(
    store: &mut S,
    user_id: UserId,
) -> Result<CheckoutReceipt, CheckoutError> {
    // Step 1: load the cart.
    let rows = store.cart_rows(user_id).await?;
    if rows.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    // Step 2: restore the one-row-per-product invariant.
    let aggregated = aggregate(&rows);

    // Step 3: load and validate every product before touching anything.
    let mut products = HashMap::with_capacity(aggregated.len());
    for &(product_id, _) in &aggregated {
        match store.product(product_id).await? {
            Some(product) => {
                products.insert(product_id, product);
            }
            // A stale cart row cannot be fulfilled; fail rather than
            // silently dropping the line the user expects to receive.
            None => return Err(CheckoutError::ProductNotFound(product_id)),
        }
    }
    let plan = plan(&aggregated, &products)?;

    // Step 4: mutation pass, using only prices captured in the plan.
    let order = store.insert_order(user_id).await?;
    let mut items = Vec::with_capacity(plan.lines.len());
    for line in &plan.lines {
        items.push(store.insert_order_item(order.id, line).await?);

        // The conditional update re-checks stock at mutation time: between
        // the validation read and this write, a concurrent checkout may
        // have taken the last unit.
        if !store.deduct_stock(line.product_id, line.quantity).await? {
            let available = store
                .product(line.product_id)
                .await?
                .map_or(0, |p| p.stock);
            return Err(CheckoutError::InsufficientStock {
                product_id: line.product_id,
                available,
                requested: line.quantity,
            });
        }
    }

    // Step 5: the cart is consumed by the order.
    store.clear_cart(user_id).await?;

    tracing::info!(
        user_id = %user_id,
        order_id = %order.id,
        lines = items.len(),
        total = %plan.total,
        "checkout committed"
    );

    Ok(CheckoutReceipt {
        order,
        items,
        total: plan.total,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use rust_decimal::dec;

    use orchard_core::{OrderItemId, OrderStatus};

    use super::*;

    /// In-memory store state. Mutations apply directly; transaction
    /// semantics live in [`MemoryStore`].
    #[derive(Debug, Clone, Default)]
    struct MemoryState {
        products: BTreeMap<ProductId, Product>,
        cart: Vec<CartRow>,
        orders: Vec<Order>,
        order_items: Vec<OrderItem>,
        next_order_id: i32,
        next_item_id: i32,
    }

    impl CheckoutStore for MemoryState {
        async fn cart_rows(&mut self, user_id: UserId) -> Result<Vec<CartRow>, RepositoryError> {
            Ok(self
                .cart
                .iter()
                .filter(|row| row.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn product(
            &mut self,
            product_id: ProductId,
        ) -> Result<Option<Product>, RepositoryError> {
            Ok(self.products.get(&product_id).cloned())
        }

        async fn insert_order(&mut self, user_id: UserId) -> Result<Order, RepositoryError> {
            self.next_order_id += 1;
            let order = Order {
                id: OrderId::new(self.next_order_id),
                user_id,
                status: OrderStatus::Pending,
                created_at: Utc::now(),
            };
            self.orders.push(order.clone());
            Ok(order)
        }

        async fn insert_order_item(
            &mut self,
            order_id: OrderId,
            line: &OrderLine,
        ) -> Result<OrderItem, RepositoryError> {
            self.next_item_id += 1;
            let item = OrderItem {
                id: OrderItemId::new(self.next_item_id),
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                price_at_purchase: line.price_at_purchase,
            };
            self.order_items.push(item.clone());
            Ok(item)
        }

        async fn deduct_stock(
            &mut self,
            product_id: ProductId,
            quantity: i32,
        ) -> Result<bool, RepositoryError> {
            match self.products.get_mut(&product_id) {
                Some(product) if product.stock >= quantity => {
                    product.stock -= quantity;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn clear_cart(&mut self, user_id: UserId) -> Result<(), RepositoryError> {
            self.cart.retain(|row| row.user_id != user_id);
            Ok(())
        }
    }

    /// Transactional wrapper: checkout runs against a staged clone of the
    /// state, which replaces the committed state only on success. Mirrors
    /// the commit-on-ok / discard-on-err contract of the Postgres path.
    #[derive(Debug, Default)]
    struct MemoryStore {
        state: MemoryState,
    }

    impl MemoryStore {
        async fn checkout(&mut self, user_id: UserId) -> Result<CheckoutReceipt, CheckoutError> {
            let mut staged = self.state.clone();
            let receipt = run(&mut staged, user_id).await?;
            self.state = staged;
            Ok(receipt)
        }

        fn stock_of(&self, product_id: ProductId) -> i32 {
            self.state
                .products
                .get(&product_id)
                .map_or(0, |p| p.stock)
        }
    }

    const ALICE: UserId = UserId::new(1);

    fn product(id: i32, price: Decimal, stock: i32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            description: String::new(),
            price,
            stock,
        }
    }

    fn cart_row(user_id: UserId, product_id: i32, quantity: i32) -> CartRow {
        CartRow {
            user_id,
            product_id: ProductId::new(product_id),
            quantity,
        }
    }

    fn store_with(products: Vec<Product>, cart: Vec<CartRow>) -> MemoryStore {
        MemoryStore {
            state: MemoryState {
                products: products.into_iter().map(|p| (p.id, p)).collect(),
                cart,
                ..MemoryState::default()
            },
        }
    }

    // ------------------------------------------------------------------
    // Aggregation
    // ------------------------------------------------------------------

    #[test]
    fn test_aggregate_sums_duplicate_rows() {
        let rows = vec![
            cart_row(ALICE, 1, 2),
            cart_row(ALICE, 2, 1),
            cart_row(ALICE, 1, 3),
        ];
        assert_eq!(
            aggregate(&rows),
            vec![(ProductId::new(1), 5), (ProductId::new(2), 1)]
        );
    }

    #[test]
    fn test_aggregate_preserves_first_seen_order() {
        let rows = vec![
            cart_row(ALICE, 9, 1),
            cart_row(ALICE, 3, 1),
            cart_row(ALICE, 9, 1),
            cart_row(ALICE, 7, 1),
        ];
        let ids: Vec<i32> = aggregate(&rows).iter().map(|(id, _)| id.as_i32()).collect();
        assert_eq!(ids, vec![9, 3, 7]);
    }

    // ------------------------------------------------------------------
    // Planning
    // ------------------------------------------------------------------

    #[test]
    fn test_plan_locks_prices_and_totals() {
        let products: HashMap<ProductId, Product> = [
            product(1, dec!(9.99), 10),
            product(2, dec!(1.50), 10),
        ]
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

        let plan = plan(&[(ProductId::new(1), 3), (ProductId::new(2), 2)], &products)
            .expect("plan should validate");

        assert_eq!(plan.lines.len(), 2);
        assert_eq!(
            plan.lines.first().map(|l| l.price_at_purchase),
            Some(dec!(9.99))
        );
        assert_eq!(plan.total, dec!(32.97));
    }

    #[test]
    fn test_plan_rejects_over_stock_line() {
        let products: HashMap<ProductId, Product> = [product(1, dec!(2.00), 1)]
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let err = plan(&[(ProductId::new(1), 2)], &products).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock {
                available: 1,
                requested: 2,
                ..
            }
        ));
    }

    // ------------------------------------------------------------------
    // Engine
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_empty_cart_fails() {
        let mut store = store_with(vec![product(1, dec!(5.00), 5)], vec![]);
        let err = store.checkout(ALICE).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_end_to_end_example() {
        // Product A: stock 5, price 9.99; three add-to-cart calls collapse
        // into one row of quantity 3.
        let mut store = store_with(
            vec![product(1, dec!(9.99), 5)],
            vec![cart_row(ALICE, 1, 3)],
        );

        let receipt = store.checkout(ALICE).await.expect("checkout succeeds");

        assert_eq!(receipt.items.len(), 1);
        let item = receipt.items.first().expect("one item");
        assert_eq!(item.quantity, 3);
        assert_eq!(item.price_at_purchase, dec!(9.99));
        assert_eq!(receipt.total, dec!(29.97));
        assert_eq!(receipt.order.status, OrderStatus::Pending);
        assert_eq!(store.stock_of(ProductId::new(1)), 2);
        assert!(store.state.cart.is_empty(), "cart clears on success");
    }

    #[tokio::test]
    async fn test_no_double_deduction_for_duplicate_rows() {
        // Two raw rows for the same product, simulating a pre-dedup race.
        let mut store = store_with(
            vec![product(1, dec!(4.00), 10)],
            vec![cart_row(ALICE, 1, 2), cart_row(ALICE, 1, 3)],
        );

        let receipt = store.checkout(ALICE).await.expect("checkout succeeds");

        // Exactly one order item with the summed quantity, deducted once.
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.items.first().map(|i| i.quantity), Some(5));
        assert_eq!(store.stock_of(ProductId::new(1)), 5);
        assert_eq!(receipt.total, dec!(20.00));
    }

    #[tokio::test]
    async fn test_all_or_nothing_validation() {
        // First line is satisfiable, second is not: nothing may change.
        let mut store = store_with(
            vec![product(1, dec!(1.00), 10), product(2, dec!(1.00), 1)],
            vec![cart_row(ALICE, 1, 2), cart_row(ALICE, 2, 5)],
        );

        let err = store.checkout(ALICE).await.unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::InsufficientStock {
                product_id,
                available: 1,
                requested: 5,
            } if product_id == ProductId::new(2)
        ));
        assert_eq!(store.stock_of(ProductId::new(1)), 10, "no partial deduction");
        assert!(store.state.orders.is_empty(), "no order created");
        assert!(store.state.order_items.is_empty());
        assert_eq!(store.state.cart.len(), 2, "cart untouched");
    }

    #[tokio::test]
    async fn test_price_lock() {
        let mut store = store_with(
            vec![product(1, dec!(10.00), 5)],
            vec![cart_row(ALICE, 1, 1)],
        );

        // Reprice after the item went into the cart.
        if let Some(p) = store.state.products.get_mut(&ProductId::new(1)) {
            p.price = dec!(20.00);
        }
        let receipt = store.checkout(ALICE).await.expect("checkout succeeds");
        assert_eq!(
            receipt.items.first().map(|i| i.price_at_purchase),
            Some(dec!(20.00)),
            "price is read at checkout time, not add-to-cart time"
        );

        // And the captured price survives later repricing: the order item
        // keeps 20.00 even though the catalog moves on.
        if let Some(p) = store.state.products.get_mut(&ProductId::new(1)) {
            p.price = dec!(99.00);
        }
        assert_eq!(
            store.state.order_items.first().map(|i| i.price_at_purchase),
            Some(dec!(20.00))
        );
    }

    #[tokio::test]
    async fn test_stale_cart_row_fails_checkout() {
        // Cart references product 2 which no longer exists.
        let mut store = store_with(
            vec![product(1, dec!(1.00), 10)],
            vec![cart_row(ALICE, 1, 1), cart_row(ALICE, 2, 1)],
        );

        let err = store.checkout(ALICE).await.unwrap_err();
        assert!(
            matches!(err, CheckoutError::ProductNotFound(id) if id == ProductId::new(2))
        );
        assert_eq!(store.stock_of(ProductId::new(1)), 10);
        assert!(store.state.orders.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_is_per_user() {
        let bob = UserId::new(2);
        let mut store = store_with(
            vec![product(1, dec!(3.00), 10)],
            vec![cart_row(ALICE, 1, 2), cart_row(bob, 1, 4)],
        );

        let receipt = store.checkout(ALICE).await.expect("checkout succeeds");

        assert_eq!(receipt.order.user_id, ALICE);
        assert_eq!(store.stock_of(ProductId::new(1)), 8);
        // Bob's cart survives Alice's checkout.
        assert_eq!(store.state.cart, vec![cart_row(bob, 1, 4)]);
    }

    #[tokio::test]
    async fn test_mutation_time_stock_conflict_aborts() {
        /// Store whose validation read over-reports stock, forcing the
        /// conditional deduction to fail: models a concurrent checkout
        /// winning the last units between the read and the write.
        #[derive(Debug, Clone)]
        struct RacedState(MemoryState);

        impl CheckoutStore for RacedState {
            async fn cart_rows(
                &mut self,
                user_id: UserId,
            ) -> Result<Vec<CartRow>, RepositoryError> {
                self.0.cart_rows(user_id).await
            }

            async fn product(
                &mut self,
                product_id: ProductId,
            ) -> Result<Option<Product>, RepositoryError> {
                Ok(self.0.products.get(&product_id).cloned().map(|mut p| {
                    p.stock += 100;
                    p
                }))
            }

            async fn insert_order(&mut self, user_id: UserId) -> Result<Order, RepositoryError> {
                self.0.insert_order(user_id).await
            }

            async fn insert_order_item(
                &mut self,
                order_id: OrderId,
                line: &OrderLine,
            ) -> Result<OrderItem, RepositoryError> {
                self.0.insert_order_item(order_id, line).await
            }

            async fn deduct_stock(
                &mut self,
                product_id: ProductId,
                quantity: i32,
            ) -> Result<bool, RepositoryError> {
                self.0.deduct_stock(product_id, quantity).await
            }

            async fn clear_cart(&mut self, user_id: UserId) -> Result<(), RepositoryError> {
                self.0.clear_cart(user_id).await
            }
        }

        let committed = store_with(
            vec![product(1, dec!(1.00), 1)],
            vec![cart_row(ALICE, 1, 3)],
        );
        let mut staged = RacedState(committed.state.clone());

        let err = run(&mut staged, ALICE).await.unwrap_err();
        assert!(matches!(err, CheckoutError::InsufficientStock { .. }));
        // The staged mutations are discarded, committed state never saw them.
        assert_eq!(committed.stock_of(ProductId::new(1)), 1);
        assert!(committed.state.orders.is_empty());
    }
}
