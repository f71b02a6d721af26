//! Macro-generated conformance suite for the store traits.
//!
//! # Usage
//!
//! ```rust,ignore
//! store_contract_tests!(Storage::in_memory());
//! ```
//!
//! # Generated Tests
//!
//! ## Orders
//! - `test_order_insert_and_get`, `test_order_get_nonexistent`
//! - `test_find_by_user_newest_first`: only the user's orders, by `orderDate` desc
//! - `test_field_writes_on_missing_order`
//! - `test_set_status_compares_stored_status`
//! - `test_mark_paid_and_set_status_touch_only_their_fields`
//! - `test_order_delete_is_idempotent`
//!
//! ## Products
//! - `test_find_many_skips_missing`
//! - `test_reserve_all_or_nothing`, `test_reserve_accumulates_duplicates`,
//!   `test_reserve_missing_product_is_short`
//! - `test_restock_adds_and_skips_missing`
//! - `test_concurrent_reserve_never_oversells`
//!
//! ## Carts and contact messages
//! - `test_cart_delete_reports_removal`
//! - `test_contact_messages_newest_first`

/// Generate the store conformance suite.
///
/// `$factory` must evaluate to a fresh, empty `Storage`. It is re-evaluated
/// for each test.
#[macro_export]
macro_rules! store_contract_tests {
    ($factory:expr) => {
        mod store_contract_tests {
            use super::*;
            use storefront::core::service::{StatusChange, StockCheck, StockDelta};
            use storefront::core::status::{OrderStatus, PaymentStatus};
            use storefront::entities::{ContactMessage, NewContactMessage};
            use uuid::Uuid;

            // ==================================================================
            // Orders
            // ==================================================================

            #[tokio::test]
            async fn test_order_insert_and_get() {
                let storage = $factory;
                let order = order_placed("alice", vec![line(Uuid::new_v4(), 2)], 0);

                storage.orders.insert(order.clone()).await.unwrap();
                let fetched = storage.orders.get(&order.id).await.unwrap().unwrap();

                assert_eq!(fetched, order);
            }

            #[tokio::test]
            async fn test_order_get_nonexistent() {
                let storage = $factory;
                assert!(storage.orders.get(&Uuid::new_v4()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_find_by_user_newest_first() {
                let storage = $factory;
                let t1 = order_placed("alice", vec![line(Uuid::new_v4(), 1)], 30);
                let t3 = order_placed("alice", vec![line(Uuid::new_v4(), 1)], 10);
                let t2 = order_placed("alice", vec![line(Uuid::new_v4(), 1)], 20);
                let other = order_placed("bob", vec![line(Uuid::new_v4(), 1)], 5);
                for order in [&t1, &t3, &t2, &other] {
                    storage.orders.insert(order.clone()).await.unwrap();
                }

                let ids: Vec<Uuid> = storage
                    .orders
                    .find_by_user("alice")
                    .await
                    .unwrap()
                    .iter()
                    .map(|o| o.id)
                    .collect();

                assert_eq!(ids, vec![t3.id, t2.id, t1.id]);
                assert!(storage.orders.find_by_user("carol").await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_field_writes_on_missing_order() {
                let storage = $factory;
                let id = Uuid::new_v4();

                assert!(storage.orders.mark_paid(&id).await.unwrap().is_none());
                let change = StatusChange::to(OrderStatus::Confirmed);
                assert!(storage.orders.set_status(&id, change).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_set_status_compares_stored_status() {
                let storage = $factory;
                let order = order_placed("alice", vec![line(Uuid::new_v4(), 1)], 0);
                storage.orders.insert(order.clone()).await.unwrap();

                let lost = storage
                    .orders
                    .set_status(
                        &order.id,
                        StatusChange::to(OrderStatus::Canceled).when(OrderStatus::Confirmed),
                    )
                    .await
                    .unwrap();
                assert!(lost.is_none());
                let stored = storage.orders.get(&order.id).await.unwrap().unwrap();
                assert_eq!(stored, order);

                let won = storage
                    .orders
                    .set_status(
                        &order.id,
                        StatusChange::to(OrderStatus::Canceled).when(OrderStatus::Pending),
                    )
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(won.order_status, OrderStatus::Canceled);
                assert_eq!(won.order_update_date, order.order_update_date);
                let stored = storage.orders.get(&order.id).await.unwrap().unwrap();
                assert_eq!(stored, won);
            }

            #[tokio::test]
            async fn test_mark_paid_and_set_status_touch_only_their_fields() {
                let storage = $factory;
                let order = order_placed("alice", vec![line(Uuid::new_v4(), 3)], 10);
                storage.orders.insert(order.clone()).await.unwrap();

                let paid = storage.orders.mark_paid(&order.id).await.unwrap().unwrap();
                assert_eq!(paid.payment_status, PaymentStatus::Paid);
                assert_eq!(paid.order_status, OrderStatus::Confirmed);
                assert_eq!(paid.order_update_date, order.order_update_date);

                let now = chrono::Utc::now();
                let shipped = storage
                    .orders
                    .set_status(&order.id, StatusChange::to(OrderStatus::InShipping).touched(now))
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(shipped.order_status, OrderStatus::InShipping);
                assert_eq!(shipped.payment_status, PaymentStatus::Paid);
                assert_eq!(shipped.order_update_date, now);

                let mut expected = order.clone();
                expected.payment_status = PaymentStatus::Paid;
                expected.order_status = OrderStatus::InShipping;
                expected.order_update_date = now;
                assert_eq!(storage.orders.get(&order.id).await.unwrap().unwrap(), expected);
            }

            #[tokio::test]
            async fn test_order_delete_is_idempotent() {
                let storage = $factory;
                let order = order_placed("alice", vec![line(Uuid::new_v4(), 1)], 0);
                storage.orders.insert(order.clone()).await.unwrap();

                storage.orders.delete(&order.id).await.unwrap();
                storage.orders.delete(&order.id).await.unwrap();

                assert!(storage.orders.get(&order.id).await.unwrap().is_none());
            }

            // ==================================================================
            // Products
            // ==================================================================

            #[tokio::test]
            async fn test_find_many_skips_missing() {
                let storage = $factory;
                let lamp = seed_product(&storage, "Lamp", 3).await;
                let desk = seed_product(&storage, "Desk", 1).await;
                seed_product(&storage, "Chair", 8).await;

                let mut found: Vec<Uuid> = storage
                    .products
                    .find_many(&[lamp.id, desk.id, Uuid::new_v4()])
                    .await
                    .unwrap()
                    .iter()
                    .map(|p| p.id)
                    .collect();
                found.sort();
                let mut expected = vec![lamp.id, desk.id];
                expected.sort();

                assert_eq!(found, expected);
                assert_eq!(storage.products.list().await.unwrap().len(), 3);
            }

            #[tokio::test]
            async fn test_reserve_all_or_nothing() {
                let storage = $factory;
                let lamp = seed_product(&storage, "Lamp", 5).await;
                let desk = seed_product(&storage, "Desk", 1).await;

                let check = storage
                    .products
                    .reserve(&[StockDelta::new(lamp.id, 2), StockDelta::new(desk.id, 3)])
                    .await
                    .unwrap();

                assert_eq!(
                    check,
                    StockCheck::Short {
                        product_id: desk.id,
                        available: 1,
                        requested: 3
                    }
                );
                assert_eq!(stock_of(&storage, lamp.id).await, 5);
                assert_eq!(stock_of(&storage, desk.id).await, 1);

                let check = storage
                    .products
                    .reserve(&[StockDelta::new(lamp.id, 2), StockDelta::new(desk.id, 1)])
                    .await
                    .unwrap();
                assert_eq!(check, StockCheck::Reserved);
                assert_eq!(stock_of(&storage, lamp.id).await, 3);
                assert_eq!(stock_of(&storage, desk.id).await, 0);
            }

            #[tokio::test]
            async fn test_reserve_accumulates_duplicates() {
                let storage = $factory;
                let lamp = seed_product(&storage, "Lamp", 4).await;

                let short = storage
                    .products
                    .reserve(&[StockDelta::new(lamp.id, 3), StockDelta::new(lamp.id, 2)])
                    .await
                    .unwrap();
                assert!(matches!(short, StockCheck::Short { requested: 5, .. }));
                assert_eq!(stock_of(&storage, lamp.id).await, 4);

                let reserved = storage
                    .products
                    .reserve(&[StockDelta::new(lamp.id, 3), StockDelta::new(lamp.id, 1)])
                    .await
                    .unwrap();
                assert_eq!(reserved, StockCheck::Reserved);
                assert_eq!(stock_of(&storage, lamp.id).await, 0);
            }

            #[tokio::test]
            async fn test_reserve_missing_product_is_short() {
                let storage = $factory;
                let lamp = seed_product(&storage, "Lamp", 4).await;
                let ghost = Uuid::new_v4();

                let check = storage
                    .products
                    .reserve(&[StockDelta::new(lamp.id, 1), StockDelta::new(ghost, 1)])
                    .await
                    .unwrap();

                assert_eq!(
                    check,
                    StockCheck::Short {
                        product_id: ghost,
                        available: 0,
                        requested: 1
                    }
                );
                assert_eq!(stock_of(&storage, lamp.id).await, 4);
            }

            #[tokio::test]
            async fn test_restock_adds_and_skips_missing() {
                let storage = $factory;
                let lamp = seed_product(&storage, "Lamp", 0).await;

                storage
                    .products
                    .restock(&[
                        StockDelta::new(lamp.id, 2),
                        StockDelta::new(Uuid::new_v4(), 5),
                        StockDelta::new(lamp.id, 1),
                    ])
                    .await
                    .unwrap();

                assert_eq!(stock_of(&storage, lamp.id).await, 3);
                assert_eq!(storage.products.list().await.unwrap().len(), 1);
            }

            #[tokio::test]
            async fn test_concurrent_reserve_never_oversells() {
                let storage = $factory;
                let lamp = seed_product(&storage, "Lamp", 10).await;

                let attempts = (0..25).map(|_| {
                    let products = storage.products.clone();
                    let id = lamp.id;
                    tokio::spawn(async move {
                        products.reserve(&[StockDelta::new(id, 1)]).await.unwrap()
                    })
                });
                let results = futures::future::join_all(attempts).await;

                let reserved = results
                    .into_iter()
                    .filter(|r| *r.as_ref().unwrap() == StockCheck::Reserved)
                    .count();

                assert_eq!(reserved, 10);
                assert_eq!(stock_of(&storage, lamp.id).await, 0);
            }

            // ==================================================================
            // Carts and contact messages
            // ==================================================================

            #[tokio::test]
            async fn test_cart_delete_reports_removal() {
                let storage = $factory;
                let cart = seed_cart(&storage, "alice").await;

                assert!(storage.carts.get(&cart.id).await.unwrap().is_some());
                assert!(storage.carts.delete(&cart.id).await.unwrap());
                assert!(!storage.carts.delete(&cart.id).await.unwrap());
                assert!(storage.carts.get(&cart.id).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_contact_messages_newest_first() {
                let storage = $factory;
                let mut older = ContactMessage::new(NewContactMessage {
                    name: "Ann".to_string(),
                    email: "ann@example.com".to_string(),
                    message: "First".to_string(),
                });
                older.created_at = older.created_at - chrono::Duration::minutes(5);
                let newer = ContactMessage::new(NewContactMessage {
                    name: "Ben".to_string(),
                    email: "ben@example.com".to_string(),
                    message: "Second".to_string(),
                });
                storage.contacts.insert(older.clone()).await.unwrap();
                storage.contacts.insert(newer.clone()).await.unwrap();

                let listed: Vec<Uuid> = storage
                    .contacts
                    .list()
                    .await
                    .unwrap()
                    .iter()
                    .map(|m| m.id)
                    .collect();

                assert_eq!(listed, vec![newer.id, older.id]);
            }
        }
    };
}
