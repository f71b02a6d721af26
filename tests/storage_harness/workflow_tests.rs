//! Macro-generated behaviour suite for `OrderWorkflow`.
//!
//! Runs the order workflow against a backend's stores and checks the
//! bookkeeping the storefront relies on: carts cleared at checkout, stock
//! given back on cancel, stock taken on delivery and nowhere else. A payment
//! capture landing between a read and a status write is never lost.
//!
//! # Usage
//!
//! ```rust,ignore
//! order_workflow_tests!(Storage::in_memory());
//! ```

/// Generate the order workflow suite.
///
/// `$factory` must evaluate to a fresh, empty `Storage`.
#[macro_export]
macro_rules! order_workflow_tests {
    ($factory:expr) => {
        mod order_workflow_tests {
            use super::*;
            use storefront::core::error::{EntityError, OrderError, StorefrontError};
            use storefront::core::status::{OrderStatus, PaymentStatus};
            use uuid::Uuid;

            // ==================================================================
            // createOrder
            // ==================================================================

            #[tokio::test]
            async fn test_create_order_clears_cart() {
                let storage = $factory;
                let flow = workflow(&storage);
                let lamp = seed_product(&storage, "Lamp", 5).await;
                let cart = seed_cart(&storage, "alice").await;

                let order = flow
                    .create_order(checkout("alice", cart.id, vec![line(lamp.id, 2)]))
                    .await
                    .unwrap();

                assert_eq!(order.order_status, OrderStatus::Pending);
                assert_eq!(order.payment_status, PaymentStatus::Pending);
                assert_eq!(order.payment_method, "COD");
                assert_eq!(order.order_date, order.order_update_date);
                assert!(storage.carts.get(&cart.id).await.unwrap().is_none());
                assert_eq!(storage.orders.find_by_user("alice").await.unwrap().len(), 1);
                assert_eq!(stock_of(&storage, lamp.id).await, 5);
            }

            #[tokio::test]
            async fn test_create_order_without_cart() {
                let storage = $factory;
                let flow = workflow(&storage);

                flow.create_order(checkout("alice", Uuid::new_v4(), vec![line(Uuid::new_v4(), 1)]))
                    .await
                    .unwrap();
                flow.create_order(checkout("alice", Uuid::new_v4(), vec![line(Uuid::new_v4(), 1)]))
                    .await
                    .unwrap();

                assert_eq!(storage.orders.find_by_user("alice").await.unwrap().len(), 2);
            }

            // ==================================================================
            // capturePayment / getOrderDetails / getAllOrdersByUser
            // ==================================================================

            #[tokio::test]
            async fn test_capture_payment_confirms_order() {
                let storage = $factory;
                let flow = workflow(&storage);
                let order = flow
                    .create_order(checkout("alice", Uuid::new_v4(), vec![line(Uuid::new_v4(), 1)]))
                    .await
                    .unwrap();

                let captured = flow.capture_payment(order.id).await.unwrap();
                assert_eq!(captured.payment_status, PaymentStatus::Paid);
                assert_eq!(captured.order_status, OrderStatus::Confirmed);
                assert_eq!(captured.order_update_date, order.order_update_date);

                let again = flow.capture_payment(order.id).await.unwrap();
                assert_eq!(again, captured);
                assert_eq!(flow.order_details(order.id).await.unwrap(), captured);
            }

            #[tokio::test]
            async fn test_missing_order_is_not_found() {
                let storage = $factory;
                let flow = workflow(&storage);
                let id = Uuid::new_v4();

                for result in [
                    flow.capture_payment(id).await,
                    flow.order_details(id).await,
                    flow.cancel_order(id).await,
                    flow.update_status(id, OrderStatus::Delivered).await,
                ] {
                    let err = result.unwrap_err();
                    assert!(matches!(err, StorefrontError::Entity(EntityError::NotFound { .. })));
                    assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
                }
            }

            #[tokio::test]
            async fn test_orders_for_user_newest_first() {
                let storage = $factory;
                let flow = workflow(&storage);
                let t1 = order_placed("alice", vec![line(Uuid::new_v4(), 1)], 3);
                let t2 = order_placed("alice", vec![line(Uuid::new_v4(), 1)], 2);
                let t3 = order_placed("alice", vec![line(Uuid::new_v4(), 1)], 1);
                for order in [&t2, &t1, &t3] {
                    storage.orders.insert(order.clone()).await.unwrap();
                }

                let ids: Vec<Uuid> = flow
                    .orders_for_user("alice")
                    .await
                    .unwrap()
                    .iter()
                    .map(|o| o.id)
                    .collect();

                assert_eq!(ids, vec![t3.id, t2.id, t1.id]);
            }

            // ==================================================================
            // cancelOrder
            // ==================================================================

            #[tokio::test]
            async fn test_cancel_restores_stock_then_refuses_second_cancel() {
                let storage = $factory;
                let flow = workflow(&storage);
                let p1 = seed_product(&storage, "P1", 5).await;
                let order = flow
                    .create_order(checkout("alice", Uuid::new_v4(), vec![line(p1.id, 2)]))
                    .await
                    .unwrap();

                let canceled = flow.cancel_order(order.id).await.unwrap();
                assert_eq!(canceled.order_status, OrderStatus::Canceled);
                assert_eq!(stock_of(&storage, p1.id).await, 7);
                let stored = storage.orders.get(&order.id).await.unwrap().unwrap();
                assert_eq!(stored.order_status, OrderStatus::Canceled);

                let err = flow.cancel_order(order.id).await.unwrap_err();
                assert!(matches!(err, StorefrontError::Order(OrderError::InvalidState { .. })));
                assert_eq!(stock_of(&storage, p1.id).await, 7);
            }

            #[tokio::test]
            async fn test_cancel_restores_duplicates_summed() {
                let storage = $factory;
                let flow = workflow(&storage);
                let lamp = seed_product(&storage, "Lamp", 1).await;
                let desk = seed_product(&storage, "Desk", 0).await;
                let order = flow
                    .create_order(checkout(
                        "alice",
                        Uuid::new_v4(),
                        vec![line(lamp.id, 2), line(desk.id, 1), line(lamp.id, 3)],
                    ))
                    .await
                    .unwrap();

                flow.cancel_order(order.id).await.unwrap();

                assert_eq!(stock_of(&storage, lamp.id).await, 6);
                assert_eq!(stock_of(&storage, desk.id).await, 1);
            }

            #[tokio::test]
            async fn test_cancel_only_pending_unpaid() {
                let storage = $factory;
                let flow = workflow(&storage);
                let lamp = seed_product(&storage, "Lamp", 5).await;

                for status in OrderStatus::ALL {
                    for payment in [PaymentStatus::Pending, PaymentStatus::Paid] {
                        let order = flow
                            .create_order(checkout("alice", Uuid::new_v4(), vec![line(lamp.id, 1)]))
                            .await
                            .unwrap();
                        let before = force_state(&storage, order.id, status, payment).await;
                        let stock_before = stock_of(&storage, lamp.id).await;

                        let result = flow.cancel_order(order.id).await;

                        if status == OrderStatus::Pending && payment == PaymentStatus::Pending {
                            assert_eq!(result.unwrap().order_status, OrderStatus::Canceled);
                            assert_eq!(stock_of(&storage, lamp.id).await, stock_before + 1);
                        } else {
                            let err = result.unwrap_err();
                            assert_eq!(err.error_code(), "ORDER_INVALID_STATE");
                            assert_eq!(stock_of(&storage, lamp.id).await, stock_before);
                            let after = storage.orders.get(&order.id).await.unwrap().unwrap();
                            assert_eq!(after, before);
                        }
                    }
                }
            }

            // ==================================================================
            // updateOrderStatus
            // ==================================================================

            #[tokio::test]
            async fn test_delivery_deducts_stock_summed_over_duplicates() {
                let storage = $factory;
                let flow = workflow(&storage);
                let lamp = seed_product(&storage, "Lamp", 10).await;
                let desk = seed_product(&storage, "Desk", 2).await;
                let order = flow
                    .create_order(checkout(
                        "alice",
                        Uuid::new_v4(),
                        vec![line(lamp.id, 3), line(desk.id, 2), line(lamp.id, 4)],
                    ))
                    .await
                    .unwrap();
                flow.capture_payment(order.id).await.unwrap();

                let delivered = flow
                    .update_status(order.id, OrderStatus::Delivered)
                    .await
                    .unwrap();

                assert_eq!(delivered.order_status, OrderStatus::Delivered);
                assert!(delivered.order_update_date >= order.order_update_date);
                assert_eq!(stock_of(&storage, lamp.id).await, 3);
                assert_eq!(stock_of(&storage, desk.id).await, 0);
                let stored = storage.orders.get(&order.id).await.unwrap().unwrap();
                assert_eq!(stored.order_status, OrderStatus::Delivered);
            }

            #[tokio::test]
            async fn test_delivery_short_mutates_nothing() {
                let storage = $factory;
                let flow = workflow(&storage);
                let lamp = seed_product(&storage, "Lamp", 10).await;
                let desk = seed_product(&storage, "Desk", 1).await;
                let order = flow
                    .create_order(checkout(
                        "alice",
                        Uuid::new_v4(),
                        vec![line(lamp.id, 3), line(desk.id, 2)],
                    ))
                    .await
                    .unwrap();
                let before = flow.capture_payment(order.id).await.unwrap();

                let err = flow
                    .update_status(order.id, OrderStatus::Delivered)
                    .await
                    .unwrap_err();

                match err {
                    StorefrontError::Order(OrderError::InsufficientStock {
                        product_id,
                        available,
                        requested,
                        ..
                    }) => {
                        assert_eq!(product_id, desk.id);
                        assert_eq!(available, 1);
                        assert_eq!(requested, 2);
                    }
                    other => panic!("expected InsufficientStock, got {:?}", other),
                }
                assert_eq!(stock_of(&storage, lamp.id).await, 10);
                assert_eq!(stock_of(&storage, desk.id).await, 1);
                assert_eq!(storage.orders.get(&order.id).await.unwrap().unwrap(), before);
            }

            #[tokio::test]
            async fn test_delivery_short_on_duplicates_and_missing_products() {
                let storage = $factory;
                let flow = workflow(&storage);
                let lamp = seed_product(&storage, "Lamp", 4).await;

                let duplicated = flow
                    .create_order(checkout(
                        "alice",
                        Uuid::new_v4(),
                        vec![line(lamp.id, 3), line(lamp.id, 2)],
                    ))
                    .await
                    .unwrap();
                let err = flow
                    .update_status(duplicated.id, OrderStatus::Delivered)
                    .await
                    .unwrap_err();
                assert_eq!(err.error_code(), "INSUFFICIENT_STOCK");

                let ghost = flow
                    .create_order(checkout("alice", Uuid::new_v4(), vec![line(Uuid::new_v4(), 1)]))
                    .await
                    .unwrap();
                let err = flow
                    .update_status(ghost.id, OrderStatus::Delivered)
                    .await
                    .unwrap_err();
                assert_eq!(err.error_code(), "INSUFFICIENT_STOCK");

                assert_eq!(stock_of(&storage, lamp.id).await, 4);
            }

            #[tokio::test]
            async fn test_redelivery_and_leaving_delivered_keep_stock() {
                let storage = $factory;
                let flow = workflow(&storage);
                let lamp = seed_product(&storage, "Lamp", 5).await;
                let order = flow
                    .create_order(checkout("alice", Uuid::new_v4(), vec![line(lamp.id, 2)]))
                    .await
                    .unwrap();

                flow.update_status(order.id, OrderStatus::Delivered).await.unwrap();
                assert_eq!(stock_of(&storage, lamp.id).await, 3);

                flow.update_status(order.id, OrderStatus::Delivered).await.unwrap();
                assert_eq!(stock_of(&storage, lamp.id).await, 3);

                let back = flow
                    .update_status(order.id, OrderStatus::Confirmed)
                    .await
                    .unwrap();
                assert_eq!(back.order_status, OrderStatus::Confirmed);
                assert_eq!(stock_of(&storage, lamp.id).await, 3);
            }

            #[tokio::test]
            async fn test_other_transitions_never_touch_stock() {
                let storage = $factory;
                let flow = workflow(&storage);
                let empty = seed_product(&storage, "Empty", 0).await;
                let negative = seed_product(&storage, "Oversold", -2).await;
                let order = flow
                    .create_order(checkout(
                        "alice",
                        Uuid::new_v4(),
                        vec![line(empty.id, 4), line(negative.id, 1)],
                    ))
                    .await
                    .unwrap();

                for status in OrderStatus::ALL
                    .into_iter()
                    .filter(|s| *s != OrderStatus::Delivered)
                {
                    let updated = flow.update_status(order.id, status).await.unwrap();
                    assert_eq!(updated.order_status, status);
                    assert_eq!(stock_of(&storage, empty.id).await, 0);
                    assert_eq!(stock_of(&storage, negative.id).await, -2);
                }
            }

            #[tokio::test]
            async fn test_concurrent_deliveries_never_oversell() {
                let storage = $factory;
                let flow = std::sync::Arc::new(workflow(&storage));
                let lamp = seed_product(&storage, "Lamp", 6).await;

                let mut ids = Vec::new();
                for _ in 0..8 {
                    let order = flow
                        .create_order(checkout("alice", Uuid::new_v4(), vec![line(lamp.id, 2)]))
                        .await
                        .unwrap();
                    ids.push(order.id);
                }

                let deliveries = ids.into_iter().map(|id| {
                    let flow = flow.clone();
                    tokio::spawn(async move { flow.update_status(id, OrderStatus::Delivered).await })
                });
                let results = futures::future::join_all(deliveries).await;

                let delivered = results
                    .into_iter()
                    .map(|joined| joined.unwrap())
                    .filter(|result| result.is_ok())
                    .count();

                assert_eq!(delivered, 3);
                assert_eq!(stock_of(&storage, lamp.id).await, 0);
            }

            // ==================================================================
            // Captures landing between read and write
            // ==================================================================

            #[tokio::test]
            async fn test_status_update_keeps_concurrent_capture() {
                let storage = $factory;
                let order = workflow(&storage)
                    .create_order(checkout("alice", Uuid::new_v4(), vec![line(Uuid::new_v4(), 1)]))
                    .await
                    .unwrap();
                let flow = workflow_with_orders(&storage, CaptureAfterRead::wrap(&storage));

                let shipped = flow.update_status(order.id, OrderStatus::InShipping).await.unwrap();
                assert_eq!(shipped.order_status, OrderStatus::InShipping);
                assert_eq!(shipped.payment_status, PaymentStatus::Paid);

                let stored = storage.orders.get(&order.id).await.unwrap().unwrap();
                assert_eq!(stored.order_status, OrderStatus::InShipping);
                assert_eq!(stored.payment_status, PaymentStatus::Paid);
                assert_eq!(stored.cart_items, order.cart_items);
                assert!(stored.order_update_date >= order.order_update_date);
            }

            #[tokio::test]
            async fn test_delivery_after_concurrent_capture_conflicts() {
                let storage = $factory;
                let lamp = seed_product(&storage, "Lamp", 5).await;
                let order = workflow(&storage)
                    .create_order(checkout("alice", Uuid::new_v4(), vec![line(lamp.id, 2)]))
                    .await
                    .unwrap();
                let flow = workflow_with_orders(&storage, CaptureAfterRead::wrap(&storage));

                let err = flow
                    .update_status(order.id, OrderStatus::Delivered)
                    .await
                    .unwrap_err();
                assert!(matches!(err, StorefrontError::Order(OrderError::Conflict { .. })));
                assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);

                assert_eq!(stock_of(&storage, lamp.id).await, 5);
                let stored = storage.orders.get(&order.id).await.unwrap().unwrap();
                assert_eq!(stored.order_status, OrderStatus::Confirmed);
                assert_eq!(stored.payment_status, PaymentStatus::Paid);
            }

            #[tokio::test]
            async fn test_cancel_after_concurrent_capture_conflicts() {
                let storage = $factory;
                let lamp = seed_product(&storage, "Lamp", 5).await;
                let order = workflow(&storage)
                    .create_order(checkout("alice", Uuid::new_v4(), vec![line(lamp.id, 2)]))
                    .await
                    .unwrap();
                let flow = workflow_with_orders(&storage, CaptureAfterRead::wrap(&storage));

                let err = flow.cancel_order(order.id).await.unwrap_err();
                assert!(matches!(err, StorefrontError::Order(OrderError::Conflict { .. })));

                assert_eq!(stock_of(&storage, lamp.id).await, 5);
                let stored = storage.orders.get(&order.id).await.unwrap().unwrap();
                assert_eq!(stored.order_status, OrderStatus::Confirmed);
                assert_eq!(stored.payment_status, PaymentStatus::Paid);
            }
        }
    };
}
