use super::*;

#[test]
fn failing_line_aborts_the_whole_order() {
    let engine = test_engine();
    let customer = seed_customer(&engine, "ana@example.com");
    let p1 = seed_product(&engine, "Keyboard", 2500, 10);
    let p2 = seed_product(&engine, "Monitor", 15000, 1);

    // p1 would fit, p2 does not; nothing may be allocated.
    let err = engine
        .create_order(
            &employee(),
            order_for(&customer, vec![line(&p1, 4), line(&p2, 3)]),
        )
        .unwrap_err();

    assert!(matches!(err, EngineError::InsufficientStock { .. }));
    assert_eq!(stock_of(&engine, p1.id), 10);
    assert_eq!(stock_of(&engine, p2.id), 1);
}

#[test]
fn failing_edit_keeps_previous_lines_and_stock() {
    let engine = test_engine();
    let customer = seed_customer(&engine, "ana@example.com");
    let p1 = seed_product(&engine, "Keyboard", 2500, 10);
    let p2 = seed_product(&engine, "Monitor", 15000, 2);

    let order = engine
        .create_order(&employee(), order_for(&customer, vec![line(&p1, 2)]))
        .unwrap();

    let err = engine
        .update_order(
            &employee(),
            order.id,
            replace_lines(vec![line(&p1, 8), line(&p2, 5)]),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock { .. }));

    // order and stock exactly as before the attempt
    let stored = engine.store().order(order.id).unwrap().unwrap();
    assert_eq!(stored.items, order.items);
    assert_eq!(stored.total, order.total);
    assert_eq!(stock_of(&engine, p1.id), 8);
    assert_eq!(stock_of(&engine, p2.id), 2);
}

#[test]
fn mixed_delta_edit_applies_both_directions() {
    let engine = test_engine();
    let customer = seed_customer(&engine, "ana@example.com");
    let p1 = seed_product(&engine, "Keyboard", 2500, 10);
    let p2 = seed_product(&engine, "Monitor", 15000, 10);

    let order = engine
        .create_order(
            &employee(),
            order_for(&customer, vec![line(&p1, 6), line(&p2, 2)]),
        )
        .unwrap();
    assert_eq!(stock_of(&engine, p1.id), 4);
    assert_eq!(stock_of(&engine, p2.id), 8);

    // p1 shrinks by 4, p2 grows by 5
    let updated = engine
        .update_order(
            &employee(),
            order.id,
            replace_lines(vec![line(&p1, 2), line(&p2, 7)]),
        )
        .unwrap();

    assert_eq!(stock_of(&engine, p1.id), 8);
    assert_eq!(stock_of(&engine, p2.id), 3);
    assert_eq!(updated.total, dec(2 * 2500 + 7 * 15000));
}

#[test]
fn edit_round_trip_is_stock_neutral() {
    let engine = test_engine();
    let customer = seed_customer(&engine, "ana@example.com");
    let p1 = seed_product(&engine, "Keyboard", 2500, 10);
    let p2 = seed_product(&engine, "Monitor", 15000, 10);

    let order = engine
        .create_order(
            &employee(),
            order_for(&customer, vec![line(&p1, 3), line(&p2, 2)]),
        )
        .unwrap();
    let p1_after_create = stock_of(&engine, p1.id);
    let p2_after_create = stock_of(&engine, p2.id);

    // wander around and come back to the original line set
    let edits = vec![
        vec![line(&p1, 1)],
        vec![line(&p1, 5), line(&p2, 4)],
        vec![line(&p2, 1)],
        vec![line(&p1, 3), line(&p2, 2)],
    ];
    for lines in edits {
        engine
            .update_order(&employee(), order.id, replace_lines(lines))
            .unwrap();
    }

    assert_eq!(stock_of(&engine, p1.id), p1_after_create);
    assert_eq!(stock_of(&engine, p2.id), p2_after_create);
}

#[test]
fn delete_restores_stock_and_removes_the_order() {
    let engine = test_engine();
    let customer = seed_customer(&engine, "ana@example.com");
    let p1 = seed_product(&engine, "Keyboard", 2500, 10);

    let order = engine
        .create_order(&employee(), order_for(&customer, vec![line(&p1, 4)]))
        .unwrap();
    assert_eq!(stock_of(&engine, p1.id), 6);

    engine.delete_order(&admin(), order.id).unwrap();

    assert_eq!(stock_of(&engine, p1.id), 10);
    assert!(engine.store().order(order.id).unwrap().is_none());
}

#[test]
fn delete_requires_admin() {
    let engine = test_engine();
    let customer = seed_customer(&engine, "ana@example.com");
    let p1 = seed_product(&engine, "Keyboard", 2500, 10);

    let order = engine
        .create_order(&employee(), order_for(&customer, vec![line(&p1, 4)]))
        .unwrap();

    let err = engine.delete_order(&employee(), order.id).unwrap_err();
    assert!(matches!(err, EngineError::NotAuthorized));
    assert!(engine.store().order(order.id).unwrap().is_some());
}

#[test]
fn cancelled_lines_do_not_block_reordering() {
    let engine = test_engine();
    let customer = seed_customer(&engine, "ana@example.com");
    let p1 = seed_product(&engine, "Keyboard", 2500, 5);

    let first = engine
        .create_order(&employee(), order_for(&customer, vec![line(&p1, 5)]))
        .unwrap();
    engine.cancel_order(&employee(), first.id).unwrap();

    // all five units are available again
    engine
        .create_order(&employee(), order_for(&customer, vec![line(&p1, 5)]))
        .unwrap();
    assert_eq!(stock_of(&engine, p1.id), 0);
}

#[test]
fn totals_follow_price_rounding() {
    let engine = test_engine();
    let customer = seed_customer(&engine, "ana@example.com");
    // 3 × 0.35 = 1.05; exercises the 2-decimal rounding path
    let p1 = seed_product(&engine, "Sticker Pack", 35, 10);

    let order = engine
        .create_order(&employee(), order_for(&customer, vec![line(&p1, 3)]))
        .unwrap();

    assert_eq!(order.total, dec(105));
}
