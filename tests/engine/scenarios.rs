//! End-to-end match-and-fire scenarios.

use std::cell::RefCell;
use std::rc::Rc;

use drover_engine::{ConstraintOp, Pattern, Rule};
use drover_foundation::Value;

use crate::common::fixture;

/// A single-pattern filter fires exactly once on a matching fact.
#[test]
fn single_pattern_filter() {
    let mut fx = fixture();
    let fired: Rc<RefCell<Vec<String>>> = Rc::default();

    let log = Rc::clone(&fired);
    fx.engine
        .register_rule(
            Rule::new("tachycardia")
                .with_salience(100)
                .with_pattern(
                    Pattern::new(fx.patient).with_test(fx.heartbeat, ConstraintOp::Gt, 120i64),
                )
                .with_action(move |_, facts| {
                    log.borrow_mut()
                        .push(facts[0].field(0).as_str().unwrap().to_string());
                    Ok(())
                }),
        )
        .unwrap();

    fx.engine.declare(fx.patient("A", 145)).unwrap();

    let fires = fx.engine.run(None).unwrap();
    assert_eq!(fires, 1);
    assert_eq!(*fired.borrow(), vec!["A".to_string()]);
}

/// A fact that fails the filter produces no activation.
#[test]
fn filter_rejects_non_matching_fact() {
    let mut fx = fixture();
    fx.engine
        .register_rule(Rule::new("tachycardia").with_pattern(
            Pattern::new(fx.patient).with_test(fx.heartbeat, ConstraintOp::Gt, 120i64),
        ))
        .unwrap();

    fx.engine.declare(fx.patient("B", 80)).unwrap();
    assert_eq!(fx.engine.agenda_len(), 0);
    assert_eq!(fx.engine.run(None).unwrap(), 0);
}

/// Higher salience fires first, across rules.
#[test]
fn salience_orders_firing() {
    let mut fx = fixture();
    let fired: Rc<RefCell<Vec<&'static str>>> = Rc::default();

    let log = Rc::clone(&fired);
    fx.engine
        .register_rule(
            Rule::new("urgent")
                .with_salience(100)
                .with_pattern(
                    Pattern::new(fx.patient).with_test(fx.heartbeat, ConstraintOp::Gt, 120i64),
                )
                .with_action(move |_, _| {
                    log.borrow_mut().push("urgent");
                    Ok(())
                }),
        )
        .unwrap();

    let log = Rc::clone(&fired);
    fx.engine
        .register_rule(
            Rule::new("routine")
                .with_salience(10)
                .with_pattern(
                    Pattern::new(fx.patient).with_test(fx.heartbeat, ConstraintOp::Le, 120i64),
                )
                .with_action(move |_, _| {
                    log.borrow_mut().push("routine");
                    Ok(())
                }),
        )
        .unwrap();

    // Declare the routine patient first; salience must still win
    fx.engine.declare(fx.patient("calm", 80)).unwrap();
    fx.engine.declare(fx.patient("racing", 145)).unwrap();

    assert_eq!(fx.engine.run(None).unwrap(), 2);
    assert_eq!(*fired.borrow(), vec!["urgent", "routine"]);
}

/// A two-pattern join keyed on a shared binding variable.
#[test]
fn join_with_binding() {
    let mut fx = fixture();
    let fired: Rc<RefCell<Vec<(i64, i64)>>> = Rc::default();

    let log = Rc::clone(&fired);
    fx.engine
        .register_rule(
            Rule::new("vip-large-txn")
                .with_pattern(
                    Pattern::new(fx.client)
                        .with_test(fx.status, ConstraintOp::Eq, "VIP")
                        .with_binding(fx.client_id, "v"),
                )
                .with_pattern(
                    Pattern::new(fx.txn)
                        .with_test(fx.amount, ConstraintOp::Gt, 5000i64)
                        .with_binding(fx.txn_client, "v"),
                )
                .with_action(move |_, facts| {
                    let client = facts[0].field(0).as_int().unwrap();
                    let amount = facts[1].field(1).as_int().unwrap();
                    log.borrow_mut().push((client, amount));
                    Ok(())
                }),
        )
        .unwrap();

    fx.engine.declare(fx.client(1, "VIP")).unwrap();
    fx.engine.declare(fx.client(2, "Common")).unwrap();
    fx.engine.declare(fx.txn(1, 6000)).unwrap();

    assert_eq!(fx.engine.run(None).unwrap(), 1);
    assert_eq!(*fired.borrow(), vec![(1, 6000)]);
}

/// The join completes regardless of declaration order.
#[test]
fn join_matches_on_late_arrival() {
    let mut fx = fixture();

    fx.engine
        .register_rule(
            Rule::new("vip-large-txn")
                .with_pattern(
                    Pattern::new(fx.client)
                        .with_test(fx.status, ConstraintOp::Eq, "VIP")
                        .with_binding(fx.client_id, "v"),
                )
                .with_pattern(
                    Pattern::new(fx.txn)
                        .with_test(fx.amount, ConstraintOp::Gt, 5000i64)
                        .with_binding(fx.txn_client, "v"),
                ),
        )
        .unwrap();

    // Transaction arrives before the client it references
    fx.engine.declare(fx.txn(1, 6000)).unwrap();
    assert_eq!(fx.engine.agenda_len(), 0);

    fx.engine.declare(fx.client(1, "VIP")).unwrap();
    assert_eq!(fx.engine.agenda_len(), 1);
    assert_eq!(fx.engine.run(None).unwrap(), 1);
}

/// Retracting a joined fact before `run` withdraws the activation.
#[test]
fn retraction_withdraws_pending_activation() {
    let mut fx = fixture();

    fx.engine
        .register_rule(
            Rule::new("vip-large-txn")
                .with_pattern(
                    Pattern::new(fx.client)
                        .with_test(fx.status, ConstraintOp::Eq, "VIP")
                        .with_binding(fx.client_id, "v"),
                )
                .with_pattern(
                    Pattern::new(fx.txn)
                        .with_test(fx.amount, ConstraintOp::Gt, 5000i64)
                        .with_binding(fx.txn_client, "v"),
                ),
        )
        .unwrap();

    let vip = fx.engine.declare(fx.client(1, "VIP")).unwrap();
    fx.engine.declare(fx.client(2, "Common")).unwrap();
    fx.engine.declare(fx.txn(1, 6000)).unwrap();
    assert_eq!(fx.engine.agenda_len(), 1);

    fx.engine.retract(vip).unwrap();
    assert_eq!(fx.engine.agenda_len(), 0);
    assert_eq!(fx.engine.run(None).unwrap(), 0);
}

/// Patterns with no shared variables produce the Cartesian product.
#[test]
fn cartesian_join_fires_per_pair() {
    let mut fx = fixture();

    fx.engine
        .register_rule(
            Rule::new("pairs")
                .with_pattern(Pattern::new(fx.marker_a))
                .with_pattern(Pattern::new(fx.marker_b)),
        )
        .unwrap();

    for i in 0..3 {
        fx.engine.declare(fx.marker_a(i)).unwrap();
    }
    for i in 0..4 {
        fx.engine.declare(fx.marker_b(i)).unwrap();
    }

    assert_eq!(fx.engine.agenda_len(), 12);
    assert_eq!(fx.engine.run(None).unwrap(), 12);
}

/// Bag semantics: the same value declared twice matches once per id.
#[test]
fn duplicate_values_match_independently() {
    let mut fx = fixture();

    fx.engine
        .register_rule(Rule::new("tachycardia").with_pattern(
            Pattern::new(fx.patient).with_test(fx.heartbeat, ConstraintOp::Gt, 120i64),
        ))
        .unwrap();

    let first = fx.engine.declare(fx.patient("A", 145)).unwrap();
    let second = fx.engine.declare(fx.patient("A", 145)).unwrap();

    assert_ne!(first, second);
    assert_eq!(fx.engine.run(None).unwrap(), 2);
}

/// Membership constraints match against the literal collection.
#[test]
fn membership_constraint_filters() {
    let mut fx = fixture();

    fx.engine
        .register_rule(Rule::new("priority-client").with_pattern(
            Pattern::new(fx.client).with_membership(
                fx.status,
                vec![Value::from("VIP"), Value::from("GOLD")],
            ),
        ))
        .unwrap();

    fx.engine.declare(fx.client(1, "VIP")).unwrap();
    fx.engine.declare(fx.client(2, "GOLD")).unwrap();
    fx.engine.declare(fx.client(3, "Common")).unwrap();

    assert_eq!(fx.engine.run(None).unwrap(), 2);
}

/// Facts declared by an action are visible to later activations in
/// the same run.
#[test]
fn action_declared_facts_chain_forward() {
    let mut fx = fixture();
    let fired: Rc<RefCell<Vec<&'static str>>> = Rc::default();

    let log = Rc::clone(&fired);
    let marker_b = fx.marker_b(0);
    fx.engine
        .register_rule(
            Rule::new("produce")
                .with_salience(10)
                .with_pattern(Pattern::new(fx.marker_a))
                .with_action(move |engine, _| {
                    log.borrow_mut().push("produce");
                    engine.declare(marker_b.clone())?;
                    Ok(())
                }),
        )
        .unwrap();

    let log = Rc::clone(&fired);
    fx.engine
        .register_rule(
            Rule::new("consume")
                .with_pattern(Pattern::new(fx.marker_b))
                .with_action(move |_, _| {
                    log.borrow_mut().push("consume");
                    Ok(())
                }),
        )
        .unwrap();

    fx.engine.declare(fx.marker_a(0)).unwrap();
    assert_eq!(fx.engine.run(None).unwrap(), 2);
    assert_eq!(*fired.borrow(), vec!["produce", "consume"]);
}
