//! Conflict resolution: salience, FIFO ties, refractoriness, budgets.

use std::cell::RefCell;
use std::rc::Rc;

use drover_engine::{ConstraintOp, Pattern, Rule};

use crate::common::fixture;

/// Equal salience fires in activation order (FIFO).
#[test]
fn fifo_within_equal_salience() {
    let mut fx = fixture();
    let fired: Rc<RefCell<Vec<i64>>> = Rc::default();

    let log = Rc::clone(&fired);
    fx.engine
        .register_rule(
            Rule::new("any-a")
                .with_pattern(Pattern::new(fx.marker_a))
                .with_action(move |_, facts| {
                    log.borrow_mut().push(facts[0].field(0).as_int().unwrap());
                    Ok(())
                }),
        )
        .unwrap();

    for tag in 0..5 {
        fx.engine.declare(fx.marker_a(tag)).unwrap();
    }

    assert_eq!(fx.engine.run(None).unwrap(), 5);
    assert_eq!(*fired.borrow(), vec![0, 1, 2, 3, 4]);
}

/// With distinct salience values, firing order is strictly descending
/// salience even when activations interleave.
#[test]
fn distinct_salience_descends() {
    let mut fx = fixture();
    let fired: Rc<RefCell<Vec<i32>>> = Rc::default();

    for salience in [5, -10, 40, 0] {
        let log = Rc::clone(&fired);
        fx.engine
            .register_rule(
                Rule::new(format!("s{salience}"))
                    .with_salience(salience)
                    .with_pattern(Pattern::new(fx.marker_a))
                    .with_action(move |_, _| {
                        log.borrow_mut().push(salience);
                        Ok(())
                    }),
            )
            .unwrap();
    }

    fx.engine.declare(fx.marker_a(0)).unwrap();
    assert_eq!(fx.engine.run(None).unwrap(), 4);
    assert_eq!(*fired.borrow(), vec![40, 5, 0, -10]);
}

/// A fired `(rule, token)` pair does not fire again on a later run.
#[test]
fn no_refire_on_same_tuple() {
    let mut fx = fixture();

    fx.engine
        .register_rule(Rule::new("any-a").with_pattern(Pattern::new(fx.marker_a)))
        .unwrap();

    fx.engine.declare(fx.marker_a(0)).unwrap();
    assert_eq!(fx.engine.run(None).unwrap(), 1);
    assert_eq!(fx.engine.run(None).unwrap(), 0);
}

/// Firing an action that retracts one of its own matched facts must
/// not re-schedule that activation.
#[test]
fn action_retracting_own_fact_does_not_reschedule() {
    let mut fx = fixture();

    fx.engine
        .register_rule(
            Rule::new("consume-a")
                .with_pattern(Pattern::new(fx.marker_a))
                .with_action(|engine, _| {
                    let id = engine.firing_ids()[0];
                    engine.retract(id)
                }),
        )
        .unwrap();

    fx.engine.declare(fx.marker_a(0)).unwrap();
    assert_eq!(fx.engine.run(None).unwrap(), 1);
    assert_eq!(fx.engine.fact_count(), 0);
    assert_eq!(fx.engine.agenda_len(), 0);
}

/// Withdrawing and re-deriving a tuple makes it eligible again.
#[test]
fn rederived_tuple_fires_again() {
    let mut fx = fixture();
    let fired: Rc<RefCell<usize>> = Rc::default();

    let count = Rc::clone(&fired);
    fx.engine
        .register_rule(
            Rule::new("tachycardia")
                .with_pattern(
                    Pattern::new(fx.patient).with_test(fx.heartbeat, ConstraintOp::Gt, 120i64),
                )
                .with_action(move |_, _| {
                    *count.borrow_mut() += 1;
                    Ok(())
                }),
        )
        .unwrap();

    let id = fx.engine.declare(fx.patient("A", 145)).unwrap();
    assert_eq!(fx.engine.run(None).unwrap(), 1);

    // Destroy and reform the tuple: the new id is a new token
    fx.engine.retract(id).unwrap();
    fx.engine.declare(fx.patient("A", 145)).unwrap();
    assert_eq!(fx.engine.run(None).unwrap(), 1);
    assert_eq!(*fired.borrow(), 2);
}

/// `halt` from inside an action stops the loop after that action.
#[test]
fn halt_stops_after_current_action() {
    let mut fx = fixture();

    fx.engine
        .register_rule(
            Rule::new("halting")
                .with_pattern(Pattern::new(fx.marker_a))
                .with_action(|engine, _| {
                    engine.halt();
                    Ok(())
                }),
        )
        .unwrap();

    for tag in 0..3 {
        fx.engine.declare(fx.marker_a(tag)).unwrap();
    }

    assert_eq!(fx.engine.run(None).unwrap(), 1);
    // The other activations stay pending
    assert_eq!(fx.engine.agenda_len(), 2);
}

/// `max_fires` bounds the run; the remainder fires later.
#[test]
fn fire_budget_bounds_run() {
    let mut fx = fixture();

    fx.engine
        .register_rule(Rule::new("any-a").with_pattern(Pattern::new(fx.marker_a)))
        .unwrap();

    for tag in 0..5 {
        fx.engine.declare(fx.marker_a(tag)).unwrap();
    }

    assert_eq!(fx.engine.run(Some(2)).unwrap(), 2);
    assert_eq!(fx.engine.agenda_len(), 3);
    assert_eq!(fx.engine.run(None).unwrap(), 3);
}

/// A retraction inside an action removes dependent activations before
/// the next pop.
#[test]
fn action_retraction_starves_lower_salience_rule() {
    let mut fx = fixture();
    let fired: Rc<RefCell<Vec<&'static str>>> = Rc::default();

    let log = Rc::clone(&fired);
    fx.engine
        .register_rule(
            Rule::new("first")
                .with_salience(100)
                .with_pattern(Pattern::new(fx.marker_a))
                .with_action(move |engine, _| {
                    log.borrow_mut().push("first");
                    let id = engine.firing_ids()[0];
                    engine.retract(id)
                }),
        )
        .unwrap();

    let log = Rc::clone(&fired);
    fx.engine
        .register_rule(
            Rule::new("second")
                .with_salience(0)
                .with_pattern(Pattern::new(fx.marker_a))
                .with_action(move |_, _| {
                    log.borrow_mut().push("second");
                    Ok(())
                }),
        )
        .unwrap();

    fx.engine.declare(fx.marker_a(0)).unwrap();
    assert_eq!(fx.engine.agenda_len(), 2);

    // Only the high-salience rule fires; its retraction withdraws the
    // other rule's activation.
    assert_eq!(fx.engine.run(None).unwrap(), 1);
    assert_eq!(*fired.borrow(), vec!["first"]);
}
