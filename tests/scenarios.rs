//! End-to-end machines: Mealy edge detector, Moore traffic light and
//! computed outputs.

use statemach::actions;
use statemach::core::{same_state, Action, BoxError, Entered, MooreAction, State, StateNode, StateRef};
use statemach::engine::{ErrorKind, FsmError, Machine};
use statemach::MachineBuilder;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Bit {
    Zero,
    One,
}

#[test]
fn minimal_machine_that_does_nothing() {
    let s0: StateRef<u8, ()> = Rc::new(StateNode::new());
    s0.actions().insert(2, Action::new(Rc::clone(&s0), None));
    let machine = Machine::new(Rc::clone(&s0));
    let session = machine.open();
    session.actions().insert(1, Action::new(Rc::clone(&s0), None));

    assert!(same_state(&session.state().unwrap(), &s0));
    assert_eq!(session.fire(&1).unwrap(), None);
    assert!(same_state(&session.state().unwrap(), &s0));
    assert_eq!(session.fire(&2).unwrap(), None);
    assert!(same_state(&session.state().unwrap(), &s0));
}

#[test]
fn edge_detector() {
    let s_i = Rc::new(StateNode::<Bit, Bit>::named("i"));
    let s_0 = Rc::new(StateNode::<Bit, Bit>::named("0"));
    let s_1 = Rc::new(StateNode::<Bit, Bit>::named("1"));

    actions!(s_i.actions(), { Bit::Zero => (s_0, Some(Bit::Zero)), Bit::One => (s_1, Some(Bit::Zero)) });
    actions!(s_0.actions(), { Bit::Zero => (s_0, Some(Bit::Zero)), Bit::One => (s_1, Some(Bit::One)) });
    actions!(s_1.actions(), { Bit::Zero => (s_0, Some(Bit::One)), Bit::One => (s_1, Some(Bit::Zero)) });

    let machine = Machine::<Bit, Bit>::new(s_i);
    let session = machine.open();
    let ident = || session.state().unwrap().ident().map(str::to_string);

    assert_eq!(ident().as_deref(), Some("i"));
    assert_eq!(session.fire(&Bit::Zero).unwrap(), Some(Bit::Zero));
    assert_eq!(ident().as_deref(), Some("0"));
    assert_eq!(session.fire(&Bit::Zero).unwrap(), Some(Bit::Zero));
    assert_eq!(ident().as_deref(), Some("0"));
    assert_eq!(session.fire(&Bit::One).unwrap(), Some(Bit::One));
    assert_eq!(ident().as_deref(), Some("1"));
    assert_eq!(session.fire(&Bit::One).unwrap(), Some(Bit::Zero));
    assert_eq!(ident().as_deref(), Some("1"));
    assert_eq!(session.fire(&Bit::Zero).unwrap(), Some(Bit::One));
    assert_eq!(ident().as_deref(), Some("0"));
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Input {
    RedTimeout,
    AmberTimeout,
    GreenTimeout,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Light {
    Red,
    Amber,
    Green,
    FlashingRed,
}

#[test]
fn traffic_lights() {
    let flashing_red = Rc::new(StateNode::<Input, Light>::with_value("flashing_red", Light::FlashingRed));
    let red = Rc::new(StateNode::<Input, Light>::with_value("red", Light::Red));
    let amber = Rc::new(StateNode::<Input, Light>::with_value("amber", Light::Amber));
    let green = Rc::new(StateNode::<Input, Light>::with_value("green", Light::Green));

    red.actions().insert(Input::RedTimeout, green.action());
    green.actions().insert(Input::GreenTimeout, amber.action());
    amber.actions().insert(Input::AmberTimeout, red.action());

    let machine = MachineBuilder::<Input, Light>::new()
        .initial(red.clone())
        .action(Input::RedTimeout, flashing_red.action())
        .action(Input::AmberTimeout, flashing_red.action())
        .action(Input::GreenTimeout, flashing_red.action())
        .action(Input::Error, flashing_red.action())
        .record_history(true)
        .build()
        .unwrap();
    let session = machine.open();

    assert_eq!(session.fire(&Input::RedTimeout).unwrap(), Some(Light::Green));
    assert_eq!(session.fire(&Input::GreenTimeout).unwrap(), Some(Light::Amber));
    assert_eq!(session.fire(&Input::AmberTimeout).unwrap(), Some(Light::Red));
    assert_eq!(
        session.fire(&Input::AmberTimeout).unwrap(),
        Some(Light::FlashingRed)
    );
    assert_eq!(session.fire(&Input::Error).unwrap(), Some(Light::FlashingRed));
    assert_eq!(session.state().unwrap().ident(), Some("flashing_red"));

    let history = session.history().unwrap();
    assert_eq!(
        history.path(),
        vec!["red", "green", "amber", "red", "flashing_red"]
    );
    assert_eq!(history.records()[3].event, "AmberTimeout");
}

/// State whose output is how long it has been current.
struct Timed {
    node: StateNode<u8, Duration>,
    entered_at: Cell<Option<Instant>>,
}

impl State<u8, Duration> for Timed {
    fn node(&self) -> &StateNode<u8, Duration> {
        &self.node
    }

    fn enter(&self) -> Result<Entered<u8, Duration>, BoxError> {
        self.entered_at.set(Some(Instant::now()));
        Ok(Entered::Current)
    }

    fn exit(&self, _failure: Option<&FsmError>) -> Result<bool, BoxError> {
        self.entered_at.set(None);
        Ok(false)
    }
}

#[test]
fn state_active_time_is_computed_on_fire() {
    let timed = Rc::new(Timed {
        node: StateNode::named("timed"),
        entered_at: Cell::new(None),
    });
    let weak = Rc::downgrade(&timed);
    timed.actions().insert_with(1, move |_| {
        let me = weak.upgrade().ok_or("timed state dropped")?;
        let elapsed = me
            .entered_at
            .get()
            .map(|at| at.elapsed())
            .ok_or("timed state not entered")?;
        let next: StateRef<u8, Duration> = me;
        Ok(Action::new(next, Some(elapsed)))
    });

    let machine = Machine::<u8, Duration>::new(timed.clone());

    let first = machine.fire(&1).unwrap().unwrap();
    let second = machine.fire(&1).unwrap().unwrap();
    assert!(second >= first);

    machine.close().unwrap();
    assert!(timed.entered_at.get().is_none());
}

#[test]
fn unhandled_event_without_suppression() {
    let s0: StateRef<u8, ()> = Rc::new(StateNode::named("s0"));
    let machine = Machine::new(s0);

    let err = machine.fire(&7).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnhandledEvent);
    assert_eq!(
        err.to_string(),
        "Event 7 is not handled by state 's0' or by the machine"
    );
    assert!(machine.is_terminated());
    assert!(matches!(machine.fire(&7), Err(FsmError::Terminated)));
}

struct SuppressAll {
    node: StateNode<u8, ()>,
}

impl State<u8, ()> for SuppressAll {
    fn node(&self) -> &StateNode<u8, ()> {
        &self.node
    }

    fn exit(&self, _failure: Option<&FsmError>) -> Result<bool, BoxError> {
        Ok(true)
    }
}

#[test]
fn unhandled_event_with_suppression() {
    let state: StateRef<u8, ()> = Rc::new(SuppressAll {
        node: StateNode::named("tolerant"),
    });
    let machine = Machine::new(Rc::clone(&state));

    assert_eq!(machine.fire(&7).unwrap(), None);
    assert!(same_state(&machine.state().unwrap(), &state));
    assert_eq!(machine.fire(&8).unwrap(), None);
    assert!(!machine.is_terminated());
}

#[test]
fn self_looping_state_is_freed_once_tables_are_cleared() {
    let s0: StateRef<u8, ()> = Rc::new(StateNode::named("s0"));
    s0.actions().insert(1, Action::new(Rc::clone(&s0), None));
    let machine = Machine::new(Rc::clone(&s0));
    machine.actions().insert(2, Action::new(Rc::clone(&s0), None));
    machine.fire(&1).unwrap();
    machine.close().unwrap();

    let weak = Rc::downgrade(&s0);
    assert_eq!(Rc::strong_count(&s0), 3);

    s0.actions().clear();
    machine.actions().clear();
    drop(s0);

    assert!(weak.upgrade().is_none());
    assert!(machine.is_terminated());
}
