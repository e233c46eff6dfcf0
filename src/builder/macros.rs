//! Macros for ergonomic action table construction.

/// Fill an action table from `event => (next_state, output)` pairs.
///
/// `next_state` is any shared state handle (`Rc<StateNode<..>>`, `Rc<Machine<..>>`,
/// a `StateRef`, ...). It is cloned, not moved. `output` is the `Option`
/// emitted when the action is taken.
///
/// # Example
///
/// ```
/// use statemach::actions;
/// use statemach::core::{State, StateNode};
/// use std::rc::Rc;
///
/// let zero = Rc::new(StateNode::<u8, u8>::named("0"));
/// let one = Rc::new(StateNode::<u8, u8>::named("1"));
///
/// actions!(zero.actions(), {
///     0 => (zero, Some(0)),
///     1 => (one, Some(1)),
/// });
///
/// assert_eq!(zero.actions().len(), 2);
/// ```
#[macro_export]
macro_rules! actions {
    (
        $table:expr, {
            $(
                $event:expr => ($next:expr, $output:expr)
            ),* $(,)?
        }
    ) => {{
        let table = $table;
        $(
            table.insert(
                $event,
                $crate::core::Action::new(($next).clone(), $output),
            );
        )*
    }};
}
