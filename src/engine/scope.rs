//! Scoped acquisition: paired enter/exit around a unit of use.
//!
//! [`Session`] is the RAII form for a [`Machine`]: dropping it closes the
//! machine on every path, including early returns and unwinding.
//! [`scoped`] is the block form for any [`State`], including caller types
//! that wrap a machine with their own enter/exit behaviour; it also hands a
//! failure from the block to the owner's `exit`, which may consume it.

use crate::core::{label, State};
use crate::engine::error::{FsmError, Hook};
use crate::engine::machine::Machine;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::Deref;
use tracing::{debug, warn};

/// Open scope around a machine, returned by [`Machine::open`].
pub struct Session<'m, E, V>
where
    E: Eq + Hash + Clone + Debug + 'static,
    V: Clone + 'static,
{
    machine: &'m Machine<E, V>,
    closed: bool,
}

impl<'m, E, V> Session<'m, E, V>
where
    E: Eq + Hash + Clone + Debug + 'static,
    V: Clone + 'static,
{
    pub(crate) fn new(machine: &'m Machine<E, V>) -> Self {
        Self {
            machine,
            closed: false,
        }
    }

    /// Close the scope, exiting the machine's current state if it was ever
    /// entered.
    pub fn close(mut self) -> Result<(), FsmError> {
        self.closed = true;
        self.machine.close()
    }
}

impl<E, V> Deref for Session<'_, E, V>
where
    E: Eq + Hash + Clone + Debug + 'static,
    V: Clone + 'static,
{
    type Target = Machine<E, V>;

    fn deref(&self) -> &Self::Target {
        self.machine
    }
}

impl<E, V> Drop for Session<'_, E, V>
where
    E: Eq + Hash + Clone + Debug + 'static,
    V: Clone + 'static,
{
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.machine.close() {
            warn!(error = %err, "failed to close machine scope");
        }
    }
}

/// Calls `exit(None)` on the owner if the block unwinds.
struct ExitGuard<'a, E, V, S: State<E, V> + ?Sized> {
    owner: &'a S,
    armed: bool,
    _events: PhantomData<fn(E, V)>,
}

impl<E, V, S: State<E, V> + ?Sized> Drop for ExitGuard<'_, E, V, S> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(err) = self.owner.exit(None) {
                warn!(error = %err, "exit failed while unwinding scope");
            }
        }
    }
}

/// Run `body` inside an enter/exit pair of `owner`.
///
/// - A failing `enter` is returned without running the body or `exit`.
/// - On success `exit(None)` runs and the body's value is returned.
/// - On failure `exit(Some(&failure))` runs; `true` consumes the failure
///   and the result is `Ok(None)`, `false` returns the failure.
/// - A failure raised by `exit` itself replaces any failure in flight.
///
/// The body always runs against `owner`; a replacement returned from the
/// owner's `enter` is ignored.
pub fn scoped<E, V, S, T, F>(owner: &S, body: F) -> Result<Option<T>, FsmError>
where
    S: State<E, V> + ?Sized,
    F: FnOnce(&S) -> Result<T, FsmError>,
{
    owner.enter().map_err(|source| FsmError::Lifecycle {
        hook: Hook::Enter,
        state: label(owner),
        source,
    })?;

    let mut guard = ExitGuard {
        owner,
        armed: true,
        _events: PhantomData,
    };
    let outcome = body(owner);
    guard.armed = false;

    let exit_failure = |source| FsmError::Lifecycle {
        hook: Hook::Exit,
        state: label(owner),
        source,
    };
    match outcome {
        Ok(value) => {
            owner.exit(None).map_err(exit_failure)?;
            Ok(Some(value))
        }
        Err(failure) => {
            if owner.exit(Some(&failure)).map_err(exit_failure)? {
                debug!(state = %label(owner), error = %failure, "failure handled by scope exit");
                Ok(None)
            } else {
                Err(failure)
            }
        }
    }
}
