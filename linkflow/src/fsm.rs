//! Finite state machine (Mealy machine).

use std::fmt::Debug;

/// Finite state machine (Mealy machine).
///
/// `step` is the combinational logic of the module: it computes the current-cycle output and the
/// next-cycle state from the input and the current state. It must not depend on anything else, so
/// several modules can be evaluated on the same snapshot before any of them is committed.
pub trait Fsm {
    /// Input of one cycle.
    type Input;
    /// Output of one cycle.
    type Output;
    /// Registers of the module.
    type State: Clone + Debug;

    /// Module name.
    fn module_name(&self) -> &str;

    /// Initial value of registers in the FSM.
    fn init(&self) -> Self::State;

    /// FSM function.
    fn step(&self, input: &Self::Input, state: &Self::State) -> (Self::Output, Self::State);
}

/// Committed registers of an [`Fsm`].
#[derive(Debug, Clone)]
pub struct Reg<M: Fsm> {
    module: M,
    state: M::State,
    cycle: u64,
}

impl<M: Fsm> Reg<M> {
    /// Creates registers holding the initial value of `module`.
    pub fn new(module: M) -> Self {
        let state = module.init();
        Self { module, state, cycle: 0 }
    }

    /// Returns the module.
    pub fn module(&self) -> &M { &self.module }

    /// Returns the committed state.
    pub fn state(&self) -> &M::State { &self.state }

    /// Number of committed cycles.
    pub fn cycle(&self) -> u64 { self.cycle }

    /// Evaluates one cycle without committing it.
    pub fn eval(&self, input: &M::Input) -> (M::Output, M::State) { self.module.step(input, &self.state) }

    /// Replaces the state with `next` at the clock edge.
    pub fn commit(&mut self, next: M::State) {
        self.state = next;
        self.cycle += 1;
    }

    /// Commits the initial value at the clock edge, discarding whatever the cycle computed.
    pub fn reset(&mut self) {
        let init = self.module.init();
        self.commit(init);
    }

    /// Evaluates and commits one cycle.
    pub fn tick(&mut self, input: &M::Input) -> M::Output {
        let (output, next) = self.eval(input);
        self.commit(next);
        output
    }

    /// Overwrites registers between clock edges.
    ///
    /// This models a debug write or an upset; it does not advance the cycle count.
    pub fn force<F: FnOnce(&mut M::State)>(&mut self, f: F) { f(&mut self.state) }
}
