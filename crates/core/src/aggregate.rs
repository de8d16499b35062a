//! Command/event state machines that own their invariants (the cart ledger).

/// Identity and version of an aggregate.
pub trait AggregateRoot {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Number of events applied so far.
    fn version(&self) -> u64;
}

/// Decide/evolve split.
///
/// - `handle(&self, cmd)` validates a command against current state and
///   returns the events it would produce, without mutating anything.
/// - `apply(&mut self, event)` evolves state from one event and bumps the
///   version.
///
/// A rejected command returns an error and leaves the aggregate untouched.
/// No IO happens here.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    fn apply(&mut self, event: &Self::Event);

    /// An empty vector means the command is a no-op.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// `handle`, then `apply` each resulting event in order.
    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle(command)?;
        for event in &events {
            self.apply(event);
        }
        Ok(events)
    }
}
