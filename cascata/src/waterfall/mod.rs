//! Mediation waterfall: the cycle state machine, single-entry attempts and the
//! driver that connects them to transports and adapters.

pub(crate) mod attempt;
pub(crate) mod controller;
pub(crate) mod state;
