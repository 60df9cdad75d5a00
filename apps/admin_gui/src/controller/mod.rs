//! Event intake, state transitions and the commands they trigger.

pub mod events;
pub mod orchestration;
pub mod reducer;
