pub mod actuator;
pub mod autotune;
pub mod pid;

pub use actuator::Actuator;
pub use autotune::gains_for_mass;
pub use pid::{Pid, PidOutput, PidParams};
