mod countdown;
mod driver;
mod engine;
mod time_base;

pub use countdown::{Countdown, TICKS_PER_SECOND, TICK_INTERVAL};
pub use driver::{TimerCommand, TimerDriver, TimerHandle};
pub use engine::{TimerEngine, TimerState};
pub use time_base::TimeBase;
