pub mod bus;
pub mod types;

pub use bus::{CommandBus, CommandReceiver};
pub use types::Command;
