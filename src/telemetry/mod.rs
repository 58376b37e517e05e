mod history;
mod record;

pub use history::{append_position, Position, HISTORY_CAPACITY};
pub use record::{UnitFields, UnitRecord, UnitUpdate};
