pub mod layout;
pub mod report;
pub mod state;

pub use layout::{Layout, build_layout};
pub use report::{SessionReport, Totals, collect_incorrect, compute_totals};
pub use state::{SessionState, Submission};
