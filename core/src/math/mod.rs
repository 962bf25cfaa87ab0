pub mod hilbert;
pub mod stats;

pub use hilbert::HilbertHelper;
pub use stats::StatsHelper;
