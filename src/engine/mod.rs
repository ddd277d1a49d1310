pub mod answer_stats;
pub mod assembler;
pub mod classifier;
pub mod ids;
pub mod mode;
pub mod sampler;

pub use assembler::{Assembler, AssemblyOptions};
pub use mode::{Chapter, Mode};
