mod file_mode;
mod rev_spec;
mod stage;

pub use file_mode::FileMode;
pub use rev_spec::{InvalidRevSpecError, RevSpec};
pub use stage::{IndexStage, InvalidStageError};
