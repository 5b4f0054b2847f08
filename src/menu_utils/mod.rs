mod fzf;

pub use fzf::{FzfResult, FzfSelectable, FzfWrapper};
