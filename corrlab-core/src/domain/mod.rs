//! Domain types shared by every engine stage.

pub mod ids;
pub mod parameter;
pub mod table;
pub mod verdict;

pub use ids::{BoardId, UnitId};
pub use parameter::{LimitTable, Parameter};
pub use table::{RawTable, SampleTable};
pub use verdict::{CpkDecision, Remark, Verdict};
