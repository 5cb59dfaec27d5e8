pub mod accounting;

pub use accounting::{AccountingError, AssetState, AssignPlan, AssignmentState, ReturnPlan};
