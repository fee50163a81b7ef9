pub mod division;

pub use division::{DivisionRecord, Subtype};
