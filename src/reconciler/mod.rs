pub mod engine;
pub mod gap_fill;

pub use engine::{ReconcileReport, Reconciler};
