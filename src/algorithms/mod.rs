pub mod best_sweep;
pub mod transgenetic;
