pub mod helper;

mod paired_moments;
pub use paired_moments::PairedMoments;
