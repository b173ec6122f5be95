pub mod prober;

pub use prober::{ConnectivityProber, ProbeOptions};
