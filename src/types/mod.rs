pub mod candle;
pub mod metrics;
pub mod signal;

pub use candle::*;
pub use metrics::*;
pub use signal::*;
