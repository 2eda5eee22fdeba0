//! Indicator catalogue over the analyser buffer (§4.3): moving averages,
//! oscillators, volatility bands, and higher-timeframe pivot points, each
//! declaring the `(timeframe, property, quantity)` reads it needs so the
//! prefetcher can size buffers ahead of time.

pub mod atr;
pub mod bbands;
pub mod dmi;
pub mod ema;
pub mod macd;
pub mod params;
pub mod pivot;
pub mod rsi;
pub mod sma;
pub mod support;

pub use atr::Atr;
pub use bbands::{Bbands, BbandsPoint};
pub use dmi::{Dmi, DmiPoint, DmiResultSequence};
pub use ema::Ema;
pub use macd::{Macd, MacdPoint, MacdResultSequence};
pub use params::{Indicator, IndicatorRequirement};
pub use pivot::{
    ClassicPivotPoint, FibonacciPivotPoint, PivotPoints, PivotPointsResult, PivotPointsType,
    TraditionalPivotPoint,
};
pub use rsi::Rsi;
pub use sma::Sma;
