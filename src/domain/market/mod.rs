//! Timeframes, candles, and the multi-timeframe analyser buffer (§3, §4.1,
//! §4.2).

pub mod buffer;
pub mod candle;
pub mod candles_view;
pub mod timeframe;

pub use buffer::{AnalyserBuffer, CandleProperty};
pub use candle::Candle;
pub use candles_view::CandlesView;
pub use timeframe::Timeframe;
