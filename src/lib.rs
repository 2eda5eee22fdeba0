pub mod backtest;
pub mod domain;
