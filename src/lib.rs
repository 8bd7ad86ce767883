//! College Football Penalty Pipeline
//!
//! Batch pipeline that pulls play-by-play data from the CollegeFootballData
//! API, extracts penalty events from free-text play descriptions, attributes
//! each penalty to the team that committed it and the team that drew it, and
//! aggregates the results into weekly and season summary tables joined with
//! conference and poll-ranking reference data.

pub mod cache;
pub mod cfbd;
pub mod config;
pub mod export;
pub mod logging;
pub mod pipeline;
pub mod rankings;
pub mod retry;
