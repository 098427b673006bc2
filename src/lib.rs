pub mod animator;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod notify;
pub mod projection;
pub mod ranking;
pub mod scheduler;
pub mod telemetry;
pub mod test_utils;
pub mod translate;
pub mod turnout;
pub mod view;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;
