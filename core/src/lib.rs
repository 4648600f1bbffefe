//! churnguard-core: churn-risk scoring for marketing-platform customers.
//!
//! The engine turns one profile and its raw event stream into a bounded
//! risk score, ordered explanatory signals, and the engagement features
//! downstream campaign generation reads. Everything here is pure: no
//! network, no files (outside the explicit loaders), no clock reads.

pub mod campaign;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod customer;
pub mod engagement;
pub mod engine;
pub mod error;
pub mod event;
pub mod features;
pub mod observer;
pub mod portfolio;
pub mod product;
pub mod purchase;
pub mod scoring;
pub mod signals;
pub mod source;
pub mod timestamp;
pub mod trend;
pub mod types;
pub mod window;
