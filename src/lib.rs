//! tagsweep - multi-environment AWS tag inventory
//!
//! Fetches resource tags across independently-credentialed AWS environments
//! via the Resource Groups Tagging API and writes CSV reports, optionally
//! narrowed by a focus rule on tag keys and values.

pub mod aws;
pub mod config;
pub mod credentials;
pub mod focus;
pub mod orchestrator;
pub mod report;
