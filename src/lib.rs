//! citemap: fetch Europe PMC annotation names and citation counts for a
//! list of PMIDs, aggregate citation weight per name, and report the
//! ranked result as text artifacts and a bar chart.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod report;
