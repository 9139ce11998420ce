//! Query execution against the search backend.
//!
//! # Implementation Model
//!
//! Each configured request names an [`Action`], a closed set of backend operations mapped to
//! concrete HTTP calls. A [`QueryExecutor`] performs one call; [`ElasticsearchClient`] is the
//! real implementation and tests substitute their own. The [`QueryRunner`] drives every
//! configured request in turn and records a [`QueryOutcome`] per request name, so one failing
//! request never prevents the others from running.
//!
//! The only retry the runner performs is for date-math index templates such as
//! `<logs-{now/d{yyyy.MM.dd}}>`: when the backend reports the index as missing, the template is
//! resolved locally to today's index name and the call is repeated once.

mod action;
mod date_index;
mod elasticsearch;
mod executor;
mod results;
mod runner;

pub use action::{Action, RequestPlan};
pub use date_index::resolve_date_template;
pub use elasticsearch::ElasticsearchClient;
pub use executor::{QueryError, QueryExecutor};
pub use results::{QueryOutcome, QueryResults};
pub use runner::QueryRunner;
