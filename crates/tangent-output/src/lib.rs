#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tangent-finance/tangent/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod response;
pub mod result;
pub mod summary;

pub use export::{ExportError, ExportFormat, Exporter, WeightRecord, read_weights_csv};
pub use response::OptimizationResponse;
pub use result::{OptimizationResult, round_to, round_weights};
pub use summary::render_statistics;
