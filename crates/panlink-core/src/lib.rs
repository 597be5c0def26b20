pub mod link;
pub mod report;
pub mod scan;
pub mod types;

pub use link::{LinkOptions, TieBreak, link_relations};
pub use report::{ReportError, write_report, write_report_file};
pub use scan::scan_pans;
pub use types::{EntityLabel, LinkedRelation, PanMatch, RelatedType, TaggedSpan};
