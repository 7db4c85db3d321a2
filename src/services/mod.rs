pub mod aggregator;
pub mod deadline;
pub mod harvester;
pub mod metadata;
pub mod providers;
pub mod ranking;
pub mod recommendations;
pub mod rows;
pub mod tfidf;

pub use deadline::Deadline;
pub use metadata::MetadataClient;
