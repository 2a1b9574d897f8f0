//! Property availability search backed by a RediSearch index
//!
//! - **Schema**: which JSON paths of a property document are indexed, and how
//! - **Planning**: a typed query plan combining a geo + tag base filter with
//!   an aggregation pipeline (JSONPath extraction, filter, sort, limit)
//! - **Service**: the read path from a validated request to ranked results
//!
//! ```text
//! SearchRequest ──► zip lookup ──► SearchQueryPlanner ──► FT.AGGREGATE
//!                                                            │
//!        Vec<SearchResultItem> ◄── first matched interval ◄──┘
//! ```

mod query;
mod schema;
mod service;

pub use query::{
    BaseFilter, Comparator, ElementFilter, ElementPredicate, FilterExpr, IntervalField,
    LoadField, PipelineStage, QueryPlan, SearchQueryPlanner, SortOrder, DEFAULT_RESULT_LIMIT,
    KEY_FIELD, MATCH_FIELD, RATE_FIELD,
};
pub use schema::{recreate_index, FieldKind, IndexSchema, SchemaField};
pub use service::SearchService;
