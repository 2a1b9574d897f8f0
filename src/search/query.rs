//! Query planning: geo + tag base filter and the aggregation pipeline
//!
//! Plans are typed expression trees. They are rendered to RediSearch
//! syntax only at the store boundary, so request values never pass
//! through string interpolation unchecked.

use crate::models::{AvailabilityInterval, GeoPoint, PropertyType};

/// Field that every aggregation row carries the document key under
pub const KEY_FIELD: &str = "__key";

/// Alias of the extracted matching intervals
pub const MATCH_FIELD: &str = "match";

/// Alias of the rate sort key
pub const RATE_FIELD: &str = "rate";

/// Number of ranked results returned per search
pub const DEFAULT_RESULT_LIMIT: usize = 3;

const AVAILABILITY_PATH: &str = "$.availability";
const QUERY_DIALECT: u8 = 3;

/// Bound of an availability element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalField {
    Begin,
    End,
}

impl IntervalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalField::Begin => "begin",
            IntervalField::End => "end",
        }
    }

    fn value(&self, interval: &AvailabilityInterval) -> i64 {
        match self {
            IntervalField::Begin => interval.begin,
            IntervalField::End => interval.end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Lte,
    Gte,
}

impl Comparator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Lte => "<=",
            Comparator::Gte => ">=",
        }
    }

    fn holds(&self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparator::Lte => lhs <= rhs,
            Comparator::Gte => lhs >= rhs,
        }
    }
}

/// `@.<field> <comparator> <bound>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementPredicate {
    pub field: IntervalField,
    pub comparator: Comparator,
    pub bound: i64,
}

impl ElementPredicate {
    pub fn new(field: IntervalField, comparator: Comparator, bound: i64) -> Self {
        Self {
            field,
            comparator,
            bound,
        }
    }

    pub fn matches(&self, interval: &AvailabilityInterval) -> bool {
        self.comparator.holds(self.field.value(interval), self.bound)
    }

    fn render(&self) -> String {
        format!(
            "@.{}{}{}",
            self.field.as_str(),
            self.comparator.symbol(),
            self.bound
        )
    }
}

/// Conjunction of predicates applied to each element of the availability array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementFilter {
    pub predicates: Vec<ElementPredicate>,
}

impl ElementFilter {
    /// Elements whose window fully contains `[begin, end]`, bounds inclusive
    pub fn containing(begin: i64, end: i64) -> Self {
        Self {
            predicates: vec![
                ElementPredicate::new(IntervalField::Begin, Comparator::Lte, begin),
                ElementPredicate::new(IntervalField::End, Comparator::Gte, end),
            ],
        }
    }

    pub fn matches(&self, interval: &AvailabilityInterval) -> bool {
        self.predicates.iter().all(|p| p.matches(interval))
    }

    /// Elements of `intervals` passing the filter, in order
    pub fn select(&self, intervals: &[AvailabilityInterval]) -> Vec<AvailabilityInterval> {
        intervals.iter().filter(|i| self.matches(i)).copied().collect()
    }

    /// JSONPath filter expression, e.g. `$.availability[?(@.begin<=1 && @.end>=2)]`
    pub fn to_json_path(&self) -> String {
        let clauses: Vec<String> = self.predicates.iter().map(|p| p.render()).collect();
        format!("{}[?({})]", AVAILABILITY_PATH, clauses.join(" && "))
    }
}

/// Documents of one type within a radius of a point
#[derive(Debug, Clone, PartialEq)]
pub struct BaseFilter {
    pub property_type: PropertyType,
    pub center: GeoPoint,
    pub radius_miles: f64,
}

impl BaseFilter {
    /// `@type:{office} @coords:[lon lat radius mi]`
    pub fn to_query_string(&self) -> String {
        format!(
            "@type:{{{}}} @coords:[{} {} mi]",
            self.property_type, self.center, self.radius_miles
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadField {
    /// The document key, exposed as `__key`
    Key,
    /// A JSONPath element selection exposed under an alias
    Elements { filter: ElementFilter, alias: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Exists(String),
}

impl FilterExpr {
    fn render(&self) -> String {
        match self {
            FilterExpr::Exists(field) => format!("exists(@{})", field),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStage {
    Load(Vec<LoadField>),
    Filter(FilterExpr),
    SortBy { field: String, order: SortOrder },
    Limit { offset: usize, count: usize },
}

/// Base filter plus ordered aggregation stages
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub base: BaseFilter,
    pub stages: Vec<PipelineStage>,
    pub dialect: u8,
}

impl QueryPlan {
    /// Arguments following `FT.AGGREGATE`
    pub fn to_args(&self, index: &str) -> Vec<String> {
        let mut args = vec![index.to_string(), self.base.to_query_string()];

        for stage in &self.stages {
            match stage {
                PipelineStage::Load(fields) => {
                    let mut load_args = Vec::new();
                    for field in fields {
                        match field {
                            LoadField::Key => load_args.push(format!("@{}", KEY_FIELD)),
                            LoadField::Elements { filter, alias } => {
                                load_args.push(filter.to_json_path());
                                load_args.push("AS".to_string());
                                load_args.push(alias.clone());
                            }
                        }
                    }
                    args.push("LOAD".to_string());
                    args.push(load_args.len().to_string());
                    args.extend(load_args);
                }
                PipelineStage::Filter(expr) => {
                    args.push("FILTER".to_string());
                    args.push(expr.render());
                }
                PipelineStage::SortBy { field, order } => {
                    args.push("SORTBY".to_string());
                    args.push("2".to_string());
                    args.push(format!("@{}", field));
                    args.push(order.as_str().to_string());
                }
                PipelineStage::Limit { offset, count } => {
                    args.push("LIMIT".to_string());
                    args.push(offset.to_string());
                    args.push(count.to_string());
                }
            }
        }

        args.push("DIALECT".to_string());
        args.push(self.dialect.to_string());
        args
    }
}

/// Turns a resolved search into a query plan
#[derive(Debug, Clone)]
pub struct SearchQueryPlanner {
    limit: usize,
}

impl Default for SearchQueryPlanner {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

impl SearchQueryPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(
        &self,
        property_type: PropertyType,
        center: GeoPoint,
        radius_miles: f64,
        begin: i64,
        end: i64,
    ) -> QueryPlan {
        QueryPlan {
            base: BaseFilter {
                property_type,
                center,
                radius_miles,
            },
            stages: vec![
                PipelineStage::Load(vec![
                    LoadField::Key,
                    LoadField::Elements {
                        filter: ElementFilter::containing(begin, end),
                        alias: MATCH_FIELD.to_string(),
                    },
                ]),
                PipelineStage::Filter(FilterExpr::Exists(MATCH_FIELD.to_string())),
                PipelineStage::SortBy {
                    field: RATE_FIELD.to_string(),
                    order: SortOrder::Ascending,
                },
                PipelineStage::Limit {
                    offset: 0,
                    count: self.limit,
                },
            ],
            dialect: QUERY_DIALECT,
        }
    }
}
