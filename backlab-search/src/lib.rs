//! BackLab Search — parameter grids and the sweep orchestrator.
//!
//! - Grid builder: override resolution, value enumeration, combination
//!   budget with uniform auto-scaling
//! - Ordering constraints declared as data, enforced before execution
//! - Orchestrator: multi-strategy sweep, optional rayon parallelism,
//!   deterministic combined ranking

pub mod constraints;
pub mod grid;
pub mod search;

pub use constraints::{is_valid, OrderingConstraint, DEFAULT_CONSTRAINTS};
pub use grid::{build_grid, Grid, GridError, GridParam, ParamDefinition, RangeOverride};
pub use search::{
    smart_search, smart_search_with_constraints, SearchError, SearchReport,
    SearchRequest, SearchResult, StrategySummary,
};
