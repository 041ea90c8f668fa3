//! Window-function evaluation for sqlwindow.
//!
//! A [`WindowPlan`] is built from the schema and the declarations alone, so
//! every specification error surfaces before any row is read. The
//! [`WindowExecutor`] then partitions, orders and evaluates rows against it.

#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod config;
mod executor;
pub mod partition;
pub mod plan;

pub use config::{EngineConfig, NullOrder, PartitionEquality};
pub use executor::{AggregateMode, OrderedPartition, WindowExecutor, order_partition};
pub use partition::{
    CollationEquality, KeyEquality, NumericEquality, Partition, StrictEquality, partition_rows,
};
pub use plan::{
    BoundCall, BoundExpr, BoundSort, BoundWindow, GroupedPlan, WindowPlan, WindowRegistry,
    plan_grouped, plan_windows,
};
