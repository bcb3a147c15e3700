//! Convenient imports for typical `dbal` usage.
//!
//! ```
//! use dbal::prelude::*;
//! ```

pub use crate::{
    BindMode, Condition, Database, DatabaseConfig, DbError, DbResult, ExecResult,
    FetchOrientation, Order, Reducer, Row, Safety, Statement, StatementKind, SuccessResult,
    TabularResult, TransactionResult, Value, ValueList,
};
