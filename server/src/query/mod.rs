//! Filter-expression translation
//!
//! Turns a FIQL-like filter string such as
//! `createTime=gt=2013-06-14T20:41:45;(type==D,label==web01)` into a
//! [`Restriction`] tree and assembles it with ordering and paging into a
//! [`QuerySpec`] for the data layer.
//!
//! - `;` is AND, `,` is OR, AND binds tighter than OR
//! - brackets group, redundant outer brackets are ignored
//! - operators: `==`, `!=`, `=lt=`, `=le=`, `=gt=`, `=ge=`
//! - `null` / `notNull` on `==`/`!=` become null checks
//!
//! Literals are typed by a per-entity [`ValueCoercer`].

mod assemble;
pub mod coerce;
mod error;
mod merge;
mod primitive;
pub mod restriction;
pub mod spec;
mod splitter;

pub use assemble::assemble;
pub use coerce::{
    CoercionRule, CoercionTable, DATE_PATTERN, EntityLookup, FieldCoercer, OrdinalDomain,
    SEVERITIES, ValueCoercer,
};
pub use error::{DATE_FORMAT_MESSAGE, QueryError};
pub use restriction::{
    ComparisonOp, ComparisonValue, EntityRef, LookupTarget, PivotOperator, Restriction,
};
pub use spec::{Alias, EntityDefaults, JoinType, OrderDirection, QuerySpec, SearchRequest, SortKey};
pub use splitter::parse_filter;
