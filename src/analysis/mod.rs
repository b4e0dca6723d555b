//! Query façades over the import graph.
//!
//! Three variants share one graph core: [`ImportDepParser`] builds a
//! seed-scoped graph for upstream/downstream queries, [`DepParser`] eagerly
//! indexes a whole tree and classifies touched applications, and
//! [`SingleAppDepParser`] parses one application on demand.

pub mod apps;
pub mod deps;
pub mod single;

pub use apps::DepParser;
pub use deps::ImportDepParser;
pub use single::SingleAppDepParser;
