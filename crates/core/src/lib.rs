// daokit Core - Entities, Error Taxonomy & DAO Ports
// NO infrastructure dependencies

pub mod domain;
pub mod error;
pub mod port;

pub use error::{DaoError, Result};
