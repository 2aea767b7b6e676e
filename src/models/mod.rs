//! Data models for the permissions console.
//!
//! Wire names follow the console's TypeScript interfaces (camelCase fields).

mod configuration;
mod group;
mod member;
mod permission;
mod preference;
mod product;
mod scope;
mod snapshot;

pub use configuration::*;
pub use group::*;
pub use member::*;
pub use permission::*;
pub use preference::*;
pub use product::*;
pub use scope::*;
pub use snapshot::*;
