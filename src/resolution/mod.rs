/// Entry resolution.
///
/// Turns a term and a decoded bucket into one of the resolved shapes the
/// sheet search acts on.
mod resolver;

pub use resolver::{resolve, Outcome};
