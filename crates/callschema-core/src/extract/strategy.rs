//! Custom extraction strategies

use crate::callable::Callable;
use crate::schema::CallableSchema;
use crate::Result;

/// Hook that can claim a declaration before the standard extraction runs
///
/// Strategies are consulted in registration order; the first one returning
/// `Some` decides the schema. Returning `Ok(None)` passes the declaration on.
pub trait ExtractionStrategy: Send + Sync {
    /// Name used in log events
    fn name(&self) -> &str;

    fn extract(&self, callable: &Callable) -> Result<Option<CallableSchema>>;
}
