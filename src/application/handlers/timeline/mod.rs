//! Timeline synchronization handlers.
//!
//! One handler per lifecycle queue. Every successful event costs exactly one
//! read of the timeline document and exactly one write of its milestone list,
//! including events that change nothing (a redelivered add, a remove of an
//! id that is already gone). Handlers fold every failure into a
//! `HandlerOutcome`; acknowledging the delivery is the dispatcher's job.

mod add_milestone;
mod remove_milestone;
mod timeline_store;
mod update_milestone;

pub use add_milestone::AddMilestoneHandler;
pub use remove_milestone::RemoveMilestoneHandler;
pub use timeline_store::{LoadedTimeline, TimelineStore};
pub use update_milestone::UpdateMilestoneHandler;

use tracing::error;

use crate::domain::foundation::DomainError;
use crate::ports::{Delivery, HandlerOutcome};

/// Logs a failed application and converts the result into an outcome.
fn log_failure(
    handler: &'static str,
    delivery: &Delivery,
    result: Result<(), DomainError>,
) -> HandlerOutcome {
    if let Err(e) = &result {
        error!(
            handler,
            queue = %delivery.queue,
            delivery_tag = delivery.delivery_tag,
            redelivered = delivery.redelivered,
            code = %e.code,
            error = %e,
            "Failed to apply milestone event"
        );
    }
    result.into()
}
