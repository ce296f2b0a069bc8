// Declared ahead of the modules below so they can use it.
#[macro_export]
macro_rules! emit {
    ($event:expr) => {
        $crate::internal_events::emit($event)
    };
}

mod ipfix;
mod prelude;

pub use self::ipfix::*;
pub use self::prelude::{error_stage, error_type};

/// An operational condition worth a log line and a metric.
pub trait InternalEvent: Sized {
    fn emit(self);
}

pub fn emit(event: impl InternalEvent) {
    event.emit();
}

