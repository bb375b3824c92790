pub mod handler;
pub mod reactor;
pub mod runtime_builder;
pub mod time_events;
