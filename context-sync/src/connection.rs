pub mod connector;
pub mod event_stream;
pub mod receiver;
pub mod sender;
