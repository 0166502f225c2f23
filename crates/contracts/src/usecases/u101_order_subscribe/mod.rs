pub mod request;
pub mod response;

pub use request::OrderHookRequest;
pub use response::{HookOutcome, OrderHookResponse};
