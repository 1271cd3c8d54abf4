pub mod payload_limit;
pub mod request_id;

pub use payload_limit::payload_limit_response;
pub use request_id::{request_id_middleware, RequestId};
