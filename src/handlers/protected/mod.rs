// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every handler here runs behind jwt_auth_middleware and
// validate_user_middleware and receives the resolved `Caller` explicitly.

pub mod clients;
pub mod projects;
pub mod utils;
