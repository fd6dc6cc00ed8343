pub mod cleanup;
pub mod middleware;
pub mod password;
pub mod session;

pub use middleware::{MaybeUser, RequireUser};
pub use password::{hash_password, verify_password};
pub use session::{
    clear_session_cookie, generate_session_token, session_cookie, session_expiry, session_token,
};
