pub mod login;
pub mod logout;

pub use self::login::{issue_token, login_handler};
pub use self::logout::logout_handler;
