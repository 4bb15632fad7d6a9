mod user;
mod profile;
mod post;
mod like;
mod session;

pub use user::*;
pub use profile::*;
pub use post::*;
pub use like::*;
pub use session::*;
