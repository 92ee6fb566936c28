//! Console sessions: the private session cookie, the credential it carries,
//! the gate in front of every console page and the in-flight form marks.

pub mod context;
pub mod handlers;
pub mod middleware;
pub mod store;
pub mod submission;
