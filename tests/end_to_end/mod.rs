//! Scenarios run against the demo services over HTTP.
//!
//! - `addsvc_http`: status codes and bodies of `/sum` and `/concat`
//! - `stringsvc_http`: the same for `/uppercase` and `/count`
//! - `remote_calls`: HTTP clients, and addsvc post-processing through stringsvc

mod addsvc_http;
mod remote_calls;
mod test_utils;
