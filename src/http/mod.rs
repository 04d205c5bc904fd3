//! HTTP exchange collaborator: request/response types, the `Transport`
//! seam, and the reqwest-backed implementation.
mod client;
mod json;
mod transport;

#[cfg(test)]
mod test_support;

pub use client::{ClientOptions, DEFAULT_USER_AGENT, ReqwestTransport};
pub use json::lookup_path;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, Transport};

#[cfg(test)]
pub(crate) use test_support::MockRoleApi;
