//! Request middleware. Currently only the access log.

pub mod access;
