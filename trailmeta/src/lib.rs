//! Type metamodel and property discovery.
//!
//! Classes are described once in a [`types::TypeRegistry`]; discovery then
//! lists, for any class, the canonical accessor of each of its properties with
//! generic return types resolved as seen from that class. Start with
//! [`discovery::GetterFactory`] or [`discovery::PropertyCache`].

pub mod config;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod property;
pub mod resolve;
pub mod types;
