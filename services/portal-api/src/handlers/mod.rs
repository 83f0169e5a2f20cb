//! HTTP request handlers for the portal.

pub mod health;
pub mod ogc;
pub mod services;
