//! Drip Supply storefront.
//!
//! A single-page shopping widget: a searchable product catalog, a product
//! detail screen and a persistent cart whose checkout hands off to external
//! payment links. The widget itself ([`widget::Storefront`]) is plain state
//! plus a dispatcher; the axum host in [`routes`] renders it with askama.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod views;
pub mod widget;
