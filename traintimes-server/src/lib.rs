//! NYC subway arrival board server.
//!
//! A web application that answers: "which trains are about to arrive at the
//! stations near me, in each direction?"

pub mod cache;
pub mod client;
pub mod config;
pub mod domain;
pub mod feed;
pub mod nearby;
pub mod schedule;
pub mod stations;
pub mod web;
