// src/lib.rs

//! Instafolio Library
//!
//! Scrapes an Instagram profile, folds carousel records into single posts,
//! mirrors their images into an object store and renders a static page.

pub mod config;
pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod services;
pub mod storage;
pub mod utils;
