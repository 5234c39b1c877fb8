#[macro_use]
extern crate log;

pub mod app;
pub mod config;
pub mod web;

#[cfg(test)]
mod testutils;
