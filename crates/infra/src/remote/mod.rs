//! HTTP adapter for the detection service

pub mod client;

pub use client::KioskClient;
