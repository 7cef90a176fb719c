//! Twill - Multi-stream video wall
//!
//! Classifies pasted YouTube, Twitch and Kick URLs, keeps the slot and audio
//! state of a fixed grid of players, and proxies yt-dlp downloads and
//! recording uploads to S3-compatible storage.

pub mod cli;
pub mod classify;
pub mod config;
pub mod downloader;
pub mod error;
pub mod server;
pub mod session;
pub mod storage;
pub mod wall;
