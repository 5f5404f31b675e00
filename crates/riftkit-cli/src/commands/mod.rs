//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod creds;
pub mod currency;
pub mod friends;
pub mod image;
pub mod loot;
pub mod mail;
pub mod media;
pub mod ranked;
pub mod replay;
pub mod status;
