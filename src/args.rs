// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use edgefirst_m8pub::{DecoderConfig, ReturnSelection};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Capture file of back-to-back M8 data packets.
    #[arg(env)]
    pub capture: PathBuf,

    /// Which returns to keep from every firing.  Clouds are only organized
    /// into rings when a single return is selected.
    #[arg(long, env, value_enum, default_value_t = ReturnSelection::Strongest)]
    pub return_selection: ReturnSelection,

    /// Clouds with this many points or fewer are discarded
    #[arg(long, env, default_value = "1")]
    pub min_cloud_size: usize,

    /// Points beyond this count are dropped until the next revolution
    #[arg(long, env)]
    pub max_cloud_size: Option<usize>,

    /// The name of the lidar frame
    #[arg(long, env, default_value = "quanergy")]
    pub frame_id: String,

    /// Log the first points of every cloud in Cartesian form
    #[arg(long, env)]
    pub xyz: bool,

    /// Application log level
    #[arg(long, env, default_value = "info")]
    pub rust_log: LevelFilter,
}

impl From<&Args> for DecoderConfig {
    fn from(args: &Args) -> Self {
        DecoderConfig {
            return_selection: args.return_selection,
            min_cloud_size: args.min_cloud_size,
            max_cloud_size: args.max_cloud_size,
            frame_id: args.frame_id.clone(),
        }
    }
}
