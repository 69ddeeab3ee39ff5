// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

mod args;

use args::Args;
use clap::Parser as _;
use edgefirst_m8pub::{
    formats::to_xyz, DecoderConfig, Error, LidarDriver, M8DataPacket, M8Decoder, Points,
};
use log::{debug, error, info, warn};
use std::{fs::File, io::Read as _, time::Instant};

fn main() -> Result<(), Error> {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(args.rust_log)
        .init();

    let mut decoder = M8Decoder::with_config(DecoderConfig::from(&args));
    let (min, max) = decoder.cloud_size_limits();
    info!(
        "decoding {} with {} returns, cloud size limits {}..{}",
        args.capture.display(),
        decoder.return_selection(),
        min,
        max
    );

    let mut file = File::open(&args.capture)?;
    let mut buf = vec![0u8; M8DataPacket::LEN];
    let mut xyz = Points::default();
    let mut dropped = 0usize;
    let start = Instant::now();

    loop {
        match file.read_exact(&mut buf) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(Error::from(err)),
        }

        match decoder.process_packet(&buf) {
            Ok(Some(cloud)) => {
                info!(
                    "cloud {} stamp {} us: {} points ({}x{}) dense={}",
                    cloud.header.seq,
                    cloud.header.stamp,
                    cloud.len(),
                    cloud.height(),
                    cloud.width(),
                    cloud.is_dense
                );

                if args.xyz {
                    to_xyz(&cloud, &mut xyz);
                    for i in 0..xyz.len().min(4) {
                        info!(
                            "  ({:.3}, {:.3}, {:.3}) i={}",
                            xyz.x[i], xyz.y[i], xyz.z[i], xyz.intensity[i]
                        );
                    }
                }
            }
            Ok(None) => {}
            Err(err) if err.is_fatal() => {
                error!("{}", err);
                return Err(err);
            }
            Err(Error::SensorStatus(status)) => {
                dropped += 1;
                debug!("dropped packet with status {}", status);
            }
            Err(err) => {
                dropped += 1;
                warn!("{}", err);
            }
        }
    }

    info!(
        "decoded {} packets into {} clouds in {:?}, {} packets dropped",
        decoder.packet_count(),
        decoder.cloud_count(),
        start.elapsed(),
        dropped
    );

    Ok(())
}
