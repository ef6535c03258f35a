//! Demo: renders the moving-disks pattern into `output.mp4`.
//!
//! Exit status is 1 when the writer cannot be opened, 2 when a frame fails
//! and 3 when the file cannot be finalized.

use std::process::ExitCode;

use framewriter::demo::fill_frame_rgb;
use framewriter::{PixelFormat, VideoWriter};
use tracing::level_filters::LevelFilter;
use tracing::{error, info};

const OUTPUT: &str = "output.mp4";
const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const FRAME_RATE: u32 = 60;
const BIT_RATE: u64 = 1_000_000;  // 1 Mbps
const NUM_FRAMES: u64 = 100;

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init();

    let mut writer = match VideoWriter::create(OUTPUT, WIDTH, HEIGHT, FRAME_RATE, BIT_RATE, PixelFormat::Rgb24) {
        Ok(writer) => writer,
        Err(e) => {
            error!("Failed to initialize video writer: {}", e);
            return ExitCode::from(1);
        }
    };

    let stride = 3 * WIDTH as usize;
    let mut pixels = vec![0u8; stride * HEIGHT as usize];

    for index in 0..NUM_FRAMES {
        fill_frame_rgb(&mut pixels, stride, WIDTH, HEIGHT, index);
        if let Err(e) = writer.submit_frame(&pixels, stride) {
            error!("Error encoding frame {}: {}", index, e);
            return ExitCode::from(2);
        }
        if index % 30 == 0 {
            info!("Export progress: frame {}/{}", index, NUM_FRAMES);
        }
    }

    if let Err(e) = writer.close() {
        error!("Error finalizing video file: {}", e);
        return ExitCode::from(3);
    }

    println!("Finished successfully.");
    ExitCode::SUCCESS
}
