use sortrack::pipeline::{Pipeline, TrackedFrame};
use sortrack::{Detection, Frame, SortConfig};

use std::io::BufRead;

const QUEUE_CAPACITY: usize = 8;

fn print_tracks(tracked: TrackedFrame) {
    match tracked.result {
        Ok(tracks) => {
            for t in tracks {
                let row = t.to_row();

                println!(
                    "{} {} {:.1} {:.1} {:.1} {:.1} {:.2} {}",
                    tracked.index,
                    t.track_id,
                    row[0],
                    row[1],
                    row[2],
                    row[3],
                    t.confidence,
                    t.class,
                );
            }
        }
        Err(err) => eprintln!("frame {}: {}", tracked.index, err),
    }
}

fn parse_line(line: &str) -> Option<(u64, Vec<Detection>)> {
    let idx = match line.find(':') {
        Some(idx) => idx,
        None => {
            log::warn!("wrong file format: expected `:`");
            return None;
        }
    };

    let (index, vector) = line.split_at(idx);

    match (index.trim().parse::<u64>(), serde_json::from_str(&vector[1..])) {
        (Ok(index), Ok(dets)) => Some((index, dets)),
        (Ok(_), Err(err)) => {
            log::warn!("wrong file format: parse json failed: {}", err);
            None
        }
        (Err(_), Ok(_)) => {
            log::warn!("wrong file format: parse frame index failed");
            None
        }
        _ => {
            log::warn!("wrong file format: parse failed");
            None
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);

    let in_file_name = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: replay <detections file> [config.json]"))?;

    let config = match args.next() {
        Some(path) => SortConfig::from_json_reader(std::fs::File::open(path)?)?,
        None => SortConfig::default(),
    };

    log::info!(
        "replaying {} (max_age {}, min_hits {}, iou_threshold {})",
        in_file_name,
        config.max_age,
        config.min_hits,
        config.iou_threshold
    );

    let dets_file = std::fs::File::open(&in_file_name)?;
    let pipeline = Pipeline::spawn(config, QUEUE_CAPACITY)?;

    for line in std::io::BufReader::new(dets_file).lines() {
        let line = line?;

        if line.trim().is_empty() {
            continue;
        }

        if let Some((index, detections)) = parse_line(&line) {
            pipeline.submit(Frame::new(index, 0.0, detections))?;
        }

        while let Some(tracked) = pipeline.try_recv() {
            print_tracks(tracked);
        }
    }

    for tracked in pipeline.finish()? {
        print_tracks(tracked);
    }

    Ok(())
}
